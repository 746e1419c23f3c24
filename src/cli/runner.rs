use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::languages::Language;
use crate::metrics::{MetricKind, MetricRegistry, MetricResult};

/// 单个度量的输出
#[derive(Debug, Clone, Serialize)]
pub struct MetricEntry {
    pub metric: MetricKind,
    #[serde(flatten)]
    pub result: MetricResult,
}

/// 单个文件的度量报告
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub language: Language,
    pub metrics: Vec<MetricEntry>,
}

/// 解析 `--language` 参数，未知语言返回错误
pub fn parse_language(identifier: &str) -> Result<Language, MetricError> {
    let language = Language::from_identifier(identifier);
    if language == Language::Generic && !identifier.trim().eq_ignore_ascii_case("generic") {
        return Err(MetricError::UnsupportedLanguage {
            identifier: identifier.to_string(),
        });
    }
    Ok(language)
}

/// 解析 `--metric` 过滤条件
pub fn parse_metric_filter(names: &[String]) -> anyhow::Result<Vec<MetricKind>> {
    names
        .iter()
        .map(|name| {
            MetricKind::from_name(name.trim()).ok_or_else(|| {
                let known: Vec<&str> = MetricKind::ALL.iter().map(|kind| kind.name()).collect();
                anyhow::anyhow!("Unknown metric '{}', expected one of: {}", name, known.join(", "))
            })
        })
        .collect()
}

/// 展开命令行路径
///
/// 显式给出的文件总是保留；目录中只收集能识别扩展名的文件。
pub fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|file| detect_language(file) != Language::Generic)
                .collect();
            found.sort();
            debug!("Collected {} files under {}", found.len(), path.display());
            files.extend(found);
        } else {
            anyhow::bail!("Path does not exist: {}", path.display());
        }
    }

    Ok(files)
}

fn detect_language(path: &Path) -> Language {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(Language::from_extension)
        .unwrap_or(Language::Generic)
}

/// 读取并分析单个文件
pub fn analyze_file(
    registry: &MetricRegistry,
    path: &Path,
    language: Option<Language>,
    filter: &[MetricKind],
) -> anyhow::Result<FileReport> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| MetricError::io(e.to_string(), Some(path.display().to_string())))
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let language = language.unwrap_or_else(|| detect_language(path));
    let document = Document::new(text, language);

    let metrics = registry
        .analyze_kinds(&document)
        .into_iter()
        .filter(|(kind, _)| filter.is_empty() || filter.contains(kind))
        .map(|(metric, result)| MetricEntry { metric, result })
        .collect();

    Ok(FileReport {
        path: path.display().to_string(),
        language,
        metrics,
    })
}

/// 并发分析多个文件，结果顺序与输入一致
pub async fn analyze_files(
    registry: Arc<MetricRegistry>,
    files: Vec<PathBuf>,
    language: Option<Language>,
    filter: Vec<MetricKind>,
) -> anyhow::Result<Vec<FileReport>> {
    let start_time = Instant::now();
    let filter = Arc::new(filter);

    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let registry = Arc::clone(&registry);
            let filter = Arc::clone(&filter);
            tokio::task::spawn_blocking(move || analyze_file(&registry, &path, language, &filter))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("Analysis task failed")??);
    }

    info!("Analyzed {} files in {:?}", reports.len(), start_time.elapsed());
    Ok(reports)
}

/// 文本格式输出
pub fn render_text(reports: &[FileReport]) -> String {
    let mut output = String::new();

    for report in reports {
        output.push_str(&format!("{} ({})\n", report.path, report.language));
        for entry in &report.metrics {
            let value = if entry.result.value.fract() == 0.0 {
                format!("{}", entry.result.value as i64)
            } else {
                format!("{:.2}", entry.result.value)
            };
            output.push_str(&format!("  {:<34} {:>8}", entry.result.label, value));
            if let Some(line) = entry.result.line_number {
                output.push_str(&format!("  (line {})", line + 1));
            }
            if !entry.result.blocks.is_empty() {
                output.push_str(&format!("  [{} blocks]", entry.result.blocks.len()));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    output
}

pub fn render_json(reports: &[FileReport]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("python").unwrap(), Language::Python);
        assert_eq!(parse_language("typescriptreact").unwrap(), Language::TypeScript);
        assert_eq!(parse_language("generic").unwrap(), Language::Generic);
        assert!(matches!(
            parse_language("cobol"),
            Err(MetricError::UnsupportedLanguage { .. })
        ));
    }

    #[test]
    fn test_parse_metric_filter() {
        let kinds = parse_metric_filter(&["nesting_depth".to_string(), "cohesion".to_string()]).unwrap();
        assert_eq!(kinds, vec![MetricKind::NestingDepth, MetricKind::Cohesion]);
        assert!(parse_metric_filter(&["halstead".to_string()]).is_err());
    }

    #[test]
    fn test_collect_files_skips_unknown_extensions_in_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello\n").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("b.ts"), "let a = 1;\n").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .filter_map(|file| file.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.py", "b.ts"]);

        let explicit = collect_files(&[dir.path().join("notes.txt")]).unwrap();
        assert_eq!(explicit.len(), 1);
    }

    #[test]
    fn test_collect_files_missing_path() {
        assert!(collect_files(&[PathBuf::from("/definitely/not/here")]).is_err());
    }

    #[test]
    fn test_analyze_file_with_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "one\ntwo\n").unwrap();

        let registry = MetricRegistry::new();
        let report = analyze_file(&registry, &path, None, &[MetricKind::LineCount]).unwrap();
        assert_eq!(report.language, Language::Generic);
        assert_eq!(report.metrics.len(), 1);
        assert_eq!(report.metrics[0].result.value, 2.0);
    }

    #[test]
    fn test_render_text_and_json() {
        let report = FileReport {
            path: "a.py".to_string(),
            language: Language::Python,
            metrics: vec![MetricEntry {
                metric: MetricKind::CommentRatio,
                result: MetricResult::new("Comment ratio", 33.33),
            }],
        };
        let text = render_text(std::slice::from_ref(&report));
        assert!(text.contains("a.py (python)"));
        assert!(text.contains("33.33"));

        let json = render_json(&[report]).unwrap();
        assert!(json.contains("\"metric\": \"comment_ratio\""));
        assert!(json.contains("\"label\": \"Comment ratio\""));
    }
}
