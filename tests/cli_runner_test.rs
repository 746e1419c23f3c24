use std::fs;
use std::sync::Arc;

use code_metrics::cli::runner::{analyze_files, collect_files, parse_metric_filter, render_json, render_text};
use code_metrics::languages::Language;
use code_metrics::metrics::{MetricKind, MetricRegistry};
use tempfile::TempDir;

fn write_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/models")).unwrap();
    fs::write(
        dir.path().join("src/models/user.py"),
        "class User:\n    def __init__(self, name):\n        self.name = name\n\n    def greet(self):\n        return 'hi ' + self.name\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/app.ts"),
        "import { User } from './models/user';\n\nexport function main(): void {\n  if (ready) {\n    start();\n  }\n}\n",
    )
    .unwrap();
    fs::write(dir.path().join("README.md"), "# project\n").unwrap();
    dir
}

#[tokio::test]
async fn test_analyze_project_directory() {
    let dir = write_project();
    let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(files.len(), 2);

    let registry = Arc::new(MetricRegistry::new());
    let reports = analyze_files(registry, files, None, Vec::new()).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].language, Language::TypeScript);
    assert_eq!(reports[1].language, Language::Python);

    let if_count = reports[0]
        .metrics
        .iter()
        .find(|entry| entry.metric == MetricKind::IfCount)
        .map(|entry| entry.result.value);
    assert_eq!(if_count, Some(1.0));

    let cohesion = reports[1]
        .metrics
        .iter()
        .find(|entry| entry.metric == MetricKind::Cohesion)
        .map(|entry| entry.result.value);
    assert_eq!(cohesion, Some(100.0));
}

#[tokio::test]
async fn test_language_override_and_filter() {
    let dir = write_project();
    let readme = dir.path().join("README.md");
    let filter = parse_metric_filter(&["line_count".to_string(), "import_count".to_string()]).unwrap();

    let registry = Arc::new(MetricRegistry::new());
    let reports = analyze_files(registry, vec![readme], Some(Language::Python), filter).await.unwrap();

    assert_eq!(reports[0].language, Language::Python);
    let kinds: Vec<MetricKind> = reports[0].metrics.iter().map(|entry| entry.metric).collect();
    assert_eq!(kinds, vec![MetricKind::LineCount, MetricKind::ImportCount]);
}

#[test]
fn test_render_reports() {
    let dir = write_project();
    let files = collect_files(&[dir.path().join("src/models/user.py")]).unwrap();
    let registry = Arc::new(MetricRegistry::new());

    let reports = tokio_test::block_on(analyze_files(registry, files, None, vec![MetricKind::LineCount])).unwrap();

    let text = render_text(&reports);
    assert!(text.contains("user.py (python)"));
    assert!(text.contains("Line count"));

    let json: serde_json::Value = serde_json::from_str(&render_json(&reports).unwrap()).unwrap();
    assert_eq!(json[0]["language"], "python");
    assert_eq!(json[0]["metrics"][0]["metric"], "line_count");
    assert_eq!(json[0]["metrics"][0]["value"], 7.0);
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let registry = Arc::new(MetricRegistry::new());
    let dir = TempDir::new().unwrap();
    let result = analyze_files(registry, vec![dir.path().join("gone.cs")], None, Vec::new()).await;
    assert!(result.is_err());
}
