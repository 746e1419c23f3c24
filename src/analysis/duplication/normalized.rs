use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::analysis::lexical::LexicalScanner;
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::metrics::{percentage, Block, Metric, MetricKind, MetricResult};

use super::{block_id, DuplicateGroup, DuplicationConfig, DuplicationReport};

// String contents are already blanked by the scanner, only the delimiters and padding remain.
static STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?:"""|'''|["'`])[ ]*(?:"""|'''|["'`])?"#).unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Replace literals and identifiers in comment-free code with `VAR`.
///
/// Strings become a word first, so strings, numbers and names all end up as
/// the same placeholder. `1.5` becomes `VAR.VAR`.
pub fn normalize_line(code: &str) -> String {
    let strings = STRING.replace_all(code, "STR");
    let words = WORD.replace_all(&strings, "VAR");
    WHITESPACE.replace_all(&words, " ").trim().to_string()
}

/// Sliding-window duplication detector over normalized lines.
///
/// Windows that hash equal are grouped, so copies that differ only in names
/// or literal values still match.
pub struct NormalizedDuplicationDetector {
    config: DuplicationConfig,
}

impl NormalizedDuplicationDetector {
    pub fn new() -> Self {
        Self::with_config(DuplicationConfig::default())
    }

    pub fn with_config(config: DuplicationConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, document: &Document) -> DuplicationReport {
        let mut scanner = LexicalScanner::new(document.language().profile());
        let normalized: Vec<String> = document
            .lines()
            .iter()
            .map(|raw| normalize_line(&scanner.consume(raw).code))
            .collect();
        let non_empty: Vec<bool> = document.lines().iter().map(|raw| !raw.trim().is_empty()).collect();
        let total_lines = non_empty.iter().filter(|present| **present).count();
        let window = self.config.window_size.max(1);

        let mut order: Vec<(String, Vec<usize>)> = Vec::new();
        let mut index_by_hash: HashMap<String, usize> = HashMap::new();

        if normalized.len() >= window {
            for start in 0..=(normalized.len() - window) {
                let joined = normalized[start..start + window]
                    .iter()
                    .filter(|line| !line.is_empty())
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("\n");
                if joined.chars().count() < self.config.min_window_chars {
                    continue;
                }

                let hash = Self::hash(&joined);
                match index_by_hash.get(&hash) {
                    Some(&slot) => order[slot].1.push(start),
                    None => {
                        index_by_hash.insert(hash.clone(), order.len());
                        order.push((hash, vec![start]));
                    }
                }
            }
        }

        let mut covered = vec![false; normalized.len()];
        let mut groups = Vec::new();
        for (_, starts) in order.into_iter().filter(|(_, starts)| starts.len() > 1) {
            for start in &starts {
                covered[*start..*start + window].iter_mut().for_each(|line| *line = true);
            }
            groups.push(DuplicateGroup {
                block_id: block_id(groups.len()),
                starts,
                length: window,
            });
        }

        let duplicated_lines = covered
            .iter()
            .zip(&non_empty)
            .filter(|(covered, present)| **covered && **present)
            .count();

        DuplicationReport {
            groups,
            duplicated_lines,
            total_lines,
            percentage: percentage(duplicated_lines, total_lines),
        }
    }

    fn hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl Default for NormalizedDuplicationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for NormalizedDuplicationDetector {
    fn kind(&self) -> MetricKind {
        MetricKind::CodeDuplicationV2
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let report = self.detect(document);
        let mut blocks: Vec<Block> = report
            .groups
            .iter()
            .flat_map(|group| {
                group.starts.iter().map(move |start| Block::Duplicate {
                    start_line: *start,
                    end_line: start + group.length - 1,
                    block_id: group.block_id.clone(),
                })
            })
            .collect();
        blocks.sort_by_key(|block| block.start_line());

        Ok(MetricResult::new(self.label(), report.percentage)
            .with_line(report.first_line())
            .with_blocks(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language;

    fn detect(language: Language, source: &str) -> DuplicationReport {
        NormalizedDuplicationDetector::new().detect(&Document::new(source, language))
    }

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("const a = 1;"), "VAR VAR = VAR;");
        assert_eq!(normalize_line("  log(\"     \",   count)  "), "VAR(VAR, VAR)");
        assert_eq!(normalize_line("x = 3.14"), "VAR = VAR.VAR");
        assert_eq!(normalize_line("name = f'   '"), "VAR = VAR");
        assert_eq!(normalize_line("   "), "");
    }

    #[test]
    fn test_literals_and_names_share_a_placeholder() {
        assert_eq!(normalize_line("total = 42;"), normalize_line("total = rate;"));

        let source = "\
let a = foo(1, 2);
let b = bar(3, 4);
let c = baz(5, 6);
if (ready) {
  start();
}
let d = qux(w, v);
let e = quux(x, \"y\");
let f = corge(7, z);";
        let report = detect(Language::JavaScript, source);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].starts, vec![0, 6]);
        assert_eq!(report.duplicated_lines, 6);
        assert_eq!(report.percentage, 66.67);
    }

    #[test]
    fn test_renamed_copy_is_detected() {
        let source = "\
let total = price * 2;
console.log(total);
save(total, 'a');
if (ready) {
  start();
}
let amount = cost * 3;
console.log(amount);
save(amount, 'b');";
        let report = detect(Language::JavaScript, source);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].block_id, "a");
        assert_eq!(report.groups[0].starts, vec![0, 6]);
        assert_eq!(report.duplicated_lines, 6);
        assert_eq!(report.percentage, 66.67);
    }

    #[test]
    fn test_comments_are_ignored() {
        let source = "\
value = compute(1)  # first
store(value, 'x')
report(value)
other_call()
value = compute(2)  # second copy
store(value, 'y')
report(value)";
        let report = detect(Language::Python, source);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].starts, vec![0, 4]);
    }

    #[test]
    fn test_short_windows_are_skipped() {
        let report = detect(Language::CSharp, "}\n}\n}\n}\n}\n}\n}");
        assert!(report.groups.is_empty());
        assert_eq!(report.percentage, 0.0);
    }

    #[test]
    fn test_fewer_lines_than_window() {
        let report = detect(Language::Java, "int a = 1;\nint b = 2;");
        assert!(report.groups.is_empty());
        assert_eq!(report.total_lines, 2);
    }

    #[test]
    fn test_blocks_for_every_occurrence() {
        let source = "\
int first = Compute(1);
Store(first);
Log(first, \"x\");
Reset();
int second = Compute(2);
Store(second);
Log(second, \"y\");";
        let result = NormalizedDuplicationDetector::new()
            .extract(&Document::new(source, Language::CSharp))
            .unwrap();
        assert_eq!(result.line_number, Some(0));
        let starts: Vec<usize> = result.blocks.iter().map(Block::start_line).collect();
        assert_eq!(starts, vec![0, 4]);
        assert_eq!(result.blocks[1].end_line(), 6);
    }
}
