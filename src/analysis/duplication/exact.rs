use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::languages::LanguageProfile;
use crate::metrics::{percentage, Block, Metric, MetricKind, MetricResult};

use super::{block_id, DuplicateGroup, DuplicationConfig, DuplicationReport};

/// Pairwise exact-match duplication detector.
///
/// Every start line is compared against every later start line. A pair is a
/// duplicate once `min_duplicate_lines` consecutive trimmed lines are equal,
/// and the match is then extended as far as it goes. Each start line is
/// recorded at most once, so overlapping regions can undercount.
pub struct ExactDuplicationDetector {
    config: DuplicationConfig,
}

impl ExactDuplicationDetector {
    pub fn new() -> Self {
        Self::with_config(DuplicationConfig::default())
    }

    pub fn with_config(config: DuplicationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DuplicationConfig {
        &self.config
    }

    pub fn detect(&self, document: &Document) -> DuplicationReport {
        let profile = document.language().profile();
        let lines: Vec<&str> = document.lines().iter().map(|line| line.trim()).collect();
        let window = self.config.min_duplicate_lines.max(1);

        let total_lines = lines
            .iter()
            .filter(|line| !line.is_empty() && !is_comment(profile, line))
            .count();

        let mut groups = Vec::new();
        let mut duplicated_lines = 0;

        if lines.len() >= window {
            let last_start = lines.len() - window;
            for i in 0..=last_start {
                if lines[i].is_empty() || is_comment(profile, lines[i]) {
                    continue;
                }

                for j in (i + 1)..=last_start {
                    if !self.window_matches(profile, &lines, i, j, window) {
                        continue;
                    }

                    let mut length = window;
                    while j + length < lines.len() && self.comparable(profile, lines[i + length], lines[j + length]) {
                        length += 1;
                    }

                    duplicated_lines += length;
                    groups.push(DuplicateGroup {
                        block_id: block_id(groups.len()),
                        starts: vec![i, j],
                        length,
                    });
                    break;
                }
            }
        }

        DuplicationReport {
            groups,
            duplicated_lines,
            total_lines,
            percentage: percentage(duplicated_lines, total_lines),
        }
    }

    fn window_matches(&self, profile: &LanguageProfile, lines: &[&str], i: usize, j: usize, window: usize) -> bool {
        (0..window).all(|k| self.comparable(profile, lines[i + k], lines[j + k]))
    }

    fn comparable(&self, profile: &LanguageProfile, left: &str, right: &str) -> bool {
        left == right
            && left.chars().count() > self.config.min_line_length
            && !is_comment(profile, left)
    }
}

/// Lines that open with a comment marker, including `*` continuation lines.
fn is_comment(profile: &LanguageProfile, trimmed: &str) -> bool {
    if trimmed.starts_with(profile.line_comment) {
        return true;
    }
    match profile.block_comment {
        Some((open, _)) => trimmed.starts_with(open) || trimmed.starts_with('*'),
        None => false,
    }
}

impl Default for ExactDuplicationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for ExactDuplicationDetector {
    fn kind(&self) -> MetricKind {
        MetricKind::CodeDuplication
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let report = self.detect(document);
        let blocks = report
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
        ExactDuplicationDetector::new().detect(&Document::new(source, language))
    }

    #[test]
    fn test_no_duplication() {
        let report = detect(Language::CSharp, "int a = 1;\nint b = 2;\nint c = 3;\nint d = 4;");
        assert!(report.groups.is_empty());
        assert_eq!(report.percentage, 0.0);
        assert_eq!(report.total_lines, 4);
    }

    #[test]
    fn test_simple_duplicate_block() {
        let source = "\
var total = 0;
total += price;
Console.WriteLine(total);
var other = 1;
var total = 0;
total += price;
Console.WriteLine(total);";
        let report = detect(Language::CSharp, source);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].starts, vec![0, 4]);
        assert_eq!(report.groups[0].length, 3);
        assert_eq!(report.duplicated_lines, 3);
        // 3 of 7 counted lines
        assert_eq!(report.percentage, 42.86);
        assert_eq!(report.first_line(), Some(0));
    }

    #[test]
    fn test_match_extends_past_window() {
        let source = "\
alpha_one();
alpha_two();
alpha_three();
alpha_four();
separator_line();
alpha_one();
alpha_two();
alpha_three();
alpha_four();";
        let report = detect(Language::JavaScript, source);
        assert_eq!(report.groups[0].length, 4);
        // start line 1 also matches line 6 with a 3-line extent
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.duplicated_lines, 7);
    }

    #[test]
    fn test_short_and_comment_lines_do_not_match() {
        let source = "}\n}\n}\n// same comment\n// same comment\n// same comment\n}\n}\n}\n// same comment\n// same comment\n// same comment";
        let report = detect(Language::Java, source);
        assert!(report.groups.is_empty());
        // comment lines are excluded from the denominator
        assert_eq!(report.total_lines, 6);
    }

    #[test]
    fn test_python_hash_comments_skipped() {
        let source = "# repeated note here\n# repeated note here\n# repeated note here\nvalue = 1\n# repeated note here\n# repeated note here\n# repeated note here";
        let report = detect(Language::Python, source);
        assert!(report.groups.is_empty());
        assert_eq!(report.total_lines, 1);
    }

    #[test]
    fn test_empty_document() {
        let result = ExactDuplicationDetector::new()
            .extract(&Document::new("", Language::TypeScript))
            .unwrap();
        assert_eq!(result.value, 0.0);
        assert!(result.blocks.is_empty());
        assert_eq!(result.line_number, None);
    }

    #[test]
    fn test_blocks_share_group_id() {
        let source = "first_call(1);\nsecond_call(2);\nthird_call(3);\nfirst_call(1);\nsecond_call(2);\nthird_call(3);";
        let result = ExactDuplicationDetector::new()
            .extract(&Document::new(source, Language::JavaScript))
            .unwrap();
        assert_eq!(result.blocks.len(), 2);
        assert!(result
            .blocks
            .iter()
            .all(|block| matches!(block, Block::Duplicate { block_id, .. } if block_id == "a")));
        assert_eq!(result.blocks[1].start_line(), 3);
        assert_eq!(result.blocks[1].end_line(), 5);
    }
}
