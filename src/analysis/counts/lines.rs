use super::scan;
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::metrics::{percentage, Metric, MetricKind, MetricResult};

/// Physical line count
pub struct LineCounter;

impl Metric for LineCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::LineCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        Ok(MetricResult::count(self.label(), document.line_count()))
    }
}

/// Lines that carry comment text, whether alone or after code.
pub struct CommentLineCounter;

impl CommentLineCounter {
    pub fn count(document: &Document) -> usize {
        scan(document).iter().filter(|line| line.has_comment).count()
    }
}

impl Metric for CommentLineCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::CommentLineCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        Ok(MetricResult::count(self.label(), Self::count(document)))
    }
}

/// Comment lines as a percentage of non-blank lines.
pub struct CommentRatioCalculator;

impl Metric for CommentRatioCalculator {
    fn kind(&self) -> MetricKind {
        MetricKind::CommentRatio
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let lines = scan(document);
        let comments = lines.iter().filter(|line| line.has_comment).count();
        let non_blank = lines.iter().filter(|line| !line.is_blank()).count();
        Ok(MetricResult::new(self.label(), percentage(comments, non_blank)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language;

    fn value(metric: &dyn Metric, language: Language, source: &str) -> f64 {
        metric.extract(&Document::new(source, language)).unwrap().value
    }

    #[test]
    fn test_line_count() {
        assert_eq!(value(&LineCounter, Language::Java, ""), 0.0);
        assert_eq!(value(&LineCounter, Language::Java, "a\nb\n\nc"), 4.0);
    }

    #[test]
    fn test_comment_lines_brace() {
        let source = "// header\nint x = 1; // trailing\n/* open\n\n   still comment\n*/\nvar s = \"// not a comment\";";
        // the blank line inside the block comment does not count
        assert_eq!(value(&CommentLineCounter, Language::CSharp, source), 5.0);
    }

    #[test]
    fn test_comment_lines_python() {
        let source = "# note\nx = 1  # trailing\ns = '# not a comment'\n\"\"\"docstring\"\"\"";
        assert_eq!(value(&CommentLineCounter, Language::Python, source), 2.0);
    }

    #[test]
    fn test_comment_ratio() {
        let source = "// one\ncode();\n\nmore();";
        // 1 of 3 non-blank lines
        assert_eq!(value(&CommentRatioCalculator, Language::JavaScript, source), 33.33);
        assert_eq!(value(&CommentRatioCalculator, Language::JavaScript, ""), 0.0);
    }
}
