use crate::analysis::lexical::DEFAULT_TAB_WIDTH;
use crate::analysis::methods::{MethodExtractor, MethodSpan};
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::metrics::{Metric, MetricKind, MetricResult};

/// Average size of the methods found by [`MethodExtractor`].
pub struct AverageMethodSize {
    tab_width: usize,
}

impl AverageMethodSize {
    pub fn new() -> Self {
        Self::with_tab_width(DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(tab_width: usize) -> Self {
        Self { tab_width }
    }

    /// Rounded mean of `size`, `0` without methods.
    pub fn average(spans: &[MethodSpan]) -> usize {
        if spans.is_empty() {
            return 0;
        }
        let total: usize = spans.iter().map(|span| span.size).sum();
        (total as f64 / spans.len() as f64).round() as usize
    }
}

impl Default for AverageMethodSize {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for AverageMethodSize {
    fn kind(&self) -> MetricKind {
        MetricKind::AverageMethodSize
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let spans = MethodExtractor::extract(document, self.tab_width);
        let blocks = spans.iter().map(MethodSpan::to_block).collect();
        Ok(MetricResult::count(self.label(), Self::average(&spans)).with_blocks(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language;

    fn average(language: Language, source: &str) -> f64 {
        AverageMethodSize::new()
            .extract(&Document::new(source, language))
            .unwrap()
            .value
    }

    #[test]
    fn test_no_methods() {
        assert_eq!(average(Language::CSharp, ""), 0.0);
        assert_eq!(average(Language::CSharp, "// comment\nconst x = 5;\n"), 0.0);
    }

    #[test]
    fn test_multiple_methods_average() {
        let source = r#"
public void Method1()
{
    int x = 5;
}

private int Method2()
{
    int y = 10;
    return y;
}

protected static string Method3()
{
    string z = "hello";
    Console.WriteLine(z);
    return z;
}
"#;
        // 3, 4 and 5 lines once the opening brace folds into the signature
        assert_eq!(average(Language::CSharp, source), 4.0);
    }

    #[test]
    fn test_generic_method_with_where_clause() {
        let source = "public List<T> GenericMethod<T>(T item) where T : class\n{\n    var list = new List<T>();\n    list.Add(item);\n    return list;\n}";
        assert_eq!(average(Language::CSharp, source), 5.0);
    }

    #[test]
    fn test_python_average() {
        let source = "def a():\n    return 1\n\ndef b():\n    x = 1\n    y = 2\n    return x + y\n";
        // 2 and 4, rounded mean of 3
        assert_eq!(average(Language::Python, source), 3.0);
    }

    #[test]
    fn test_blocks_carry_names() {
        let result = AverageMethodSize::new()
            .extract(&Document::new("function go() {\n  run();\n}", Language::JavaScript))
            .unwrap();
        assert_eq!(result.blocks.len(), 1);
        assert!(matches!(&result.blocks[0], crate::metrics::Block::Method { name, size: 3, .. } if name == "go"));
    }

    #[test]
    fn test_average_rounds_half_up() {
        let spans = vec![
            MethodSpan { start_line: 0, end_line: 1, size: 2, name: "a".into() },
            MethodSpan { start_line: 2, end_line: 4, size: 3, name: "b".into() },
        ];
        assert_eq!(AverageMethodSize::average(&spans), 3);
    }
}
