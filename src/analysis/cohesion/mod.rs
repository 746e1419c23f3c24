pub mod brace;
pub mod python;

pub use brace::{locate_classes, locate_declarations, CLikeRules, ScriptRules};
pub use python::PythonRules;

use std::collections::{BTreeSet, HashSet};

use crate::analysis::lexical::{LexicalScanner, ScannedLine, DEFAULT_TAB_WIDTH};
use crate::analysis::methods::{MethodExtractor, MethodSpan};
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::languages::{BlockStyle, SignatureFamily};
use crate::metrics::{Metric, MetricKind, MetricResult};

/// Line range of one class body. Lines are 0-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpan {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl ClassSpan {
    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

/// Language specific rules for finding attributes and their uses.
pub trait AttributeRules {
    fn locate_classes(&self, lines: &[ScannedLine]) -> Vec<ClassSpan>;

    /// Attribute declared by a class-level line outside any method.
    fn declared(&self, code: &str) -> Option<String>;

    /// Attributes assigned through the receiver (`this.x = ..`, `self.x = ..`).
    fn assigned(&self, code: &str) -> Vec<String>;

    /// Names a method body refers to.
    fn referenced(&self, body: &[&str]) -> HashSet<String>;

    fn is_excluded_method(&self, method: &str, class: &str) -> bool;
}

/// A method and how many of its class attributes it uses.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCohesion {
    pub span: MethodSpan,
    pub used: usize,
    pub ratio: f64,
}

/// Attributes and analysed methods of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCohesion {
    pub class: ClassSpan,
    pub attributes: BTreeSet<String>,
    pub methods: Vec<MethodCohesion>,
}

/// Field/method cohesion.
///
/// Every method ratio is pooled into one mean across all classes of the
/// document, it is not weighted per class.
pub struct CohesionAnalyzer {
    tab_width: usize,
}

impl CohesionAnalyzer {
    pub fn new() -> Self {
        Self::with_tab_width(DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(tab_width: usize) -> Self {
        Self { tab_width }
    }

    pub fn analyze(&self, document: &Document) -> Vec<ClassCohesion> {
        let language = document.language();
        let rules: Box<dyn AttributeRules> = match (language.block_style(), language.profile().signature) {
            (BlockStyle::Indentation, _) => Box::new(PythonRules::with_tab_width(self.tab_width)),
            (BlockStyle::Brace, SignatureFamily::Script) => Box::new(ScriptRules),
            (BlockStyle::Brace, _) => Box::new(CLikeRules),
        };

        let lines = LexicalScanner::scan_all(language.profile(), document.lines());
        let methods = outermost_methods(MethodExtractor::extract(document, self.tab_width));
        Self::collect(rules.as_ref(), &lines, methods)
    }

    fn collect(rules: &dyn AttributeRules, lines: &[ScannedLine], methods: Vec<MethodSpan>) -> Vec<ClassCohesion> {
        let classes = rules.locate_classes(lines);
        let mut result: Vec<ClassCohesion> = classes
            .iter()
            .cloned()
            .map(|class| ClassCohesion {
                class,
                attributes: BTreeSet::new(),
                methods: Vec::new(),
            })
            .collect();

        for (index, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            let Some(owner) = innermost_class(&classes, index) else {
                continue;
            };
            let attributes = &mut result[owner].attributes;
            attributes.extend(rules.assigned(&line.code));

            let in_method = methods.iter().any(|span| span.contains(index));
            if !in_method && index != classes[owner].start_line {
                attributes.extend(rules.declared(&line.code));
            }
        }

        for span in methods {
            let Some(owner) = innermost_class(&classes, span.start_line) else {
                continue;
            };
            if rules.is_excluded_method(&span.name, &classes[owner].name) {
                continue;
            }

            let end = span.end_line.min(lines.len().saturating_sub(1));
            let body: Vec<&str> = lines[span.start_line..=end].iter().map(|line| line.code.as_str()).collect();
            let referenced = rules.referenced(&body);

            let class = &mut result[owner];
            let used = class.attributes.iter().filter(|attribute| referenced.contains(*attribute)).count();
            let ratio = if class.attributes.is_empty() {
                0.0
            } else {
                used as f64 / class.attributes.len() as f64
            };
            class.methods.push(MethodCohesion { span, used, ratio });
        }

        result
    }

    /// Pooled mean of every method ratio as a rounded percentage.
    pub fn score(classes: &[ClassCohesion]) -> usize {
        let ratios: Vec<f64> = classes
            .iter()
            .flat_map(|class| class.methods.iter().map(|method| method.ratio))
            .collect();
        if ratios.is_empty() {
            return 0;
        }
        let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
        (mean * 100.0).round() as usize
    }
}

/// Index of the latest-starting class that contains `line`.
pub(crate) fn innermost_class(classes: &[ClassSpan], line: usize) -> Option<usize> {
    classes
        .iter()
        .enumerate()
        .filter(|(_, class)| class.contains(line))
        .max_by_key(|(_, class)| class.start_line)
        .map(|(index, _)| index)
}

/// Drop spans nested inside another span, such as local functions.
fn outermost_methods(spans: Vec<MethodSpan>) -> Vec<MethodSpan> {
    spans
        .iter()
        .filter(|span| {
            !spans.iter().any(|outer| {
                outer != *span && outer.start_line <= span.start_line && span.end_line <= outer.end_line
            })
        })
        .cloned()
        .collect()
}

impl Default for CohesionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for CohesionAnalyzer {
    fn kind(&self) -> MetricKind {
        MetricKind::Cohesion
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let classes = self.analyze(document);
        let mut methods: Vec<&MethodCohesion> = classes.iter().flat_map(|class| class.methods.iter()).collect();
        // least cohesive first
        methods.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
        let blocks = methods.iter().map(|method| method.span.to_block()).collect();

        Ok(MetricResult::count(self.label(), Self::score(&classes)).with_blocks(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language;

    fn cohesion(language: Language, source: &str) -> f64 {
        CohesionAnalyzer::new()
            .extract(&Document::new(source, language))
            .unwrap()
            .value
    }

    #[test]
    fn test_all_methods_use_all_fields() {
        let source = r#"
public class Counter
{
    private int count;
    private int step;

    public void Increment()
    {
        count += step;
    }

    public int Next()
    {
        return count + step;
    }
}
"#;
        assert_eq!(cohesion(Language::CSharp, source), 100.0);
    }

    #[test]
    fn test_partial_usage() {
        let source = r#"
public class Account {
    private double balance;
    private String owner;

    public Account(String owner) {
        this.owner = owner;
    }

    public void deposit(double amount) {
        balance += amount;
    }

    public String describe() {
        return owner + ": " + balance;
    }
}
"#;
        // constructor excluded, 1/2 and 2/2
        assert_eq!(cohesion(Language::Java, source), 75.0);
    }

    #[test]
    fn test_no_attributes_is_zero() {
        let source = "class Greeter {\n  greet() {\n    return 'hi';\n  }\n}";
        assert_eq!(cohesion(Language::JavaScript, source), 0.0);
    }

    #[test]
    fn test_no_classes_is_zero() {
        assert_eq!(cohesion(Language::TypeScript, "function f(a: number) {\n  return a;\n}"), 0.0);
        assert_eq!(cohesion(Language::Python, ""), 0.0);
    }

    #[test]
    fn test_pooled_across_classes() {
        let source = r#"
class A {
  constructor() {
    this.x = 1;
  }
  useX() {
    return this.x;
  }
}
class B {
  constructor() {
    this.y = 1;
    this.z = 2;
  }
  useY() {
    return this.y;
  }
  useNothing() {
    return 0;
  }
  useBoth() {
    return this.y + this.z;
  }
}
"#;
        // (1 + 0.5 + 0 + 1) / 4
        assert_eq!(cohesion(Language::JavaScript, source), 63.0);
    }

    #[test]
    fn test_blocks_sorted_by_ratio() {
        let source = "class P:\n    def __init__(self):\n        self.a = 1\n\n    def uses(self):\n        return self.a\n\n    def ignores(self):\n        return 0\n";
        let result = CohesionAnalyzer::new()
            .extract(&Document::new(source, Language::Python))
            .unwrap();
        assert_eq!(result.value, 50.0);
        let names: Vec<&str> = result
            .blocks
            .iter()
            .map(|block| match block {
                crate::metrics::Block::Method { name, .. } => name.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(names, vec!["ignores", "uses"]);
    }

    #[test]
    fn test_outermost_methods_drops_nested() {
        let spans = vec![
            MethodSpan { start_line: 0, end_line: 10, size: 11, name: "outer".into() },
            MethodSpan { start_line: 2, end_line: 4, size: 3, name: "inner".into() },
            MethodSpan { start_line: 11, end_line: 12, size: 2, name: "next".into() },
        ];
        let names: Vec<String> = outermost_methods(spans).into_iter().map(|span| span.name).collect();
        assert_eq!(names, vec!["outer", "next"]);
    }
}
