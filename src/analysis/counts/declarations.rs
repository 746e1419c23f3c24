use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::scan;
use crate::analysis::cohesion::{innermost_class, locate_classes, locate_declarations};
use crate::analysis::lexical::DEFAULT_TAB_WIDTH;
use crate::analysis::methods::{MethodExtractor, MethodSpan};
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::languages::{BlockStyle, Language};
use crate::metrics::{Block, Metric, MetricKind, MetricResult};

static BRACE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:public|private|protected|internal|export|default|abstract|sealed|static|final|partial|declare)\s+){0,3}class\s+[A-Za-z_$]").unwrap()
});
static PYTHON_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*class\s+\w+\s*(?:\(.*\))?\s*:").unwrap());

static SCRIPT_CONSTRUCTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:public|private|protected)\s+)?constructor\s*\(").unwrap()
});
static TYPED_CONSTRUCTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static)\s+)*([A-Za-z_]\w*)\s*\(").unwrap()
});
static PYTHON_CONSTRUCTOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*def\s+__init__\s*\(").unwrap());

static CSHARP_ACCESSOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:get|set|init)\s*(?:;|\{|=>)").unwrap()
});
static JAVA_GETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:public|private|protected|static|final|synchronized)\s+)*[\w<>\[\],.?]+\s+(?:get|is)[A-Z]\w*\s*\(\s*\)").unwrap()
});
static JAVA_SETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:public|private|protected|static|final|synchronized)\s+)*void\s+set[A-Z]\w*\s*\(\s*[^,()]+\)").unwrap()
});
static SCRIPT_ACCESSOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:public|private|protected|static|override)\s+)*(?:get|set)\s+#?[A-Za-z_$][\w$]*\s*\(").unwrap()
});

static OBJECT_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:public|private|protected|internal|export|default|abstract|sealed|static|final|partial|declare|readonly|const|file|unsafe)\s+)*(class|interface|enum|struct|record|namespace|delegate)\s+[\w.]").unwrap()
});

static INTERFACE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\binterface\s+([A-Za-z_$][\w$]*)").unwrap());

/// Class declarations.
pub struct ClassCounter;

impl ClassCounter {
    pub fn locate(document: &Document) -> Vec<usize> {
        let pattern: &Regex = match document.language().block_style() {
            BlockStyle::Indentation => &*PYTHON_CLASS,
            BlockStyle::Brace => &*BRACE_CLASS,
        };
        scan(document)
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_code() && pattern.is_match(&line.code))
            .map(|(index, _)| index)
            .collect()
    }
}

impl Metric for ClassCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::ClassCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let blocks: Vec<Block> = Self::locate(document)
            .into_iter()
            .map(|line| Block::location(line, "class"))
            .collect();
        Ok(MetricResult::count(self.label(), blocks.len()).with_blocks(blocks))
    }
}

/// Number of methods the extractor finds.
pub struct MethodCounter {
    tab_width: usize,
}

impl MethodCounter {
    pub fn new() -> Self {
        Self::with_tab_width(DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(tab_width: usize) -> Self {
        Self { tab_width }
    }
}

impl Default for MethodCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for MethodCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::MethodCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let blocks: Vec<Block> = MethodExtractor::extract(document, self.tab_width)
            .iter()
            .map(MethodSpan::to_block)
            .collect();
        Ok(MetricResult::count(self.label(), blocks.len()).with_blocks(blocks))
    }
}

/// Constructor declarations.
pub struct ConstructorCounter;

impl ConstructorCounter {
    pub fn locate(document: &Document) -> Vec<usize> {
        let lines = scan(document);
        let code_lines = || lines.iter().enumerate().filter(|(_, line)| line.is_code());

        match document.language() {
            Language::Python => code_lines()
                .filter(|(_, line)| PYTHON_CONSTRUCTOR.is_match(&line.code))
                .map(|(index, _)| index)
                .collect(),
            Language::JavaScript | Language::TypeScript => code_lines()
                .filter(|(_, line)| SCRIPT_CONSTRUCTOR.is_match(&line.code))
                .map(|(index, _)| index)
                .collect(),
            Language::CSharp | Language::Java => {
                let classes = locate_classes(&lines);
                code_lines()
                    .filter(|(index, line)| {
                        let Some(owner) = innermost_class(&classes, *index) else {
                            return false;
                        };
                        let declares = TYPED_CONSTRUCTOR
                            .captures(&line.code)
                            .map_or(false, |caps| caps[1] == classes[owner].name);
                        declares && !line.trimmed().ends_with(';')
                    })
                    .map(|(index, _)| index)
                    .collect()
            }
            Language::Generic => Vec::new(),
        }
    }
}

impl Metric for ConstructorCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::ConstructorCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let blocks: Vec<Block> = Self::locate(document)
            .into_iter()
            .map(|line| Block::location(line, "constructor"))
            .collect();
        Ok(MetricResult::count(self.label(), blocks.len()).with_blocks(blocks))
    }
}

/// Property accessors and accessor methods.
///
/// A C# auto-property `{ get; set; }` contributes one for each accessor.
pub struct GetterSetterCounter;

impl GetterSetterCounter {
    pub fn count(document: &Document) -> usize {
        let language = document.language();
        scan(document)
            .iter()
            .filter(|line| line.is_code())
            .map(|line| {
                let code = line.code.as_str();
                match language {
                    Language::CSharp => CSHARP_ACCESSOR.find_iter(code).count(),
                    Language::Java => usize::from(JAVA_GETTER.is_match(code)) + usize::from(JAVA_SETTER.is_match(code)),
                    Language::JavaScript | Language::TypeScript => usize::from(SCRIPT_ACCESSOR.is_match(code)),
                    Language::Python | Language::Generic => 0,
                }
            })
            .sum()
    }
}

impl Metric for GetterSetterCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::GetterSetterCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        Ok(MetricResult::count(self.label(), Self::count(document)))
    }
}

/// Kind of top-level declaration, with its numeric code as the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Class = 1,
    Interface = 2,
    Enum = 3,
    Struct = 4,
    Record = 5,
    Namespace = 6,
    Delegate = 7,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 7] = [
        ObjectKind::Class,
        ObjectKind::Interface,
        ObjectKind::Enum,
        ObjectKind::Struct,
        ObjectKind::Record,
        ObjectKind::Namespace,
        ObjectKind::Delegate,
    ];

    pub fn code(&self) -> usize {
        *self as usize
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(ObjectKind::Class),
            "interface" => Some(ObjectKind::Interface),
            "enum" => Some(ObjectKind::Enum),
            "struct" => Some(ObjectKind::Struct),
            "record" => Some(ObjectKind::Record),
            "namespace" => Some(ObjectKind::Namespace),
            "delegate" => Some(ObjectKind::Delegate),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Class => "Class",
            ObjectKind::Interface => "Interface",
            ObjectKind::Enum => "Enum",
            ObjectKind::Struct => "Struct",
            ObjectKind::Record => "Record",
            ObjectKind::Namespace => "Namespace",
            ObjectKind::Delegate => "Delegate",
        };
        f.write_str(name)
    }
}

/// Dominant declaration kind of a document.
pub struct ObjectTypeClassifier;

impl ObjectTypeClassifier {
    /// The most frequent kind, ties resolved in [`ObjectKind::ALL`] order.
    pub fn classify(document: &Document) -> Option<ObjectKind> {
        let lines = scan(document);
        let mut counts = [0usize; 7];

        for line in lines.iter().filter(|line| line.is_code()) {
            let kind = match document.language().block_style() {
                BlockStyle::Indentation => PYTHON_CLASS.is_match(&line.code).then_some(ObjectKind::Class),
                BlockStyle::Brace => OBJECT_DECLARATION
                    .captures(&line.code)
                    .and_then(|caps| ObjectKind::from_keyword(&caps[1])),
            };
            if let Some(kind) = kind {
                counts[kind.code() - 1] += 1;
            }
        }

        let mut dominant: Option<(ObjectKind, usize)> = None;
        for kind in ObjectKind::ALL {
            let count = counts[kind.code() - 1];
            if count > dominant.map_or(0, |(_, best)| best) {
                dominant = Some((kind, count));
            }
        }
        dominant.map(|(kind, _)| kind)
    }
}

impl Metric for ObjectTypeClassifier {
    fn kind(&self) -> MetricKind {
        MetricKind::ObjectType
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        Ok(match Self::classify(document) {
            Some(kind) => MetricResult::count(format!("{}: {}", self.label(), kind), kind.code()),
            None => MetricResult::zero(self.label()),
        })
    }
}

/// Parameters of constructor-like signatures declared inside interfaces.
pub struct InterfaceParameterCounter;

impl InterfaceParameterCounter {
    pub fn count(document: &Document) -> Result<usize, MetricError> {
        let lines = scan(document);
        let mut total = 0;

        for interface in locate_declarations(&lines, &INTERFACE_HEADER) {
            let body = lines[interface.start_line..=interface.end_line]
                .iter()
                .map(|line| line.code.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let constructor = Regex::new(&format!(r"\b{}\s*\(([^)]*)\)", regex::escape(&interface.name)))?;
            total += constructor
                .captures_iter(&body)
                .map(|caps| count_parameters(&caps[1]))
                .sum::<usize>();
        }
        Ok(total)
    }
}

/// Comma separated parameters, ignoring commas nested in `<..>`.
pub fn count_parameters(list: &str) -> usize {
    let mut count = 0;
    let mut depth = 0usize;
    let mut current = String::new();

    for ch in list.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                if !current.trim().is_empty() {
                    count += 1;
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.trim().is_empty() {
        count += 1;
    }
    count
}

impl Metric for InterfaceParameterCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::InterfaceConstructorParameters
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        Ok(MetricResult::count(self.label(), Self::count(document)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(language: Language, source: &str) -> Document {
        Document::new(source, language)
    }

    #[test]
    fn test_class_count() {
        let source = "public abstract partial class A { }\n// class Hidden {}\nexport default class B {}\nvar s = \"class C\";";
        assert_eq!(ClassCounter::locate(&doc(Language::TypeScript, source)), vec![0, 2]);
        let python = "class A:\n    pass\nclass B(Base, metaclass=M):\n    pass\nclassify = 1";
        assert_eq!(ClassCounter::locate(&doc(Language::Python, python)), vec![0, 2]);
    }

    #[test]
    fn test_method_count_uses_extractor() {
        let result = MethodCounter::new()
            .extract(&doc(Language::Python, "def a():\n    pass\n\ndef b():\n    pass\n"))
            .unwrap();
        assert_eq!(result.value, 2.0);
        assert_eq!(result.blocks.len(), 2);
    }

    #[test]
    fn test_typed_constructors() {
        let source = r#"
public class Order
{
    public Order() { }
    private Order(int id) : this() { }
    public void Reset() { Order(); }
    static Order() { }
}
"#;
        assert_eq!(ConstructorCounter::locate(&doc(Language::CSharp, source)), vec![3, 4, 6]);
    }

    #[test]
    fn test_script_and_python_constructors() {
        let script = "class A {\n  constructor(x) {\n    this.x = x;\n  }\n}";
        assert_eq!(ConstructorCounter::locate(&doc(Language::JavaScript, script)), vec![1]);
        let python = "class A:\n    def __init__(self):\n        pass\n    def other(self):\n        pass";
        assert_eq!(ConstructorCounter::locate(&doc(Language::Python, python)), vec![1]);
    }

    #[test]
    fn test_csharp_accessors() {
        let source = r#"
public int Age { get; set; }
public string Name { get; private set; }
public int Id { get; }
public int Total
{
    get { return total; }
    set { total = value; }
}
public int Double => value * 2;
"#;
        assert_eq!(GetterSetterCounter::count(&doc(Language::CSharp, source)), 7);
    }

    #[test]
    fn test_java_and_script_accessors() {
        let java = "public String getName() {\n  return name;\n}\npublic void setName(String name) {\n  this.name = name;\n}\npublic boolean isReady() { return ready; }\npublic void setPair(int a, int b) { }";
        assert_eq!(GetterSetterCounter::count(&doc(Language::Java, java)), 3);
        let script = "class A {\n  get size() { return 1; }\n  set size(v) { }\n  static get instance() { return a; }\n}";
        assert_eq!(GetterSetterCounter::count(&doc(Language::TypeScript, script)), 3);
    }

    #[test]
    fn test_object_type_dominant_kind() {
        let source = "namespace App\n{\n    public interface IA { }\n    public interface IB { }\n    public class C { }\n}";
        let result = ObjectTypeClassifier.extract(&doc(Language::CSharp, source)).unwrap();
        assert_eq!(result.value, 2.0);
        assert_eq!(result.label, "Object type: Interface");
    }

    #[test]
    fn test_object_type_tie_keeps_first_kind() {
        let source = "public enum Color { Red }\npublic class Palette { }";
        assert_eq!(ObjectTypeClassifier::classify(&doc(Language::Java, source)), Some(ObjectKind::Class));
        assert_eq!(ObjectTypeClassifier::classify(&doc(Language::Java, "int x = 1;")), None);
        let result = ObjectTypeClassifier.extract(&doc(Language::Python, "")).unwrap();
        assert_eq!((result.label.as_str(), result.value), ("Object type", 0.0));
    }

    #[test]
    fn test_interface_constructor_parameters() {
        let source = r#"
public interface IRepository
{
    IRepository(Dictionary<string, int> cache, string name);
    void Save();
}
interface IEmpty { IEmpty(); }
"#;
        assert_eq!(InterfaceParameterCounter::count(&doc(Language::CSharp, source)).unwrap(), 2);
    }

    #[test]
    fn test_count_parameters() {
        assert_eq!(count_parameters(""), 0);
        assert_eq!(count_parameters("int a"), 1);
        assert_eq!(count_parameters("Map<K, List<V>> m, int n"), 2);
        assert_eq!(count_parameters("a, , b"), 2);
    }
}
