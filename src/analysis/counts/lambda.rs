use once_cell::sync::Lazy;
use regex::Regex;

use super::scan;
use crate::analysis::lexical::ScannedLine;
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::languages::Language;
use crate::metrics::{Block, Metric, MetricKind, MetricResult};

static FAT_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\)|[A-Za-z_$][\w$]*)\s*=>").unwrap());
static THIN_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\)|[A-Za-z_]\w*)\s*->").unwrap());
static ANONYMOUS_FUNCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfunction\s*\*?\s*\(").unwrap());
static PYTHON_LAMBDA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\blambda\b[^:]*:").unwrap());
static ASSIGNED_TO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?$").unwrap()
});

/// One lambda literal and the lines its body covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaSpan {
    pub start_line: usize,
    pub end_line: usize,
    pub name: String,
}

impl LambdaSpan {
    fn to_block(&self) -> Block {
        Block::Method {
            start_line: self.start_line,
            end_line: self.end_line,
            size: self.end_line - self.start_line + 1,
            name: self.name.clone(),
        }
    }
}

/// Lambda literals: `=>`, Java `->`, anonymous `function (` and Python `lambda`.
pub struct LambdaCounter;

impl LambdaCounter {
    pub fn locate(document: &Document) -> Vec<LambdaSpan> {
        let language = document.language();
        let lines = scan(document);
        let mut found = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            let code = line.code.as_str();

            // Byte offsets where a lambda begins and where its body starts.
            let mut hits: Vec<(usize, usize)> = match language {
                Language::Python => PYTHON_LAMBDA.find_iter(code).map(|m| (m.start(), m.end())).collect(),
                Language::Java => THIN_ARROW.find_iter(code).map(|m| (m.start(), m.end())).collect(),
                Language::CSharp => FAT_ARROW.find_iter(code).map(|m| (m.start(), m.end())).collect(),
                Language::JavaScript | Language::TypeScript => FAT_ARROW
                    .find_iter(code)
                    .chain(ANONYMOUS_FUNCTION.find_iter(code))
                    .map(|m| (m.start(), m.end()))
                    .collect(),
                Language::Generic => Vec::new(),
            };
            hits.sort_unstable();

            for (start, body) in hits {
                let name = match language {
                    Language::JavaScript | Language::TypeScript => lambda_name(code, start),
                    _ => None,
                }
                .unwrap_or_else(|| "lambda".to_string());

                let end_line = if language == Language::Python {
                    index
                } else {
                    body_end(&lines, index, body)
                };
                found.push(LambdaSpan {
                    start_line: index,
                    end_line,
                    name,
                });
            }
        }
        found
    }
}

/// Name of the variable a lambda is assigned to, when the line reads `const f = (..) =>`.
fn lambda_name(code: &str, start: usize) -> Option<String> {
    let before = code.get(..start)?;
    // the parameter list sits between the `=` and the arrow
    let head = match before.rfind('=') {
        Some(position) => &before[..=position],
        None => before,
    };
    ASSIGNED_TO
        .captures(head.trim_end())
        .map(|caps| caps[1].to_string())
}

/// Last line of a lambda whose body opens with `{` right after the arrow.
/// Expression bodies end on the line they start.
fn body_end(lines: &[ScannedLine], index: usize, body: usize) -> usize {
    let rest = lines[index].code.get(body..).unwrap_or("");
    if !rest.trim_start().starts_with('{') {
        return index;
    }

    let mut balance: isize = 0;
    let mut segment = rest;
    for (offset, line) in lines[index..].iter().enumerate() {
        if offset > 0 {
            segment = line.code.as_str();
        }
        for ch in segment.chars() {
            match ch {
                '{' => balance += 1,
                '}' => {
                    balance -= 1;
                    if balance == 0 {
                        return index + offset;
                    }
                }
                _ => {}
            }
        }
    }
    lines.len().saturating_sub(1)
}

impl Metric for LambdaCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::LambdaCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let blocks: Vec<Block> = Self::locate(document).iter().map(LambdaSpan::to_block).collect();
        Ok(MetricResult::count(self.label(), blocks.len()).with_blocks(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(language: Language, source: &str) -> Vec<LambdaSpan> {
        LambdaCounter::locate(&Document::new(source, language))
    }

    #[test]
    fn test_named_arrow_function_with_block_body() {
        let found = locate(
            Language::TypeScript,
            "const handle = async (event: Event) => {\n  if (x) {\n    go();\n  }\n};",
        );
        assert_eq!(
            found,
            vec![LambdaSpan {
                start_line: 0,
                end_line: 4,
                name: "handle".to_string()
            }]
        );
    }

    #[test]
    fn test_inline_callbacks_are_unnamed() {
        let found = locate(Language::JavaScript, "items.map(x => x * 2).filter(function (y) { return y; });");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|span| span.name == "lambda" && span.end_line == 0));
    }

    #[test]
    fn test_comparison_operators_are_not_lambdas() {
        assert!(locate(Language::JavaScript, "if (a >= b && c <= d) {}").is_empty());
        assert!(locate(Language::Java, "int x = a - -b;").is_empty());
    }

    #[test]
    fn test_csharp_and_java_arrows() {
        assert_eq!(locate(Language::CSharp, "var evens = list.Where(n => n % 2 == 0);").len(), 1);
        assert_eq!(locate(Language::Java, "list.forEach((a, b) -> {\n  run(a);\n});")[0].end_line, 2);
    }

    #[test]
    fn test_python_lambda_needs_colon() {
        let found = locate(Language::Python, "key = lambda item: item.name\n# lambda x: x\nname = 'lambda: no'");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_line, 0);
    }

    #[test]
    fn test_strings_ignored() {
        assert!(locate(Language::TypeScript, "const s = \"(x) => y\";").is_empty());
    }
}
