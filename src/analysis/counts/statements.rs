use once_cell::sync::Lazy;
use regex::Regex;

use super::scan;
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::languages::{BlockStyle, Language};
use crate::metrics::{Block, Metric, MetricKind, MetricResult};

static BRACE_IF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bif\s*\(").unwrap());
static PYTHON_IF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:if|elif)\b.*:").unwrap());

static BRACE_LOOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<foreach>foreach)\s*\(|\b(?P<for>for)\s*(?:await\s*)?\(|\b(?P<while>while)\s*\(|\b(?P<do>do)\s*(?:\{|$)|(?P<each>\.forEach)\s*\(").unwrap()
});
static DO_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\}?\s*while\s*\(.*\)\s*;").unwrap());
static PYTHON_LOOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:async\s+)?(?P<for>for)\b.*\bin\b.*:|^\s*(?P<while>while)\b.*:").unwrap()
});

static CSHARP_USING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:global\s+)?using\s+(?:static\s+)?[\w.]+(?:\s*=\s*[\w.<>, ]+)?\s*;").unwrap()
});
static JAVA_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*import\s+(?:static\s+)?[\w.*]+\s*;").unwrap());
static SCRIPT_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*import(?:\s+|\s*\{|\s*\*|\s*['\x22`])").unwrap());
static REQUIRE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\brequire\s*\(\s*['\x22`]").unwrap());
static PYTHON_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:from\s+[.\w]+\s+import\b|import\s+\w)").unwrap());

fn location_result(label: &str, locations: Vec<(usize, &'static str)>) -> MetricResult {
    let blocks: Vec<Block> = locations
        .into_iter()
        .map(|(line, kind)| Block::location(line, kind))
        .collect();
    MetricResult::count(label, blocks.len()).with_blocks(blocks)
}

/// `if` statements, `else if` included.
pub struct IfCounter;

impl IfCounter {
    pub fn locate(document: &Document) -> Vec<(usize, &'static str)> {
        let python = document.language().block_style() == BlockStyle::Indentation;
        let mut found = Vec::new();
        for (index, line) in scan(document).iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            let hits = if python {
                usize::from(PYTHON_IF.is_match(&line.code))
            } else {
                BRACE_IF.find_iter(&line.code).count()
            };
            found.extend(std::iter::repeat((index, "if")).take(hits));
        }
        found
    }
}

impl Metric for IfCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::IfCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        Ok(location_result(self.label(), Self::locate(document)))
    }
}

/// Loop statements by kind.
pub struct LoopCounter;

impl LoopCounter {
    pub fn locate(document: &Document) -> Vec<(usize, &'static str)> {
        let lines = scan(document);
        let mut found = Vec::new();

        if document.language().block_style() == BlockStyle::Indentation {
            for (index, line) in lines.iter().enumerate().filter(|(_, line)| line.is_code()) {
                if let Some(caps) = PYTHON_LOOP.captures(&line.code) {
                    let kind = if caps.name("for").is_some() { "for" } else { "while" };
                    found.push((index, kind));
                }
            }
            return found;
        }

        // `do` blocks whose closing `while (..);` has not been seen yet
        let mut open_do = 0usize;
        for (index, line) in lines.iter().enumerate().filter(|(_, line)| line.is_code()) {
            let closes_do = open_do > 0 && DO_TAIL.is_match(&line.code);
            for caps in BRACE_LOOP.captures_iter(&line.code) {
                let kind = if caps.name("foreach").is_some() {
                    "foreach"
                } else if caps.name("for").is_some() {
                    "for"
                } else if caps.name("do").is_some() {
                    open_do += 1;
                    "do-while"
                } else if caps.name("each").is_some() {
                    "forEach"
                } else if closes_do {
                    open_do -= 1;
                    continue;
                } else {
                    "while"
                };
                found.push((index, kind));
            }
        }
        found
    }
}

impl Metric for LoopCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::LoopCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        Ok(location_result(self.label(), Self::locate(document)))
    }
}

/// Import, `using` and `require` statements. A statement spread over several
/// lines counts once.
pub struct ImportCounter;

impl ImportCounter {
    pub fn locate(document: &Document) -> Vec<(usize, &'static str)> {
        let language = document.language();
        let mut found = Vec::new();
        // closing character of a multi-line import still open
        let mut continuation: Option<char> = None;

        for (index, line) in scan(document).iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            let code = line.code.as_str();

            if let Some(close) = continuation {
                if code.contains(close) {
                    continuation = None;
                }
                continue;
            }

            match language {
                Language::CSharp => {
                    if CSHARP_USING.is_match(code) {
                        found.push((index, "import"));
                    }
                }
                Language::Java => {
                    if JAVA_IMPORT.is_match(code) {
                        found.push((index, "import"));
                    }
                }
                Language::JavaScript | Language::TypeScript => {
                    if SCRIPT_IMPORT.is_match(code) {
                        found.push((index, "import"));
                        if code.contains('{') && !code.contains('}') {
                            continuation = Some('}');
                        }
                    } else {
                        let requires = REQUIRE.find_iter(code).count();
                        found.extend(std::iter::repeat((index, "import")).take(requires));
                    }
                }
                Language::Python => {
                    if PYTHON_IMPORT.is_match(code) {
                        found.push((index, "import"));
                        if code.contains('(') && !code.contains(')') {
                            continuation = Some(')');
                        }
                    }
                }
                Language::Generic => {}
            }
        }
        found
    }
}

impl Metric for ImportCounter {
    fn kind(&self) -> MetricKind {
        MetricKind::ImportCount
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        Ok(location_result(self.label(), Self::locate(document)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(locations: Vec<(usize, &'static str)>) -> Vec<&'static str> {
        locations.into_iter().map(|(_, kind)| kind).collect()
    }

    #[test]
    fn test_if_count_brace() {
        let source = "if (a) {\n} else if (b) {\n}\n// if (c)\nvar s = \"if (d)\";\nif(e) x(); if (f) y();";
        let result = IfCounter.extract(&Document::new(source, Language::CSharp)).unwrap();
        assert_eq!(result.value, 4.0);
        assert_eq!(result.blocks[0], Block::location(0, "if"));
        assert_eq!(result.blocks[3].start_line(), 5);
    }

    #[test]
    fn test_if_count_python() {
        let source = "if a:\n    pass\nelif b:\n    pass\nx = 1 if c else 2\n# if d:";
        let found = IfCounter::locate(&Document::new(source, Language::Python));
        assert_eq!(found, vec![(0, "if"), (2, "if")]);
    }

    #[test]
    fn test_loop_kinds_brace() {
        let source = r#"
for (int i = 0; i < n; i++) { }
foreach (var item in items) { }
while (running) { }
do {
    step();
} while (more);
items.forEach(x => use(x));
"#;
        let found = LoopCounter::locate(&Document::new(source, Language::CSharp));
        assert_eq!(kinds(found), vec!["for", "foreach", "while", "do-while", "forEach"]);
    }

    #[test]
    fn test_loop_kinds_python() {
        let source = "for x in items:\n    while x:\n        x -= 1\nsquares = [y for y in items]\nasync for a in stream():\n    pass";
        let found = LoopCounter::locate(&Document::new(source, Language::Python));
        assert_eq!(found, vec![(0, "for"), (1, "while"), (4, "for")]);
    }

    #[test]
    fn test_csharp_usings() {
        let source = "using System;\nusing static System.Math;\nusing Alias = System.Text;\nusing (var stream = Open()) { }";
        assert_eq!(ImportCounter::locate(&Document::new(source, Language::CSharp)).len(), 3);
    }

    #[test]
    fn test_script_imports() {
        let source = "import React from 'react';\nimport {\n  a,\n  b,\n} from './x';\nconst fs = require('fs');\nimport './side-effect';";
        let found = ImportCounter::locate(&Document::new(source, Language::TypeScript));
        let lines: Vec<usize> = found.into_iter().map(|(line, _)| line).collect();
        assert_eq!(lines, vec![0, 1, 5, 6]);
    }

    #[test]
    fn test_python_imports() {
        let source = "import os\nfrom typing import (\n    List,\n    Dict,\n)\nfrom . import sibling\n# import hidden";
        assert_eq!(ImportCounter::locate(&Document::new(source, Language::Python)).len(), 3);
    }

    #[test]
    fn test_java_imports() {
        let source = "package app;\nimport java.util.List;\nimport static org.junit.Assert.*;";
        assert_eq!(ImportCounter::locate(&Document::new(source, Language::Java)).len(), 2);
    }
}
