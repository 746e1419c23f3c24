use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{AttributeRules, ClassSpan};
use crate::analysis::lexical::{BlockTracker, ScannedLine};
use crate::languages::BlockStyle;

static CLASS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:class|struct|record)\s+([A-Za-z_$][\w$]*)").unwrap());

static TYPED_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|readonly|final|const|volatile|transient|required|new|event|override|virtual|abstract|sealed|unsafe)\s+)*([\w.]+(?:<[^;=(){}]*>)?(?:\[[\s,]*\])*\??)\s+@?([A-Za-z_]\w*)\s*(?:=|;|\{|$)",
    )
    .unwrap()
});

static SCRIPT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|private|protected|readonly|static|declare|override|abstract|accessor)\s+)*#?([A-Za-z_$][\w$]*)\s*[?!]?\s*(?::|=(?:[^=>]|$)|;)",
    )
    .unwrap()
});

static THIS_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bthis\.#?([A-Za-z_$][\w$]*)\s*=(?:[^=>]|$)").unwrap());

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_$][\w$]*").unwrap());

/// Words that can sit in the type position of a statement but never declare a field.
const NOT_A_TYPE: &[&str] = &[
    "return", "throw", "new", "else", "using", "import", "package", "case", "goto", "yield", "await",
    "class", "interface", "enum", "struct", "record", "namespace", "delegate", "get", "set", "init",
    "add", "remove", "default", "var",
];

const NOT_A_FIELD: &[&str] = &[
    "return", "case", "default", "const", "let", "var", "get", "set", "constructor", "if", "else",
    "for", "while", "switch", "try", "catch", "finally", "throw", "class", "extends", "implements",
];

/// Classes of brace languages: from the header to the brace that closes its body.
pub fn locate_classes(lines: &[ScannedLine]) -> Vec<ClassSpan> {
    locate_declarations(lines, &CLASS_HEADER)
}

/// Declarations whose first capture group in `header` names them, each
/// spanning to the brace that closes its body. A header followed by `;`
/// before any `{` has no body and is skipped.
pub fn locate_declarations(lines: &[ScannedLine], header: &Regex) -> Vec<ClassSpan> {
    let mut tracker = BlockTracker::new(BlockStyle::Brace);
    let mut pending: Option<(String, usize)> = None;
    let mut open: Vec<(ClassSpan, usize)> = Vec::new();
    let mut found = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let reading = tracker.consume(line);

        if let Some(caps) = header.captures(&line.code) {
            pending = Some((caps[1].to_string(), index));
        }

        if let Some((name, start_line)) = pending.take() {
            if line.count('{') > 0 {
                let span = ClassSpan {
                    name,
                    start_line,
                    end_line: index,
                };
                open.push((span, reading.level));
            } else if !line.trimmed().ends_with(';') {
                pending = Some((name, start_line));
            }
        }

        while open.last().map_or(false, |(_, depth)| reading.depth <= *depth) {
            if let Some((mut span, _)) = open.pop() {
                span.end_line = index;
                found.push(span);
            }
        }
    }

    let last_line = lines.len().saturating_sub(1);
    found.extend(open.into_iter().map(|(mut span, _)| {
        span.end_line = last_line;
        span
    }));
    found.sort_by_key(|span| span.start_line);
    found
}

fn this_assignments(code: &str) -> Vec<String> {
    THIS_ASSIGNMENT
        .captures_iter(code)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn words(body: &[&str]) -> HashSet<String> {
    body.iter()
        .flat_map(|line| WORD.find_iter(line))
        .map(|word| word.as_str().to_string())
        .collect()
}

/// C# and Java: typed fields, auto-properties and `this.x =` assignments.
pub struct CLikeRules;

impl AttributeRules for CLikeRules {
    fn locate_classes(&self, lines: &[ScannedLine]) -> Vec<ClassSpan> {
        locate_classes(lines)
    }

    fn declared(&self, code: &str) -> Option<String> {
        let caps = TYPED_FIELD.captures(code)?;
        let type_name = caps.get(1)?.as_str();
        if NOT_A_TYPE.contains(&type_name) {
            return None;
        }
        Some(caps[2].to_string())
    }

    fn assigned(&self, code: &str) -> Vec<String> {
        this_assignments(code)
    }

    fn referenced(&self, body: &[&str]) -> HashSet<String> {
        words(body)
    }

    fn is_excluded_method(&self, method: &str, class: &str) -> bool {
        method == class
    }
}

/// JavaScript and TypeScript: class fields and `this.x =` assignments.
pub struct ScriptRules;

impl AttributeRules for ScriptRules {
    fn locate_classes(&self, lines: &[ScannedLine]) -> Vec<ClassSpan> {
        locate_classes(lines)
    }

    fn declared(&self, code: &str) -> Option<String> {
        let caps = SCRIPT_FIELD.captures(code)?;
        let name = caps.get(1)?.as_str();
        if NOT_A_FIELD.contains(&name) {
            return None;
        }
        Some(name.to_string())
    }

    fn assigned(&self, code: &str) -> Vec<String> {
        this_assignments(code)
    }

    fn referenced(&self, body: &[&str]) -> HashSet<String> {
        words(body)
    }

    fn is_excluded_method(&self, method: &str, _class: &str) -> bool {
        method == "constructor"
    }
}
