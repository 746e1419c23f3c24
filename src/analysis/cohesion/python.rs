use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{AttributeRules, ClassSpan};
use crate::analysis::lexical::{ScannedLine, DEFAULT_TAB_WIDTH};

static CLASS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*class\s+([A-Za-z_]\w*)").unwrap());
static SELF_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bself\.([A-Za-z_]\w*)\s*=(?:[^=]|$)").unwrap());
static SELF_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bself\.([A-Za-z_]\w*)").unwrap());
static CLASS_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+([A-Za-z_]\w*)\s*(?::\s*[^=]+)?=(?:[^=]|$)|^\s+([A-Za-z_]\w*)\s*:\s*[A-Za-z_][\w\[\]., |]*\s*$").unwrap()
});

const KEYWORDS: &[&str] = &["else", "try", "finally", "except", "return", "pass", "lambda", "if", "for", "while", "with"];

/// Python: `self.x = ..` anywhere in the class plus class-level assignments.
pub struct PythonRules {
    tab_width: usize,
}

impl PythonRules {
    pub fn new() -> Self {
        Self::with_tab_width(DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(tab_width: usize) -> Self {
        Self { tab_width }
    }
}

impl Default for PythonRules {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeRules for PythonRules {
    /// A class ends at its last code line before a code line at or left of the header.
    fn locate_classes(&self, lines: &[ScannedLine]) -> Vec<ClassSpan> {
        let mut open: Vec<(ClassSpan, usize)> = Vec::new();
        let mut found = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if !line.is_code() {
                continue;
            }
            let indent = line.indent(self.tab_width);

            while open.last().map_or(false, |(_, class_indent)| indent <= *class_indent) {
                if let Some((span, _)) = open.pop() {
                    found.push(span);
                }
            }

            for (span, _) in open.iter_mut() {
                span.end_line = index;
            }

            if let Some(caps) = CLASS_HEADER.captures(&line.code) {
                let span = ClassSpan {
                    name: caps[1].to_string(),
                    start_line: index,
                    end_line: index,
                };
                open.push((span, indent));
            }
        }

        found.extend(open.into_iter().map(|(span, _)| span));
        found.sort_by_key(|span| span.start_line);
        found
    }

    fn declared(&self, code: &str) -> Option<String> {
        let caps = CLASS_ATTRIBUTE.captures(code)?;
        let name = caps.get(1).or_else(|| caps.get(2))?.as_str();
        if KEYWORDS.contains(&name) {
            return None;
        }
        Some(name.to_string())
    }

    fn assigned(&self, code: &str) -> Vec<String> {
        SELF_ASSIGNMENT
            .captures_iter(code)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    fn referenced(&self, body: &[&str]) -> HashSet<String> {
        body.iter()
            .flat_map(|line| SELF_REFERENCE.captures_iter(line))
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// `__init__` and the other dunder methods.
    fn is_excluded_method(&self, method: &str, _class: &str) -> bool {
        method.len() > 4 && method.starts_with("__") && method.ends_with("__")
    }
}
