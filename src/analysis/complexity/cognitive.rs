use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::lexical::{BlockTracker, LexicalScanner, DEFAULT_TAB_WIDTH};
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::languages::{BlockStyle, Language};
use crate::metrics::{Metric, MetricKind, MetricResult};

static BRACE_CONTROL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\}\s*)?(?:else\s+if|if|else|for|foreach|while|do|switch|try|catch|finally)\b").unwrap()
});
static BRACE_JUMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:return|break|continue|throw|yield)\b").unwrap());
static ANONYMOUS_FUNCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfunction\s*\*?\s*\(").unwrap());

static PYTHON_CONTROL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:if|elif|else|for|while|try|except|finally|with)\b|async\s+(?:with|for)\b|(?:async\s+)?def\s+\w+)").unwrap()
});
static PYTHON_LOGICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:and|or|not)\b").unwrap());
static PYTHON_JUMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\byield\s+from\b|\b(?:return|break|continue|raise|yield)\b").unwrap()
});
static PYTHON_LAMBDA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\blambda\b").unwrap());
static PYTHON_COMPREHENSIONS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\[[^\]]*\bfor\b[^\]]*\bin\b[^\]]*\]").unwrap(),
        Regex::new(r"\{[^}]*\bfor\b[^}]*\bin\b[^}]*\}").unwrap(),
        Regex::new(r"\([^)]*\bfor\b[^)]*\bin\b[^)]*\)").unwrap(),
    ]
});

static AWAIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bawait\b").unwrap());

/// Result of a cognitive complexity pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CognitiveComplexity {
    pub score: usize,
    /// Last line that added to the score
    pub hot_line: Option<usize>,
}

/// Calculator for cognitive complexity
pub struct CognitiveComplexityCalculator {
    tab_width: usize,
}

impl CognitiveComplexityCalculator {
    pub fn new() -> Self {
        Self::with_tab_width(DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(tab_width: usize) -> Self {
        Self { tab_width }
    }

    /// Single forward pass over the document.
    pub fn calculate(&self, document: &Document) -> CognitiveComplexity {
        let language = document.language();
        let mut scanner = LexicalScanner::new(language.profile());
        let mut tracker = BlockTracker::with_tab_width(language.block_style(), self.tab_width);
        let mut result = CognitiveComplexity::default();

        for (index, raw) in document.lines().iter().enumerate() {
            let line = scanner.consume(raw);
            let reading = tracker.consume(&line);
            if line.is_fully_non_code() {
                continue;
            }

            let contribution = match language.block_style() {
                BlockStyle::Brace => score_brace_line(&line.code, reading.level, language),
                BlockStyle::Indentation => score_python_line(&line.code, reading.level),
            };

            if contribution > 0 {
                result.score += contribution;
                result.hot_line = Some(index);
            }
        }

        result
    }
}

fn score_brace_line(code: &str, level: usize, language: Language) -> usize {
    let mut score = 0;

    // Control structures count once per line, weighted by nesting.
    if BRACE_CONTROL.is_match(code) {
        score += 1 + level;
    }

    score += count_logical_operators(code);
    score += BRACE_JUMP.find_iter(code).count();

    let lambdas = match language {
        Language::Java => code.matches("->").count(),
        _ => code.matches("=>").count(),
    } + ANONYMOUS_FUNCTION.find_iter(code).count();
    score += lambdas * 2 * level.max(1);

    score += AWAIT.find_iter(code).count();
    score
}

fn count_logical_operators(code: &str) -> usize {
    let chars: Vec<char> = code.chars().collect();
    let mut count = 0;
    let mut i = 0;
    while i < chars.len() {
        match (chars[i], chars.get(i + 1).copied()) {
            ('&', Some('&')) | ('|', Some('|')) => {
                count += 1;
                i += 2;
                continue;
            }
            ('!', next) if next != Some('=') => count += 1,
            _ => {}
        }
        i += 1;
    }
    count
}

fn score_python_line(code: &str, level: usize) -> usize {
    let mut score = 0;

    if PYTHON_CONTROL.is_match(code) {
        score += 1 + level;
    }

    score += PYTHON_LOGICAL.find_iter(code).count();
    score += PYTHON_JUMP.find_iter(code).count();
    score += PYTHON_LAMBDA.find_iter(code).count() * 2 * level.max(1);

    for pattern in PYTHON_COMPREHENSIONS.iter() {
        if pattern.is_match(code) {
            score += 2 + level;
        }
    }

    score += AWAIT.find_iter(code).count();
    score
}

impl Default for CognitiveComplexityCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for CognitiveComplexityCalculator {
    fn kind(&self) -> MetricKind {
        MetricKind::CognitiveComplexity
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let result = self.calculate(document);
        Ok(MetricResult::count(self.label(), result.score).with_line(result.hot_line))
    }
}
