use serde::{Deserialize, Serialize};

/// A highlighted range attached to a metric result. Line indices are 0-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A method or lambda body
    Method {
        start_line: usize,
        end_line: usize,
        size: usize,
        name: String,
    },
    /// One occurrence of a duplicated region
    Duplicate {
        start_line: usize,
        end_line: usize,
        block_id: String,
    },
    /// A single construct such as a loop or an `if`
    Location {
        start_line: usize,
        end_line: usize,
        kind: String,
    },
}

impl Block {
    pub fn start_line(&self) -> usize {
        match self {
            Block::Method { start_line, .. }
            | Block::Duplicate { start_line, .. }
            | Block::Location { start_line, .. } => *start_line,
        }
    }

    pub fn end_line(&self) -> usize {
        match self {
            Block::Method { end_line, .. }
            | Block::Duplicate { end_line, .. }
            | Block::Location { end_line, .. } => *end_line,
        }
    }

    pub fn location(line: usize, kind: impl Into<String>) -> Self {
        Block::Location {
            start_line: line,
            end_line: line,
            kind: kind.into(),
        }
    }
}

/// Value produced by one metric for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

impl MetricResult {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            line_number: None,
            blocks: Vec::new(),
        }
    }

    pub fn count(label: impl Into<String>, value: usize) -> Self {
        Self::new(label, value as f64)
    }

    /// Zero value used for empty input and for isolated failures.
    pub fn zero(label: impl Into<String>) -> Self {
        Self::new(label, 0.0)
    }

    pub fn with_line(mut self, line_number: Option<usize>) -> Self {
        self.line_number = line_number;
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100` rounded to two decimals, `0` when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}
