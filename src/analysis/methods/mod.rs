pub mod brace;
pub mod indentation;
pub mod signature;

pub use brace::BraceMethodState;
pub use indentation::IndentMethodState;
pub use signature::{match_signature, SignatureMatch};

use serde::{Deserialize, Serialize};

use crate::analysis::lexical::DEFAULT_TAB_WIDTH;
use crate::document::Document;
use crate::languages::{BlockStyle, Language};
use crate::metrics::Block;

/// Boundaries of one method. Lines are 0-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpan {
    pub start_line: usize,
    pub end_line: usize,
    pub size: usize,
    pub name: String,
}

impl MethodSpan {
    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }

    pub fn to_block(&self) -> Block {
        Block::Method {
            start_line: self.start_line,
            end_line: self.end_line,
            size: self.size,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
enum ExtractorState {
    Brace(BraceMethodState),
    Indentation(IndentMethodState),
}

/// Locates method boundaries one line at a time.
#[derive(Debug, Clone)]
pub struct MethodExtractor {
    state: ExtractorState,
}

impl MethodExtractor {
    pub fn new(language: Language) -> Self {
        Self::with_tab_width(language, DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(language: Language, tab_width: usize) -> Self {
        let profile = language.profile();
        let state = match language.block_style() {
            BlockStyle::Brace => ExtractorState::Brace(BraceMethodState::new(profile)),
            BlockStyle::Indentation => {
                ExtractorState::Indentation(IndentMethodState::with_tab_width(profile, tab_width))
            }
        };
        Self { state }
    }

    /// Consume line `index` and return the methods that ended on or before it.
    pub fn step(&mut self, index: usize, raw: &str) -> Vec<MethodSpan> {
        match &mut self.state {
            ExtractorState::Brace(state) => state.step(index, raw),
            ExtractorState::Indentation(state) => state.step(index, raw),
        }
    }

    pub fn finish(self) -> Vec<MethodSpan> {
        match self.state {
            ExtractorState::Brace(state) => state.finish(),
            ExtractorState::Indentation(state) => state.finish(),
        }
    }

    /// All methods in the document ordered by start line.
    pub fn extract(document: &Document, tab_width: usize) -> Vec<MethodSpan> {
        let mut extractor = Self::with_tab_width(document.language(), tab_width);
        let mut spans = Vec::new();
        for (index, line) in document.lines().iter().enumerate() {
            spans.extend(extractor.step(index, line));
        }
        spans.extend(extractor.finish());
        spans.sort_by_key(|span| (span.start_line, span.end_line));
        spans
    }
}
