use crate::analysis::lexical::{BlockTracker, LexicalScanner, DEFAULT_TAB_WIDTH};
use crate::document::Document;
use crate::infrastructure::MetricError;
use crate::metrics::{Metric, MetricKind, MetricResult};

/// Deepest block nesting reached in a document and where it first happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NestingDepth {
    pub max_depth: usize,
    pub line: Option<usize>,
}

/// Analyzer for nesting depth
pub struct NestingDepthAnalyzer {
    tab_width: usize,
}

impl NestingDepthAnalyzer {
    pub fn new() -> Self {
        Self::with_tab_width(DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(tab_width: usize) -> Self {
        Self { tab_width }
    }

    pub fn analyze(&self, document: &Document) -> NestingDepth {
        let language = document.language();
        let mut scanner = LexicalScanner::new(language.profile());
        let mut tracker = BlockTracker::with_tab_width(language.block_style(), self.tab_width);

        for raw in document.lines() {
            tracker.consume(&scanner.consume(raw));
        }

        NestingDepth {
            max_depth: tracker.max_depth(),
            line: tracker.max_depth_line(),
        }
    }

    /// Depth after every line, in order.
    pub fn depth_profile(&self, document: &Document) -> Vec<usize> {
        let language = document.language();
        let mut scanner = LexicalScanner::new(language.profile());
        let mut tracker = BlockTracker::with_tab_width(language.block_style(), self.tab_width);

        document
            .lines()
            .iter()
            .map(|raw| tracker.consume(&scanner.consume(raw)).depth)
            .collect()
    }
}

impl Default for NestingDepthAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for NestingDepthAnalyzer {
    fn kind(&self) -> MetricKind {
        MetricKind::NestingDepth
    }

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError> {
        let depth = self.analyze(document);
        Ok(MetricResult::count(self.label(), depth.max_depth).with_line(depth.line))
    }
}
