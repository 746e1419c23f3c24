use super::scanner::ScannedLine;
use crate::languages::BlockStyle;

pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Depth information for one consumed line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineDepth {
    /// Nesting level the line's own statement sits at
    pub level: usize,
    /// Depth after the line has been applied
    pub depth: usize,
}

#[derive(Debug, Clone)]
enum Strategy {
    Brace { depth: usize },
    Indentation { stack: Vec<usize>, tab_width: usize },
}

/// Tracks structural nesting depth line by line.
///
/// Brace mode counts `{` and `}` on the stripped line and clamps at zero.
/// Indentation mode keeps a stack of indentation widths starting at `[0]`.
#[derive(Debug, Clone)]
pub struct BlockTracker {
    strategy: Strategy,
    line_index: usize,
    max_depth: usize,
    max_depth_line: Option<usize>,
}

impl BlockTracker {
    pub fn new(style: BlockStyle) -> Self {
        Self::with_tab_width(style, DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(style: BlockStyle, tab_width: usize) -> Self {
        let strategy = match style {
            BlockStyle::Brace => Strategy::Brace { depth: 0 },
            BlockStyle::Indentation => Strategy::Indentation {
                stack: vec![0],
                tab_width,
            },
        };

        Self {
            strategy,
            line_index: 0,
            max_depth: 0,
            max_depth_line: None,
        }
    }

    /// Apply the next line and return its depth reading.
    pub fn consume(&mut self, line: &ScannedLine) -> LineDepth {
        let reading = match &mut self.strategy {
            Strategy::Brace { depth } => {
                let opens = line.count('{');
                let closes = line.count('}');
                let leading_closes = line
                    .trimmed()
                    .chars()
                    .take_while(|c| *c == '}' || c.is_whitespace())
                    .filter(|c| *c == '}')
                    .count();

                let level = depth.saturating_sub(leading_closes);
                *depth = (*depth + opens).saturating_sub(closes);
                LineDepth {
                    level,
                    depth: *depth,
                }
            }
            Strategy::Indentation { stack, tab_width } => {
                if line.is_code() {
                    let indent = line.indent(*tab_width);
                    while stack.len() > 1 && stack.last().map_or(false, |top| *top >= indent) {
                        stack.pop();
                    }
                    if stack.last().map_or(true, |top| indent > *top) {
                        stack.push(indent);
                    }
                }
                let depth = stack.len() - 1;
                LineDepth { level: depth, depth }
            }
        };

        if reading.depth > self.max_depth {
            self.max_depth = reading.depth;
            self.max_depth_line = Some(self.line_index);
        }
        self.line_index += 1;

        reading
    }

    pub fn current_depth(&self) -> usize {
        match &self.strategy {
            Strategy::Brace { depth } => *depth,
            Strategy::Indentation { stack, .. } => stack.len() - 1,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Line index where the maximum depth was first reached.
    pub fn max_depth_line(&self) -> Option<usize> {
        self.max_depth_line
    }

    pub fn reset(&mut self) {
        match &mut self.strategy {
            Strategy::Brace { depth } => *depth = 0,
            Strategy::Indentation { stack, .. } => {
                stack.clear();
                stack.push(0);
            }
        }
        self.line_index = 0;
        self.max_depth = 0;
        self.max_depth_line = None;
    }
}
