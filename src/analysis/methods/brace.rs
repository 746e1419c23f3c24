use super::signature::{match_signature, paren_balance};
use super::MethodSpan;
use crate::analysis::lexical::{BlockTracker, LexicalScanner, ScannedLine};
use crate::languages::{BlockStyle, LanguageProfile};

/// Lines a signature may span before the opening brace is expected.
const MAX_SIGNATURE_LINES: usize = 12;

#[derive(Debug, Clone)]
struct PendingSignature {
    start_line: usize,
    name: String,
    parens: isize,
}

#[derive(Debug, Clone)]
struct OpenMethod {
    start_line: usize,
    name: String,
    /// Brace depth outside the body
    open_depth: usize,
    /// The opening brace sits alone on a line after the signature
    standalone_brace: bool,
}

impl OpenMethod {
    /// A standalone opening brace line counts as part of the signature, not the body.
    fn finish(self, end_line: usize) -> MethodSpan {
        let lines = end_line + 1 - self.start_line;
        let size = if self.standalone_brace && lines > 1 {
            lines - 1
        } else {
            lines
        };

        MethodSpan {
            start_line: self.start_line,
            end_line,
            size,
            name: self.name,
        }
    }
}

/// Method boundaries for brace-delimited languages.
///
/// Each call to [`BraceMethodState::step`] consumes exactly one line and
/// returns the methods that closed on it.
#[derive(Debug, Clone)]
pub struct BraceMethodState {
    profile: &'static LanguageProfile,
    scanner: LexicalScanner,
    tracker: BlockTracker,
    pending: Option<PendingSignature>,
    open: Vec<OpenMethod>,
    last_line: Option<usize>,
}

impl BraceMethodState {
    pub fn new(profile: &'static LanguageProfile) -> Self {
        Self {
            profile,
            scanner: LexicalScanner::new(profile),
            tracker: BlockTracker::new(BlockStyle::Brace),
            pending: None,
            open: Vec::new(),
            last_line: None,
        }
    }

    pub fn step(&mut self, index: usize, raw: &str) -> Vec<MethodSpan> {
        let line = self.scanner.consume(raw);
        let reading = self.tracker.consume(&line);
        self.last_line = Some(index);

        let mut finished = Vec::new();

        // Leading `}` may close bodies before anything else on the line starts.
        self.close_down_to(reading.level, index, &mut finished);

        if let Some((start_line, name, standalone_brace)) = self.advance_signature(index, &line) {
            self.open.push(OpenMethod {
                start_line,
                name,
                open_depth: reading.level,
                standalone_brace,
            });
        }

        self.close_down_to(reading.depth, index, &mut finished);
        finished
    }

    /// Close every method still open at end of input.
    pub fn finish(mut self) -> Vec<MethodSpan> {
        let end_line = self.last_line.unwrap_or(0);
        let mut finished = Vec::new();
        while let Some(method) = self.open.pop() {
            finished.push(method.finish(end_line));
        }
        finished
    }

    fn close_down_to(&mut self, depth: usize, index: usize, finished: &mut Vec<MethodSpan>) {
        while self.open.last().map_or(false, |method| method.open_depth >= depth) {
            if let Some(method) = self.open.pop() {
                finished.push(method.finish(index));
            }
        }
    }

    /// Feed the line to the signature sub-state. Returns the method whose body opens here.
    fn advance_signature(&mut self, index: usize, line: &ScannedLine) -> Option<(usize, String, bool)> {
        if let Some(mut pending) = self.pending.take() {
            let trimmed = line.trimmed();
            if line.is_fully_non_code() {
                self.pending = Some(pending);
                return None;
            }
            if pending.parens > 0 {
                if let Some(open) = trimmed.find('{') {
                    // `a, b) {` closes the parameter list and opens the body together.
                    if paren_balance(&trimmed[..open]) + pending.parens <= 0 {
                        return Some((pending.start_line, pending.name, false));
                    }
                }
                pending.parens += paren_balance(trimmed);
                if !trimmed.ends_with(';') && index - pending.start_line < MAX_SIGNATURE_LINES {
                    self.pending = Some(pending);
                }
                return None;
            }
            if trimmed.starts_with('{') {
                return Some((pending.start_line, pending.name, trimmed == "{"));
            }
            if is_signature_continuation(trimmed) && !trimmed.ends_with(';') {
                if trimmed.contains('{') {
                    return Some((pending.start_line, pending.name, false));
                }
                if index - pending.start_line < MAX_SIGNATURE_LINES {
                    self.pending = Some(pending);
                }
                return None;
            }
            // Not a declaration after all; the line is judged on its own below.
        }

        if !line.is_code() {
            return None;
        }

        let signature = match_signature(self.profile.signature, &line.code)?;
        let trimmed = line.trimmed();
        let parens = paren_balance(trimmed);

        if trimmed.contains('{') {
            return Some((index, signature.name, false));
        }
        if trimmed.ends_with(';') {
            return None;
        }

        self.pending = Some(PendingSignature {
            start_line: index,
            name: signature.name,
            parens: parens.max(0),
        });
        None
    }
}

/// Lines allowed between a complete parameter list and the body.
fn is_signature_continuation(trimmed: &str) -> bool {
    ["where ", "throws ", ":", "=>"]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}
