use super::signature::{match_signature, paren_balance};
use super::MethodSpan;
use crate::analysis::lexical::{LexicalScanner, DEFAULT_TAB_WIDTH};
use crate::languages::LanguageProfile;

#[derive(Debug, Clone)]
struct OpenDef {
    start_line: usize,
    indent: usize,
    name: String,
    last_body_line: usize,
}

impl OpenDef {
    fn finish(self) -> MethodSpan {
        MethodSpan {
            start_line: self.start_line,
            end_line: self.last_body_line,
            size: self.last_body_line + 1 - self.start_line,
            name: self.name,
        }
    }
}

/// Method boundaries for indentation-delimited languages.
///
/// A definition starts at its first decorator (or the `def` line) and ends at
/// the last non-blank line indented deeper than the `def`.
#[derive(Debug, Clone)]
pub struct IndentMethodState {
    profile: &'static LanguageProfile,
    scanner: LexicalScanner,
    tab_width: usize,
    first_decorator: Option<usize>,
    /// Definition whose parameter list has not reached its `:` yet
    inside_signature: Option<(OpenDef, isize)>,
    open: Vec<OpenDef>,
}

impl IndentMethodState {
    pub fn new(profile: &'static LanguageProfile) -> Self {
        Self::with_tab_width(profile, DEFAULT_TAB_WIDTH)
    }

    pub fn with_tab_width(profile: &'static LanguageProfile, tab_width: usize) -> Self {
        Self {
            profile,
            scanner: LexicalScanner::new(profile),
            tab_width,
            first_decorator: None,
            inside_signature: None,
            open: Vec::new(),
        }
    }

    pub fn step(&mut self, index: usize, raw: &str) -> Vec<MethodSpan> {
        let starts_in_string = self.scanner.state().in_multiline_string();
        let line = self.scanner.consume(raw);
        let mut finished = Vec::new();

        if line.is_blank() {
            return finished;
        }

        if let Some((mut def, parens)) = self.inside_signature.take() {
            def.last_body_line = index;
            let parens = parens + paren_balance(&line.code);
            if parens <= 0 && line.trimmed().ends_with(':') {
                self.open.push(def);
            } else {
                self.inside_signature = Some((def, parens));
            }
            return finished;
        }

        // Docstrings and continuation lines of multi-line strings belong to the body.
        if starts_in_string || (line.is_fully_non_code() && !line.has_comment) {
            self.mark_body(index);
            return finished;
        }

        let indent = line.indent(self.tab_width);
        while self.open.last().map_or(false, |def| indent <= def.indent) {
            if let Some(def) = self.open.pop() {
                finished.push(def.finish());
            }
        }

        if line.is_fully_non_code() {
            self.mark_body(index);
            return finished;
        }

        let trimmed = line.trimmed();
        if trimmed.starts_with('@') {
            self.first_decorator.get_or_insert(index);
            self.mark_body(index);
            return finished;
        }

        let first_decorator = self.first_decorator.take();
        let Some(signature) = match_signature(self.profile.signature, &line.code) else {
            self.mark_body(index);
            return finished;
        };

        self.mark_body(index);
        let def = OpenDef {
            start_line: first_decorator.unwrap_or(index),
            indent,
            name: signature.name,
            last_body_line: index,
        };

        let parens = paren_balance(&line.code);
        if parens > 0 {
            self.inside_signature = Some((def, parens));
        } else if trimmed.ends_with(':') {
            self.open.push(def);
        } else {
            // `def f(): return 1`
            finished.push(def.finish());
        }

        finished
    }

    /// Close every definition still open at end of input.
    pub fn finish(mut self) -> Vec<MethodSpan> {
        let mut finished = Vec::new();
        if let Some((def, _)) = self.inside_signature.take() {
            finished.push(def.finish());
        }
        while let Some(def) = self.open.pop() {
            finished.push(def.finish());
        }
        finished
    }

    fn mark_body(&mut self, index: usize) {
        for def in &mut self.open {
            def.last_body_line = index;
        }
    }
}
