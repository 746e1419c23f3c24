use crate::languages::Language;

/// Immutable view over one source document handed to the engine.
///
/// Lines are split on `\n` with a trailing `\r` removed. Empty text has no lines.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    language: Language,
    lines: Vec<String>,
}

impl Document {
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        let text = text.into();
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                .collect()
        };

        Self {
            text,
            language,
            lines,
        }
    }

    /// Build a document from an editor language identifier such as `"typescriptreact"`.
    pub fn from_identifier(text: impl Into<String>, identifier: &str) -> Self {
        Self::new(text, Language::from_identifier(identifier))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line `index`, or an empty string past the end.
    pub fn line_at(&self, index: usize) -> &str {
        self.lines.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
