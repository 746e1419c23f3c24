use crate::languages::{LanguageProfile, StringDelimiter};

/// State carried from one line to the next within a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub in_block_comment: bool,
    /// Delimiter of a string literal still open at the end of the previous line
    pub open_string: Option<StringDelimiter>,
}

impl ScanState {
    pub fn in_multiline_string(&self) -> bool {
        self.open_string.is_some()
    }
}

/// Classification of a whole line after scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Nothing but whitespace
    Blank,
    /// At least one character of real code
    Code,
    /// Only comment and/or string literal content
    NonCode,
}

/// A line with comments and string contents blanked out.
///
/// `code` has exactly as many characters as the raw line. String delimiters
/// are kept, everything between them becomes a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    pub code: String,
    pub class: LineClass,
    pub has_comment: bool,
}

impl ScannedLine {
    pub fn is_blank(&self) -> bool {
        self.class == LineClass::Blank
    }

    pub fn is_code(&self) -> bool {
        self.class == LineClass::Code
    }

    pub fn is_fully_non_code(&self) -> bool {
        self.class != LineClass::Code
    }

    pub fn trimmed(&self) -> &str {
        self.code.trim()
    }

    /// Leading whitespace width with tabs expanded to `tab_width` columns.
    pub fn indent(&self, tab_width: usize) -> usize {
        indent_width(&self.code, tab_width)
    }

    pub fn count(&self, ch: char) -> usize {
        self.code.chars().filter(|c| *c == ch).count()
    }
}

pub fn indent_width(line: &str, tab_width: usize) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

/// Scan one raw line starting from `state`.
///
/// Returns the state to carry into the next line together with the stripped line.
pub fn scan_line(profile: &LanguageProfile, state: ScanState, raw: &str) -> (ScanState, ScannedLine) {
    let chars: Vec<char> = raw.chars().collect();
    let mut state = state;
    let mut code = String::with_capacity(raw.len());
    let mut saw_code = false;
    let mut has_comment = false;
    let mut i = 0;

    while i < chars.len() {
        if state.in_block_comment {
            if let Some((_, close)) = profile.block_comment {
                if starts_at(&chars, i, close) {
                    blank(&mut code, close.chars().count());
                    i += close.chars().count();
                    state.in_block_comment = false;
                    has_comment = true;
                    continue;
                }
            }
            if !chars[i].is_whitespace() {
                has_comment = true;
            }
            code.push(' ');
            i += 1;
            continue;
        }

        if let Some(delimiter) = state.open_string {
            if delimiter.escapes && chars[i] == '\\' {
                let width = if i + 1 < chars.len() { 2 } else { 1 };
                blank(&mut code, width);
                i += width;
                continue;
            }
            if starts_at(&chars, i, delimiter.close) {
                code.push_str(delimiter.close);
                i += delimiter.close.chars().count();
                state.open_string = None;
                continue;
            }
            code.push(' ');
            i += 1;
            continue;
        }

        if starts_at(&chars, i, profile.line_comment) {
            blank(&mut code, chars.len() - i);
            has_comment = true;
            break;
        }

        if let Some((open, _)) = profile.block_comment {
            if starts_at(&chars, i, open) {
                blank(&mut code, open.chars().count());
                i += open.chars().count();
                state.in_block_comment = true;
                has_comment = true;
                continue;
            }
        }

        if let Some(delimiter) = profile
            .strings
            .iter()
            .find(|delimiter| starts_at(&chars, i, delimiter.open))
        {
            code.push_str(delimiter.open);
            i += delimiter.open.chars().count();
            state.open_string = Some(*delimiter);
            continue;
        }

        if !chars[i].is_whitespace() {
            saw_code = true;
        }
        code.push(chars[i]);
        i += 1;
    }

    // Single-line literals never survive the end of their line.
    if let Some(delimiter) = state.open_string {
        if !delimiter.multiline {
            state.open_string = None;
        }
    }

    let class = if raw.trim().is_empty() {
        LineClass::Blank
    } else if saw_code {
        LineClass::Code
    } else {
        LineClass::NonCode
    };

    (
        state,
        ScannedLine {
            code,
            class,
            has_comment,
        },
    )
}

fn starts_at(chars: &[char], index: usize, pattern: &str) -> bool {
    let mut position = index;
    for expected in pattern.chars() {
        match chars.get(position) {
            Some(actual) if *actual == expected => position += 1,
            _ => return false,
        }
    }
    !pattern.is_empty()
}

fn blank(code: &mut String, width: usize) {
    code.extend(std::iter::repeat(' ').take(width));
}

/// Line-by-line scanner carrying block comment and multi-line string state.
#[derive(Debug, Clone)]
pub struct LexicalScanner {
    profile: &'static LanguageProfile,
    state: ScanState,
}

impl LexicalScanner {
    pub fn new(profile: &'static LanguageProfile) -> Self {
        Self {
            profile,
            state: ScanState::default(),
        }
    }

    pub fn consume(&mut self, raw: &str) -> ScannedLine {
        let (state, line) = scan_line(self.profile, self.state, raw);
        self.state = state;
        line
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ScanState::default();
    }

    /// Scan every line of a document from a fresh state.
    pub fn scan_all<S: AsRef<str>>(profile: &'static LanguageProfile, lines: &[S]) -> Vec<ScannedLine> {
        let mut scanner = Self::new(profile);
        lines.iter().map(|line| scanner.consume(line.as_ref())).collect()
    }
}
