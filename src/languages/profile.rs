/// How a language delimits blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Brace,
    Indentation,
}

/// Which family of method signature patterns applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFamily {
    /// Typed declarations: `modifiers ReturnType Name(params)`
    CLike,
    /// `function name(...)`, class method shorthand and arrow assignments
    Script,
    /// `(async )?def name(...):`
    Python,
}

/// A string literal delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringDelimiter {
    pub open: &'static str,
    pub close: &'static str,
    /// Whether the literal may continue on following lines
    pub multiline: bool,
    /// Whether a backslash escapes the next character
    pub escapes: bool,
}

impl StringDelimiter {
    const fn new(open: &'static str, close: &'static str, multiline: bool, escapes: bool) -> Self {
        Self {
            open,
            close,
            multiline,
            escapes,
        }
    }
}

/// Fixed lexical rules for one language family.
///
/// String delimiters are ordered longest first so that `"""` wins over `"`.
#[derive(Debug, Clone, Copy)]
pub struct LanguageProfile {
    pub line_comment: &'static str,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub strings: &'static [StringDelimiter],
    pub block_style: BlockStyle,
    pub signature: SignatureFamily,
    /// Receiver keyword used for instance attributes
    pub receiver: &'static str,
}

const DOUBLE: StringDelimiter = StringDelimiter::new("\"", "\"", false, true);
const SINGLE: StringDelimiter = StringDelimiter::new("'", "'", false, true);

pub const CSHARP: LanguageProfile = LanguageProfile {
    line_comment: "//",
    block_comment: Some(("/*", "*/")),
    strings: &[
        StringDelimiter::new("\"\"\"", "\"\"\"", true, false),
        StringDelimiter::new("@\"", "\"", true, false),
        DOUBLE,
        SINGLE,
    ],
    block_style: BlockStyle::Brace,
    signature: SignatureFamily::CLike,
    receiver: "this",
};

pub const JAVA: LanguageProfile = LanguageProfile {
    line_comment: "//",
    block_comment: Some(("/*", "*/")),
    strings: &[StringDelimiter::new("\"\"\"", "\"\"\"", true, true), DOUBLE, SINGLE],
    block_style: BlockStyle::Brace,
    signature: SignatureFamily::CLike,
    receiver: "this",
};

pub const JAVASCRIPT: LanguageProfile = LanguageProfile {
    line_comment: "//",
    block_comment: Some(("/*", "*/")),
    strings: &[StringDelimiter::new("`", "`", true, true), DOUBLE, SINGLE],
    block_style: BlockStyle::Brace,
    signature: SignatureFamily::Script,
    receiver: "this",
};

pub const TYPESCRIPT: LanguageProfile = JAVASCRIPT;

pub const PYTHON: LanguageProfile = LanguageProfile {
    line_comment: "#",
    block_comment: None,
    strings: &[
        StringDelimiter::new("\"\"\"", "\"\"\"", true, true),
        StringDelimiter::new("'''", "'''", true, true),
        DOUBLE,
        SINGLE,
    ],
    block_style: BlockStyle::Indentation,
    signature: SignatureFamily::Python,
    receiver: "self",
};

pub const GENERIC: LanguageProfile = LanguageProfile {
    line_comment: "//",
    block_comment: Some(("/*", "*/")),
    strings: &[DOUBLE, SINGLE],
    block_style: BlockStyle::Brace,
    signature: SignatureFamily::CLike,
    receiver: "this",
};
