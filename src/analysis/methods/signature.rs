use once_cell::sync::Lazy;
use regex::Regex;

use crate::languages::SignatureFamily;

/// Typed declaration: modifiers and return type words, then `Name<T>(`.
static CLIKE_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*((?:[\w<>\[\],.?]+\s+)+)(\w+)\s*(?:<[^>()]*>)?\s*\(").unwrap()
});

static SCRIPT_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(\w*)\s*(?:<[^>()]*>)?\s*\(").unwrap()
});

static SCRIPT_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:public|private|protected|static|async|readonly|override|abstract|get|set)\s+)*\*?\s*(#?\w+)\s*(?:<[^>()]*>)?\s*\(").unwrap()
});

static SCRIPT_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:(?:const|let|var|public|private|protected|static|readonly)\s+)*(\w+)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|\w+)\s*(?::[^=]+)?=>\s*\{").unwrap()
});

static PYTHON_DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)\s*\(").unwrap());

/// Words that look like a method name in front of `(` but never are.
const NOT_A_NAME: &[&str] = &[
    "if", "else", "for", "foreach", "while", "do", "switch", "case", "catch", "using", "lock",
    "return", "function", "typeof", "sizeof", "nameof", "super", "this", "base", "new", "throw",
    "await", "yield", "with", "fixed", "checked", "unchecked", "default", "when", "synchronized",
];

/// Statement keywords that cannot start a declaration.
const STATEMENT_START: &[&str] = &[
    "return", "new", "throw", "await", "else", "yield", "case", "using", "lock", "goto", "delete",
    "typeof", "if", "while", "for", "foreach", "switch", "catch", "do", "var", "let", "const",
];

/// A recognised method signature on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMatch {
    pub name: String,
}

/// Match the start of a method signature on a stripped code line.
pub fn match_signature(family: SignatureFamily, code: &str) -> Option<SignatureMatch> {
    match family {
        SignatureFamily::CLike => match_clike(code),
        SignatureFamily::Script => match_script(code),
        SignatureFamily::Python => PYTHON_DEF.captures(code).map(|caps| SignatureMatch {
            name: caps[1].to_string(),
        }),
    }
}

fn match_clike(code: &str) -> Option<SignatureMatch> {
    let caps = CLIKE_SIGNATURE.captures(code)?;
    let prefix = caps.get(1)?.as_str();
    let name = caps.get(2)?.as_str();

    let first_word = prefix.split_whitespace().next().unwrap_or("");
    if NOT_A_NAME.contains(&name) || STATEMENT_START.contains(&first_word) {
        return None;
    }
    // `int x = Foo(` and `a.b c(` style statements
    if prefix.contains('=') {
        return None;
    }

    Some(SignatureMatch {
        name: name.to_string(),
    })
}

fn match_script(code: &str) -> Option<SignatureMatch> {
    if let Some(caps) = SCRIPT_FUNCTION.captures(code) {
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        return Some(SignatureMatch {
            name: if name.is_empty() {
                "anonymous".to_string()
            } else {
                name.to_string()
            },
        });
    }

    if let Some(caps) = SCRIPT_ARROW.captures(code) {
        return Some(SignatureMatch {
            name: caps[1].to_string(),
        });
    }

    let caps = SCRIPT_METHOD.captures(code)?;
    let name = caps.get(1)?.as_str();
    if NOT_A_NAME.contains(&name) {
        return None;
    }
    // A call statement, not a declaration.
    if code.trim_end().ends_with(';') {
        return None;
    }
    // Method shorthand has nothing but the parameter list before the body.
    let accepted = match text_after_balanced_parens(code, caps.get(0)?.end() - 1) {
        Some(after) => {
            let rest = after.trim_start();
            rest.is_empty() || rest.starts_with('{') || rest.starts_with(':')
        }
        // Parameter list continues on the next line; callbacks open a body here.
        None => !code.contains('{') && !code.contains("=>"),
    };

    accepted.then(|| SignatureMatch {
        name: name.to_string(),
    })
}

/// Text following the parenthesis group that opens at byte `open`,
/// or `None` when the group is still open at end of line.
fn text_after_balanced_parens(code: &str, open: usize) -> Option<&str> {
    let mut depth = 0usize;
    for (offset, ch) in code.get(open..)?.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return code.get(open + offset + 1..);
                }
            }
            _ => {}
        }
    }
    None
}

/// Net count of `(` minus `)` on a stripped line.
pub fn paren_balance(code: &str) -> isize {
    code.chars().fold(0, |balance, ch| match ch {
        '(' => balance + 1,
        ')' => balance - 1,
        _ => balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clike(code: &str) -> Option<String> {
        match_signature(SignatureFamily::CLike, code).map(|m| m.name)
    }

    fn script(code: &str) -> Option<String> {
        match_signature(SignatureFamily::Script, code).map(|m| m.name)
    }

    #[test]
    fn test_clike_signatures() {
        assert_eq!(clike("public void TestMethod()"), Some("TestMethod".to_string()));
        assert_eq!(clike("  public async Task<int> AsyncMethod() {"), Some("AsyncMethod".to_string()));
        assert_eq!(
            clike("public List<T> GenericMethod<T>(T item) where T : class"),
            Some("GenericMethod".to_string())
        );
        assert_eq!(clike("protected static string Method3("), Some("Method3".to_string()));
        assert_eq!(clike("private Dictionary<int, string> Map(int a)"), Some("Map".to_string()));
        assert_eq!(clike("public Foo(int x) : base(x)"), Some("Foo".to_string()));
    }

    #[test]
    fn test_clike_rejects_statements() {
        assert_eq!(clike("} else if (x) {"), None);
        assert_eq!(clike("return Compute(x);"), None);
        assert_eq!(clike("throw new ArgumentException(name);"), None);
        assert_eq!(clike("Console.WriteLine(x);"), None);
        assert_eq!(clike("var total = Sum(a, b);"), None);
        assert_eq!(clike("if (ready) {"), None);
    }

    #[test]
    fn test_script_signatures() {
        assert_eq!(script("function add(a, b) {"), Some("add".to_string()));
        assert_eq!(script("export async function load() {"), Some("load".to_string()));
        assert_eq!(script("  render() {"), Some("render".to_string()));
        assert_eq!(script("  private async save(item: Item): Promise<void> {"), Some("save".to_string()));
        assert_eq!(script("const handler = async (event) => {"), Some("handler".to_string()));
        assert_eq!(script("const f = function () {"), None);
    }

    #[test]
    fn test_script_rejects_calls_and_control_flow() {
        assert_eq!(script("console.log(x);"), None);
        assert_eq!(script("doWork(a, b)"), Some("doWork".to_string()));
        assert_eq!(script("doWork(a, b).then(next)"), None);
        assert_eq!(script("describe('suite', () => {"), None);
        assert_eq!(script("if (x) {"), None);
        assert_eq!(script("while (running) {"), None);
    }

    #[test]
    fn test_python_signatures() {
        let family = SignatureFamily::Python;
        assert_eq!(match_signature(family, "def run(self):").map(|m| m.name), Some("run".to_string()));
        assert_eq!(match_signature(family, "    async def fetch(").map(|m| m.name), Some("fetch".to_string()));
        assert_eq!(match_signature(family, "    undefined(x)"), None);
    }

    #[test]
    fn test_paren_balance() {
        assert_eq!(paren_balance("f(a, (b)"), 1);
        assert_eq!(paren_balance("f()"), 0);
        assert_eq!(paren_balance("))"), -2);
    }
}
