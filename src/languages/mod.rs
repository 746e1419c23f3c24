use serde::{Deserialize, Serialize};
use std::fmt;

pub mod profile;

pub use profile::{BlockStyle, LanguageProfile, SignatureFamily, StringDelimiter};

/// 支持的编程语言枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    Java,
    JavaScript,
    TypeScript,
    Python,
    Generic,
}

impl Language {
    /// 根据编辑器语言标识解析语言，未知标识回退到 Generic
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Language::CSharp,
            "java" => Language::Java,
            "javascript" | "javascriptreact" | "js" | "jsx" => Language::JavaScript,
            "typescript" | "typescriptreact" | "ts" | "tsx" => Language::TypeScript,
            "python" | "py" => Language::Python,
            _ => Language::Generic,
        }
    }

    pub fn from_file_path(path: &str) -> Self {
        Self::from_extension(
            std::path::Path::new(path)
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or(""),
        )
    }

    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "cs" => Language::CSharp,
            "java" => Language::Java,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "py" | "pyw" => Language::Python,
            _ => Language::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "csharp",
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Generic => "generic",
        }
    }

    /// 语言对应的词法规则
    pub fn profile(&self) -> &'static LanguageProfile {
        match self {
            Language::CSharp => &profile::CSHARP,
            Language::Java => &profile::JAVA,
            Language::JavaScript => &profile::JAVASCRIPT,
            Language::TypeScript => &profile::TYPESCRIPT,
            Language::Python => &profile::PYTHON,
            Language::Generic => &profile::GENERIC,
        }
    }

    pub fn block_style(&self) -> BlockStyle {
        self.profile().block_style
    }

    pub fn all() -> [Language; 6] {
        [
            Language::CSharp,
            Language::Java,
            Language::JavaScript,
            Language::TypeScript,
            Language::Python,
            Language::Generic,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
