use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 度量计算错误类型
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MetricError {
    #[error("配置错误: {message}")]
    Configuration { message: String },

    #[error("文件系统错误: {message}")]
    Io { message: String, path: Option<String> },

    #[error("不支持的语言: {identifier}")]
    UnsupportedLanguage { identifier: String },

    #[error("正则表达式错误: {pattern} - {message}")]
    Pattern { pattern: String, message: String },

    #[error("度量内部错误: {metric} - {message}")]
    Internal { metric: String, message: String },
}

impl MetricError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MetricError::Configuration { .. } => ErrorSeverity::Critical,
            MetricError::Io { .. } => ErrorSeverity::High,
            MetricError::UnsupportedLanguage { .. } => ErrorSeverity::Low,
            MetricError::Pattern { .. } => ErrorSeverity::High,
            MetricError::Internal { .. } => ErrorSeverity::Medium,
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        MetricError::Configuration {
            message: message.into(),
        }
    }

    /// 创建文件系统错误
    pub fn io(message: impl Into<String>, path: Option<String>) -> Self {
        MetricError::Io {
            message: message.into(),
            path,
        }
    }

    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        MetricError::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// 创建度量内部错误
    pub fn internal(metric: impl Into<String>, message: impl Into<String>) -> Self {
        MetricError::Internal {
            metric: metric.into(),
            message: message.into(),
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

// 实现从常见错误类型的转换
impl From<std::io::Error> for MetricError {
    fn from(error: std::io::Error) -> Self {
        MetricError::Io {
            message: error.to_string(),
            path: None,
        }
    }
}

impl From<regex::Error> for MetricError {
    fn from(error: regex::Error) -> Self {
        MetricError::Pattern {
            pattern: String::new(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MetricError::internal("cognitive_complexity", "boom");
        assert_eq!(error.to_string(), "度量内部错误: cognitive_complexity - boom");
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(MetricError::config("bad").severity(), ErrorSeverity::Critical);
        assert_eq!(MetricError::io("missing", None).severity(), ErrorSeverity::High);
        assert!(ErrorSeverity::Critical < ErrorSeverity::Low);
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: MetricError = io.into();
        assert!(matches!(error, MetricError::Io { path: None, .. }));
    }
}
