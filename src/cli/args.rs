use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "code-metrics",
    version,
    about = "结构化代码度量 - 计算嵌套深度、方法大小、认知复杂度、重复代码和内聚度",
    long_about = "code-metrics 对 C#、Java、JavaScript、TypeScript 和 Python 源文件进行轻量级的词法分析，不构建语法树，输出每个文件的结构化度量结果。"
)]
pub struct Args {
    /// 要分析的文件或目录
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// 强制使用指定语言（csharp, java, javascript, typescript, python）
    #[arg(short, long, value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// 输出格式 (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// 将结果写入文件而不是标准输出
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// TOML 配置文件路径
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 只输出指定的度量（可重复，如 -m nesting_depth -m cohesion）
    #[arg(short, long = "metric", value_name = "NAME")]
    pub metrics: Vec<String>,

    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// 日志格式 (pretty, compact, json)
    #[arg(long = "log-format", value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// 将日志写入文件（追加）而不是标准错误
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<String>,

    /// 调试模式
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::try_parse_from(["code-metrics", "src/main.rs"]).unwrap();
        assert_eq!(args.paths, vec![PathBuf::from("src/main.rs")]);
        assert_eq!(args.format, "text");
        assert!(args.language.is_none());
        assert!(args.metrics.is_empty());
    }

    #[test]
    fn test_parse_full_args() {
        let args = Args::try_parse_from([
            "code-metrics",
            "-l",
            "python",
            "-f",
            "json",
            "-m",
            "nesting_depth",
            "-m",
            "cohesion",
            "--log-level",
            "debug",
            "--log-file",
            "metrics.log",
            "a.py",
            "b.py",
        ])
        .unwrap();
        assert_eq!(args.language.as_deref(), Some("python"));
        assert_eq!(args.format, "json");
        assert_eq!(args.metrics, vec!["nesting_depth", "cohesion"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.log_file.as_deref(), Some("metrics.log"));
        assert_eq!(args.paths.len(), 2);
    }

    #[test]
    fn test_paths_are_required() {
        assert!(Args::try_parse_from(["code-metrics"]).is_err());
    }
}
