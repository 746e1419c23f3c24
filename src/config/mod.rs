use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// 各度量实现使用的阈值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// 精确重复检测的最少连续相同行数
    pub duplication_min_lines: usize,
    /// 参与精确重复检测的行必须长于该值
    pub duplication_min_line_length: usize,
    /// 归一化重复检测的窗口行数
    pub duplication_window: usize,
    /// 归一化文本短于该值的窗口将被忽略
    pub duplication_min_window_chars: usize,
    pub tab_width: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            duplication_min_lines: 3,
            duplication_min_line_length: 5,
            duplication_window: 3,
            duplication_min_window_chars: 20,
            tab_width: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub log_level: String,
    pub log_format: String,
    /// 日志文件路径，未设置时输出到标准错误
    pub log_file: Option<String>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisSettings::default(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            log_file: None,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        // 默认配置
        let mut config = Config::default();

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    /// 先读取 TOML 文件，再由环境变量覆盖
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Config::default(),
        };

        #[cfg(not(test))]
        config.load_from_env_file();
        config.load_from_env();

        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.code-metrics/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        read_usize("CODE_METRICS_DUPLICATION_MIN_LINES", &mut self.analysis.duplication_min_lines);
        read_usize(
            "CODE_METRICS_DUPLICATION_MIN_LINE_LENGTH",
            &mut self.analysis.duplication_min_line_length,
        );
        read_usize("CODE_METRICS_DUPLICATION_WINDOW", &mut self.analysis.duplication_window);
        read_usize(
            "CODE_METRICS_DUPLICATION_MIN_WINDOW_CHARS",
            &mut self.analysis.duplication_min_window_chars,
        );
        read_usize("CODE_METRICS_TAB_WIDTH", &mut self.analysis.tab_width);

        if let Ok(level) = env::var("CODE_METRICS_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(format) = env::var("CODE_METRICS_LOG_FORMAT") {
            self.log_format = format;
        }
        if let Ok(path) = env::var("CODE_METRICS_LOG_FILE") {
            self.log_file = Some(path);
        }
        if let Ok(debug) = env::var("CODE_METRICS_DEBUG") {
            self.debug = matches!(debug.as_str(), "1" | "true" | "yes");
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        if let Some(format) = &args.log_format {
            self.log_format = format.clone();
        }
        if let Some(path) = &args.log_file {
            self.log_file = Some(path.clone());
        }
        if args.debug {
            self.debug = true;
            self.log_level = "debug".to_string();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        // 验证配置的有效性
        let analysis = &self.analysis;
        if analysis.duplication_min_lines == 0 {
            anyhow::bail!("duplication_min_lines must be at least 1");
        }
        if analysis.duplication_window == 0 {
            anyhow::bail!("duplication_window must be at least 1");
        }
        if analysis.tab_width == 0 {
            anyhow::bail!("tab_width must be at least 1");
        }

        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!("Unsupported log level: {}", other),
        }
        match self.log_format.to_ascii_lowercase().as_str() {
            "pretty" | "compact" | "json" => {}
            other => anyhow::bail!("Unsupported log format: {}", other),
        }

        Ok(())
    }
}

fn read_usize(key: &str, target: &mut usize) {
    if let Ok(raw) = env::var(key) {
        match raw.trim().parse::<usize>() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!(key, value = %raw, "ignoring non-numeric environment value"),
        }
    }
}
