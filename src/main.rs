use clap::Parser;
use code_metrics::cli::args::Args;
use code_metrics::cli::runner;
use code_metrics::config::Config;
use code_metrics::infrastructure::{setup_logging, LoggingConfig};
use code_metrics::metrics::MetricRegistry;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;

    config.update_from_args(&args);
    config.validate()?;

    setup_logging(
        LoggingConfig::from_settings(&config.log_level, &config.log_format)?
            .with_log_file(config.log_file.as_deref())
            .with_debug(config.debug),
    )?;

    let language = args.language.as_deref().map(runner::parse_language).transpose()?;
    let filter = runner::parse_metric_filter(&args.metrics)?;

    let files = runner::collect_files(&args.paths)?;
    if files.is_empty() {
        info!("No source files found");
        return Ok(());
    }
    info!("Analyzing {} files", files.len());

    let registry = Arc::new(MetricRegistry::with_config(&config));
    let reports = runner::analyze_files(registry, files, language, filter).await?;

    // 格式化输出
    let formatted = match args.format.as_str() {
        "json" => runner::render_json(&reports)?,
        "text" => runner::render_text(&reports),
        other => anyhow::bail!("Unsupported output format: {}", other),
    };

    // 输出到文件或控制台
    if let Some(output) = &args.output {
        std::fs::write(output, &formatted)?;
        info!("Report written to {}", output.display());
    } else {
        println!("{}", formatted);
    }

    Ok(())
}
