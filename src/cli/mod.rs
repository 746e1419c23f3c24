pub mod args;
pub mod runner;

pub use args::Args;
pub use runner::{analyze_file, analyze_files, collect_files, render_json, render_text, FileReport, MetricEntry};
