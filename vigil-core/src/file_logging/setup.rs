use chrono::Local;
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::{Path, PathBuf};
use anyhow::Result;

/// Timestamped log file name inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("vigil_{}.log", Local::now().format("%Y%m%d_%H%M%S")))
}

pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Thread names identify analyzer workers in the file.
    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] [{T}] {t} - {m}{n}",
        )))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        // Per-line parser tracing is far too noisy for a file.
        .logger(Logger::builder().build("vigil_core::signal", log_level.min(LevelFilter::Debug)))
        .build(Root::builder().appender("file").build(log_level))?;

    log4rs::init_config(config)?;

    Ok(())
}
