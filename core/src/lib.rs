use anyhow::Context;
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use std::path::Path;

pub mod constants;
pub mod string_operations;
pub mod types;

const LOGGING_PATTERN: &str = "{d} {l} {f}:{L} - {m}\n";

/// Installs the process-wide logger.
///
/// Messages at `log_level` and above go to stderr. When `file_path` is given,
/// everything down to `Trace` is also appended to that file, so a debugging
/// session can keep a quiet console while still capturing the full command
/// trace on disk.
pub fn initialize_logger(log_level: LevelFilter, file_path: Option<&Path>) -> anyhow::Result<()> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let mut config_builder = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(log_level)))
            .build("stderr", Box::new(stderr)),
    );
    let mut root = Root::builder().appender("stderr");
    let mut root_level = log_level;

    if let Some(path) = file_path {
        let logfile = FileAppender::builder()
            // Pattern: https://docs.rs/log4rs/*/log4rs/encode/pattern/index.html
            .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
            .build(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;

        config_builder =
            config_builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
        root_level = LevelFilter::Trace;
    }

    let config = config_builder
        .build(root.build(root_level))
        .context("invalid logger configuration")?;

    log4rs::init_config(config).context("logger already initialized")?;

    Ok(())
}
