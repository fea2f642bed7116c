use log::{LevelFilter, SetLoggerError};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

pub mod accounts;
pub mod camera;
pub mod catalog;
pub mod chat_log;
pub mod constants;
pub mod engine;
pub mod interact;
pub mod learning;
pub mod minigame;
pub mod points;
pub mod sync;
pub mod types;

/// Initializes the process-wide logger with a stderr appender and, when
/// `file_path` is given, a file appender sharing the same pattern.
///
/// The stderr appender is filtered to `log_level`; the file appender receives
/// everything the root level allows. Call once, before anything logs.
pub fn initialize_logger(
    log_level: LevelFilter,
    file_path: Option<&str>,
) -> Result<(), SetLoggerError> {
    const LOGGING_PATTERN: &str = "{d} {l} {f}:{L} - {m}\n";

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let mut config_builder = Config::builder();
    let mut root_builder = Root::builder();

    if let Some(path) = file_path {
        match FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
            .build(path)
        {
            Ok(logfile) => {
                config_builder = config_builder
                    .appender(Appender::builder().build("logfile", Box::new(logfile)));
                root_builder = root_builder.appender("logfile");
            }
            Err(e) => {
                eprintln!("Failed to open log file {path}: {e}. Logging to stderr only.");
            }
        }
    }

    let config = config_builder
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("stderr", Box::new(stderr)),
        )
        .build(root_builder.appender("stderr").build(log_level))
        .expect("logger config is statically valid");

    let _handle = log4rs::init_config(config)?;

    Ok(())
}
