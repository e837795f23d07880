//! Logging and tracing initialization.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber from the logging config.
///
/// `RUST_LOG` takes precedence over the configured level. Safe to call more
/// than once; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if let Some(path) = &config.file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let writer = Arc::new(file);
                if config.json {
                    tracing::subscriber::set_global_default(
                        builder.json().with_writer(writer).finish(),
                    )
                    .ok();
                } else {
                    tracing::subscriber::set_global_default(
                        builder.with_ansi(false).with_writer(writer).finish(),
                    )
                    .ok();
                }
                return;
            }
            Err(e) => {
                eprintln!("slidereel: cannot open log file {}: {e}", path.display());
            }
        }
    }

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).ok();
    } else {
        tracing::subscriber::set_global_default(builder.finish()).ok();
    }
}

/// Initialize logging with defaults, for tests and one-off tools.
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
