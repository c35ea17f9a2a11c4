/*!
 * Logging Module
 * Subscriber setup and request logging
 */
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging options read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub production: bool,
    pub level: String,
    pub directory: String,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `ENVIRONMENT`, `LOG_LEVEL` and `LOG_DIR`. The level defaults to `info`
    /// in production and `debug` otherwise.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = lookup("ENVIRONMENT").as_deref() == Some("production");
        let level = lookup("LOG_LEVEL").unwrap_or_else(|| {
            if production { "info" } else { "debug" }.to_string()
        });
        Self {
            production,
            level,
            directory: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        }
    }

    /// Filter used when `RUST_LOG` is not set.
    pub fn default_directives(&self) -> String {
        format!("portfolio_cms={},tower_http=debug,axum=debug", self.level)
    }
}

/// Initialize the logging system.
///
/// The returned guards flush the background writers on drop; keep them alive
/// for as long as the process logs.
pub fn init(settings: &LogSettings) -> Vec<WorkerGuard> {
    std::fs::create_dir_all(&settings.directory).ok();

    // All logs, plus a second file for errors only
    let (file_writer, file_guard) = non_blocking(rolling::daily(&settings.directory, "app.log"));
    let (error_writer, error_guard) =
        non_blocking(rolling::daily(&settings.directory, "error.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_directives()));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if settings.production {
        // JSON format for production
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let error_layer = fmt::layer()
            .with_writer(error_writer)
            .with_ansi(false)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    }

    tracing::info!(
        production = settings.production,
        level = %settings.level,
        "Logging initialized"
    );

    vec![file_guard, error_guard, console_guard]
}
