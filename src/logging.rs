//! Logging setup for the session facade.
//!
//! Initializes a `tracing-subscriber` with file or stderr output. The
//! original code redirected stdout/stderr into a log file at startup;
//! writing the subscriber's output to a file is the equivalent without
//! process-wide stream redirection.
//!
//! Priority: explicit [`LogConfig`] level, then `RUST_LOG`, then `info`.
//! Embedders that install their own subscriber before building a session
//! win; initialization here is a no-op in that case.

use std::sync::OnceLock;
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Logging configuration carried by [`HiveConfig`](crate::HiveConfig).
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Log level: "off", "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path. If unset, logs go to stderr.
    pub file: Option<String>,
}

/// Initialize the tracing subscriber.
///
/// Uses `OnceLock` so this runs at most once per process; the first session
/// built configures logging and later sessions are no-ops.
pub fn init(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        if let Some(ref level) = config.level {
            if level.eq_ignore_ascii_case("off") {
                return;
            }
        }

        let filter = if let Some(ref level) = config.level {
            EnvFilter::new(format!("hive_session={}", level.to_lowercase()))
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hive_session=info"))
        };

        if let Some(ref path) = config.file {
            let file = match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("hive-session: failed to open log file {path}: {e}");
                    return;
                }
            };

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(file)
                        .with_target(false)
                        .with_ansi(false)
                        .with_timer(SystemTime),
                )
                .try_init()
                .ok();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_timer(SystemTime),
                )
                .try_init()
                .ok();
        }
    });
}
