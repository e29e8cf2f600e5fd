//! Subscriber setup: console output plus an append-mode log file.
//!
//! Initialized exactly once at startup. Both sinks share the same line
//! shape: timestamp, level, source file, message.

use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Timestamp pattern, e.g. `Wed, 04 Jul 2024 14:55:26`.
const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Install the global subscriber with a console layer and a file layer
/// appending to `log_file`. `RUST_LOG` overrides `level` when set.
pub fn init(log_file: &Path, level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ocr.log".into());

    // Plain append file, no rotation
    let file_appender = rolling::never(dir, file_name);

    let timer = ChronoLocal::new(TIMESTAMP_FORMAT.to_string());

    let console_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_file(true)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_timer(timer)
        .with_file(true)
        .with_target(false)
        .with_ansi(false)
        .with_writer(file_appender);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
