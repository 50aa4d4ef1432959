use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Route tracing output to a daily rolling file; the terminal belongs to the UI.
///
/// Keep the returned guard alive for the life of the program or buffered lines are lost.
pub fn init(log_dir: &Path, default_level: &str) -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(log_dir, "quizline.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .ok()
        .map(|_| guard)
}
