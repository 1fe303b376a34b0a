//! Tracing subscriber setup shared by the CLI and the server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_VAR: &str = "ECLIPSE_LOG";

/// Filter directive: explicit flag, then `ECLIPSE_LOG`, then `RUST_LOG`,
/// then `default`.
pub fn filter_directive<F>(flag: Option<&str>, env: F, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    flag.map(str::to_string)
        .or_else(|| env(LOG_VAR))
        .or_else(|| env("RUST_LOG"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Install a stderr subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(flag: Option<&str>, default: &str) {
    let directive = filter_directive(flag, |key| std::env::var(key).ok(), default);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
