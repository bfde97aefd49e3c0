use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Installs the stderr log subscriber.
///
/// A non-empty `RUST_LOG` takes precedence over `log_level`, including
/// [`LogLevel::None`].
pub fn init_telemetry(log_level: LogLevel) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let Some(directive) = filter_directive(rust_log.as_deref(), log_level) else {
        return;
    };
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("[cmdrun] Ignoring invalid log filter '{directive}': {err}");
        EnvFilter::new(default_directive(log_level).unwrap_or("cmdrun=info"))
    });

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        eprintln!("[cmdrun] A log subscriber is already installed; keeping it");
    }
}

fn filter_directive(rust_log: Option<&str>, log_level: LogLevel) -> Option<String> {
    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Some(value.to_string()),
        None => default_directive(log_level).map(str::to_string),
    }
}

fn default_directive(log_level: LogLevel) -> Option<&'static str> {
    match log_level {
        LogLevel::Debug => Some("cmdrun=debug"),
        LogLevel::Info => Some("cmdrun=info"),
        LogLevel::None => None,
    }
}
