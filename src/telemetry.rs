use crate::config::TelemetryConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Human-readable logs on stderr. `RUST_LOG` wins over `log_level`.
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_tracing(log_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// JSON lines on stderr.
pub fn init_tracing_json(log_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

pub fn init_from_config(config: &TelemetryConfig) {
    if config.json {
        init_tracing_json(&config.log_level);
    } else {
        init_tracing(&config.log_level);
    }
}
