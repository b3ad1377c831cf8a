//! Tracing subscriber setup for hosts embedding the controller.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs a global `fmt` subscriber filtered by `config.level`.
///
/// An unparsable level falls back to `info`.
///
/// # Errors
///
/// Returns `TryInitError` if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.json {
        builder.json().finish().try_init()
    } else {
        builder.finish().try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_refused() {
        let config = LoggingConfig {
            level: "turnout_capacity=warn".to_string(),
            json: true,
        };
        init(&config).expect("first subscriber should install");
        assert!(init(&LoggingConfig::default()).is_err());
    }
}
