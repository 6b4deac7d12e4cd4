//! Logging setup

use tracing_subscriber::EnvFilter;

use crate::{LoggingConfig, RuntimeError, RuntimeResult};

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured filter. Output goes to stderr.
pub fn init_logging(config: &LoggingConfig) -> RuntimeResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| RuntimeError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| RuntimeError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        let config = LoggingConfig {
            filter: "obra=notalevel".to_string(),
            json: false,
        };
        // RUST_LOG may be set in the test environment
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(matches!(init_logging(&config), Err(RuntimeError::Logging(_))));
        }
    }
}
