//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "TERRAPIPE_LOG";

/// Builds the filter: `TERRAPIPE_LOG` wins, then `level`, then `info`.
pub fn build_env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a formatted stderr subscriber.
///
/// Calling it again after a subscriber is installed has no effect.
pub fn init_logging(level: Option<&str>) {
    let result = fmt()
        .with_env_filter(build_env_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_argument_used_without_env() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        assert_eq!(build_env_filter(Some("debug")).to_string(), "debug");
        assert_eq!(build_env_filter(None).to_string(), "info");
    }
}
