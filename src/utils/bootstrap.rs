//! Bootstrap utilities for the rewards ledger binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the REWARDS_LOG environment variable.
///
/// Defaults to "info" level if REWARDS_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Parse the `--config <path>` argument from command line args.
pub fn parse_config_path() -> Option<String> {
    parse_config_path_from(std::env::args())
}

fn parse_config_path_from(args: impl IntoIterator<Item = String>) -> Option<String> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_config_path() {
        assert_eq!(
            parse_config_path_from(args(&["server", "--config", "prod.yaml"])),
            Some("prod.yaml".to_string())
        );
        assert_eq!(
            parse_config_path_from(args(&["server", "--config=dev.yaml"])),
            Some("dev.yaml".to_string())
        );
        assert_eq!(parse_config_path_from(args(&["server"])), None);
        assert_eq!(parse_config_path_from(args(&["server", "--config"])), None);
    }
}
