//! Log setup following Terraform's TF_LOG conventions

use tracing_subscriber::filter::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";

/// Map a TF_LOG style level to a filter directive. Terraform uses JSON as an
/// alias for TRACE and ignores values it does not know.
fn directive(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" | "json" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

fn level_from_env() -> &'static str {
    ["TF_LOG_PROVIDER", "TF_LOG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find_map(|value| directive(&value))
        .unwrap_or(DEFAULT_LEVEL)
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level_from_env()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn known_levels_map_to_directives() {
        assert_eq!(directive("DEBUG"), Some("debug"));
        assert_eq!(directive("json"), Some("trace"));
        assert_eq!(directive(" warn "), Some("warn"));
        assert_eq!(directive("verbose"), None);
    }

    #[test]
    #[serial]
    fn provider_level_wins_over_global() {
        std::env::set_var("TF_LOG", "error");
        std::env::set_var("TF_LOG_PROVIDER", "debug");
        assert_eq!(level_from_env(), "debug");

        std::env::remove_var("TF_LOG_PROVIDER");
        assert_eq!(level_from_env(), "error");

        std::env::remove_var("TF_LOG");
        assert_eq!(level_from_env(), DEFAULT_LEVEL);
    }

    #[test]
    #[serial]
    fn init_is_idempotent() {
        init();
        init();
    }
}
