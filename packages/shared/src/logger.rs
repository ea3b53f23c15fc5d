//! Logging setup for Parlor binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Every crate listed in `targets` (crate names, `-` or `_` separated) gets
/// `default_level`. The whole filter can be overridden with `RUST_LOG`.
///
/// # Examples
///
/// ```no_run
/// use parlor_shared::logger::setup_logger;
///
/// setup_logger(&["parlor-server", "tower_http"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(targets, default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_directives(targets: &[&str], default_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_level))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_normalizes_crate_names() {
        // テスト項目: クレート名の `-` が `_` に変換され、レベルが付与される
        // given (前提条件):
        let targets = ["parlor-server", "tower_http"];

        // when (操作):
        let directives = default_directives(&targets, "debug");

        // then (期待する結果):
        assert_eq!(directives, "parlor_server=debug,tower_http=debug");
    }

    #[test]
    fn test_default_directives_empty_targets() {
        // テスト項目: 対象が空なら空のフィルタになる
        // given (前提条件):
        let targets: [&str; 0] = [];

        // when (操作):
        let directives = default_directives(&targets, "info");

        // then (期待する結果):
        assert!(directives.is_empty());
    }
}
