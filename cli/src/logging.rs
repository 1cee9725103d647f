//! Logging setup for the `bddtrace` binary.
//!
//! Everything goes to stderr so `plan --format json|yaml` output on stdout
//! stays machine-readable.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BDDTRACE_LOG";

/// Picks the filter directive: explicit flag, then `BDDTRACE_LOG`, then
/// `RUST_LOG`, then `default`.
pub fn filter_directive(
    flag: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
    default: &str,
) -> String {
    let non_blank = |value: &String| !value.trim().is_empty();
    flag.map(str::to_string)
        .filter(non_blank)
        .or_else(|| lookup(LOG_ENV).filter(non_blank))
        .or_else(|| lookup("RUST_LOG").filter(non_blank))
        .unwrap_or_else(|| default.to_string())
}

pub fn init_logging(flag: Option<&str>, default: &str) {
    let directive = filter_directive(flag, |key| std::env::var(key).ok(), default);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // a subscriber may already be installed (tests)
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("debug"), Some("warn"), Some("error"), "debug")]
    #[case(None, Some("warn"), Some("error"), "warn")]
    #[case(None, None, Some("error"), "error")]
    #[case(None, None, None, "info")]
    #[case(Some(" "), None, None, "info")]
    #[case(Some(""), Some("debug"), None, "debug")]
    #[case(None, Some(""), Some("trace"), "trace")]
    #[case(Some(" "), Some("  "), Some(""), "info")]
    fn directive_precedence(
        #[case] flag: Option<&str>,
        #[case] own_env: Option<&str>,
        #[case] rust_log: Option<&str>,
        #[case] expected: &str,
    ) {
        let lookup = |key: &str| match key {
            LOG_ENV => own_env.map(str::to_string),
            "RUST_LOG" => rust_log.map(str::to_string),
            _ => None,
        };
        assert_eq!(filter_directive(flag, lookup, "info"), expected);
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(Some("not a valid [directive"), "warn");
        init_logging(None, "info");
    }
}
