//! ui::logging
//!
//! Diagnostic logging for the binary.
//!
//! Events go to stderr through `tracing-subscriber`. `RUST_LOG` takes
//! precedence over the level picked from the flags.

use tracing_subscriber::EnvFilter;

use super::output::Verbosity;

/// Filter directive for a verbosity when `RUST_LOG` is unset.
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Debug => "debug",
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbosity: Verbosity) {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity == Verbosity::Debug),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_follow_verbosity() {
        assert_eq!(default_directive(Verbosity::Quiet), "error");
        assert_eq!(default_directive(Verbosity::Normal), "warn");
        assert_eq!(default_directive(Verbosity::Debug), "debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(Verbosity::Normal);
        init(Verbosity::Debug);
    }
}
