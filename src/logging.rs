//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events. Binaries and test harnesses call
//! [`init`] once to get console output; `RUST_LOG` overrides the default
//! directive.

use tracing_subscriber::EnvFilter;

/// Default filter: debug for vigia, warnings for everything else.
pub const DEFAULT_DIRECTIVE: &str = "warn,vigia=debug";

/// Install a fmt subscriber filtered by `RUST_LOG` or [`DEFAULT_DIRECTIVE`].
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    init_with_directive(DEFAULT_DIRECTIVE)
}

/// Install a fmt subscriber with an explicit fallback directive.
///
/// `RUST_LOG` still takes precedence when set. Returns `false` if a global
/// subscriber was already installed.
pub fn init_with_directive(directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
