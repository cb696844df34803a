//! Tracing subscriber setup.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter (same syntax as `RUST_LOG`).
pub const LOG_ENV: &str = "SCENE_IMAGING_LOG";

/// Install a global fmt subscriber filtered by [`LOG_ENV`].
///
/// Returns false if a global subscriber was already installed, which makes
/// it safe to call from every test.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        assert!(!init_tracing());
    }
}
