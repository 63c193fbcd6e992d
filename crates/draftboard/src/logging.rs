#![forbid(unsafe_code)]

//! JSON log output for production deployments.
//!
//! Every runtime event is emitted under a `draftboard.*` target
//! (`draftboard.history`, `draftboard.session`, `draftboard.drop`,
//! `draftboard.persist`), so a filter such as
//! `"warn,draftboard.persist=debug"` selects save traffic alone.

use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Install a global JSON subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter` when it is set.
/// Fails if a global subscriber is already installed.
pub fn init_json_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|err| Error::Logging(err.to_string()))?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))?;

    tracing::debug!(target: "draftboard.logging", "json logging installed");
    Ok(())
}

#[cfg(all(test, feature = "tracing-json"))]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_an_error_not_a_panic() {
        let _ = init_json_logging("warn,draftboard.persist=debug");

        let err = init_json_logging("info").unwrap_err();
        assert!(matches!(err, Error::Logging(_)));
        assert!(err.to_string().starts_with("logging setup failed: "));
    }
}
