use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

const FALLBACK_FILTER: &str = "blurbs=info,info";

/// Install the global tracing subscriber.
///
/// The filter is the first valid candidate among `explicit_filter`,
/// `RUST_LOG` and a built-in default.
///
/// # Errors
///
/// Fails when no candidate filter parses, when JSON output is requested from a
/// build without the `json-logs` feature, or when a global subscriber is
/// already installed.
pub fn init_tracing(explicit_filter: Option<&str>, use_json: bool) -> Result<()> {
    let filter = [
        explicit_filter.map(str::to_string),
        std::env::var("RUST_LOG").ok(),
        Some(FALLBACK_FILTER.to_string()),
    ]
    .into_iter()
    .flatten()
    .find_map(|candidate| EnvFilter::try_new(candidate).ok())
    .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))?;

    #[cfg(feature = "json-logs")]
    if use_json {
        let subscriber = Registry::default().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .json()
                .flatten_event(true),
        );
        return tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()));
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}
