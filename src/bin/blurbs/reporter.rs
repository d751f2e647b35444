use std::collections::BTreeMap;

use async_channel::Receiver;
use blurbs::engine::EngineEvent;
use tracing::{debug, info, warn};

/// Per-kind counts of the engine events seen by the reporter.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tally(BTreeMap<&'static str, u64>);

impl Tally {
    fn record(&mut self, event: &EngineEvent) {
        *self.0.entry(event.name()).or_default() += 1;
    }

    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or_default()
    }
}

/// Log every engine event until the channel closes.
pub async fn run_reporter(rx: Receiver<EngineEvent>, dry_run: bool) -> Tally {
    let mut tally = Tally::default();
    while let Ok(event) = rx.recv().await {
        tally.record(&event);
        match &event {
            EngineEvent::Committed { id, rect, degraded } if dry_run => {
                info!(
                    %id,
                    x = rect.left,
                    y = rect.top,
                    width = rect.width,
                    height = rect.height,
                    degraded,
                    "dry-run: would show blurb"
                );
            }
            EngineEvent::AcquisitionFailed { reason } => {
                warn!(reason, "no blurb this round");
            }
            _ => {}
        }
        match serde_json::to_string(&event) {
            Ok(json) => debug!(event = %json, "engine event"),
            Err(err) => warn!(error = %err, "failed to encode engine event"),
        }
    }

    info!(
        committed = tally.get("committed"),
        removed = tally.get("removed"),
        failed = tally.get("acquisition_failed"),
        duplicates = tally.get("duplicate"),
        degraded = tally.get("placement_degraded"),
        "event reporter finished"
    );
    tally
}
