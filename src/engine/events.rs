use serde::Serialize;

use crate::types::Rect;

/// Observable engine activity, published on the optional event channel.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// An attempt started while the pool was full and was dropped.
    AttemptSkipped { active: usize },
    AcquisitionFailed { reason: String },
    /// Fetched content is already on screen.
    Duplicate { id: String },
    SurfaceFailed { reason: String },
    Committed { id: String, rect: Rect, degraded: bool },
    /// No collision-free spot was found; the last sample was used.
    PlacementDegraded { id: String, attempts: u32 },
    FadeStarted { id: String },
    Removed { id: String },
    RespawnScheduled { delay_ms: u64 },
}

impl EngineEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AttemptSkipped { .. } => "attempt_skipped",
            Self::AcquisitionFailed { .. } => "acquisition_failed",
            Self::Duplicate { .. } => "duplicate",
            Self::SurfaceFailed { .. } => "surface_failed",
            Self::Committed { .. } => "committed",
            Self::PlacementDegraded { .. } => "placement_degraded",
            Self::FadeStarted { .. } => "fade_started",
            Self::Removed { .. } => "removed",
            Self::RespawnScheduled { .. } => "respawn_scheduled",
        }
    }
}
