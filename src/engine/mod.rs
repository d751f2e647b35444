//! Bounded pool of on-screen blurbs and their timed lifecycle.
//!
//! Every transition is a plain method on [`Engine`] driven by an explicit
//! [`Timer`] value; [`Engine::run`] only adds the async plumbing (fetches in
//! flight and sleeping until the next deadline) on top.

mod driver;
mod events;
mod timers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_channel::{Sender, TrySendError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::content::{Blurb, ContentSource, Substitution};
use crate::error::ContentError;
use crate::placement::{PlacementParams, resolve_placement};
use crate::surface::Surface;
use crate::types::{LifecycleState, Rect};

pub use events::EngineEvent;
pub use timers::{Timer, TimerQueue};

/// Uniformly sampled duration in `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationWindow {
    pub min: Duration,
    pub max: Duration,
}

impl DurationWindow {
    #[must_use]
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rng.random_range(self.min..self.max)
    }

    #[must_use]
    pub fn contains(&self, value: Duration) -> bool {
        if self.max <= self.min {
            value == self.min
        } else {
            value >= self.min && value < self.max
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineSettings {
    /// Target number of simultaneously visible blurbs.
    pub capacity: usize,
    /// How long a committed blurb stays fully visible.
    pub lifetime: DurationWindow,
    pub fade: Duration,
    /// Delay between a removal and the replacement attempt.
    pub respawn: DurationWindow,
    /// Initial attempts are spread over `[0, seed_window)`.
    pub seed_window: Duration,
    pub placement: PlacementParams,
}

/// One blurb that made it on screen.
#[derive(Debug)]
pub struct NotificationRecord<N> {
    pub id: String,
    pub text: String,
    pub node: N,
    /// Fixed at placement time; never re-measured.
    pub rect: Rect,
    pub serial: u64,
    pub state: LifecycleState,
    pub degraded: bool,
}

/// Result of completing one spawn attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    Committed { id: String, degraded: bool },
    AcquisitionFailed,
    Duplicate { id: String },
    SurfaceFailed,
}

pub struct Engine<S: Surface> {
    settings: EngineSettings,
    surface: S,
    source: Arc<dyn ContentSource>,
    substitution: Arc<Substitution>,
    active: HashMap<String, NotificationRecord<S::Node>>,
    pending: usize,
    timers: TimerQueue,
    rng: StdRng,
    events: Option<Sender<EngineEvent>>,
    next_serial: u64,
}

impl<S: Surface> Engine<S> {
    /// `rng_seed` makes placement and timing reproducible; `None` seeds from
    /// the operating system.
    pub fn new(
        settings: EngineSettings,
        surface: S,
        source: Arc<dyn ContentSource>,
        substitution: Substitution,
        rng_seed: Option<u64>,
    ) -> Self {
        let rng = rng_seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            settings,
            surface,
            source,
            substitution: Arc::new(substitution),
            active: HashMap::with_capacity(settings.capacity),
            pending: 0,
            timers: TimerQueue::new(),
            rng,
            events: None,
            next_serial: 1,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Sender<EngineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn record(&self, id: &str) -> Option<&NotificationRecord<S::Node>> {
        self.active.get(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &NotificationRecord<S::Node>> {
        self.active.values()
    }

    /// Attempts started whose content has not arrived yet.
    pub const fn pending(&self) -> usize {
        self.pending
    }

    pub const fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    pub fn pop_due(&mut self, now: Instant) -> Vec<Timer> {
        self.timers.pop_due(now)
    }

    /// Schedule `capacity` independent attempts at random offsets.
    pub fn seed(&mut self, now: Instant) {
        let window = DurationWindow::new(Duration::ZERO, self.settings.seed_window);
        for _ in 0..self.settings.capacity {
            let offset = window.sample(&mut self.rng);
            self.timers.schedule(now + offset, Timer::Spawn);
        }
        debug!(
            capacity = self.settings.capacity,
            window_ms = duration_ms(self.settings.seed_window),
            "pool seeded"
        );
    }

    /// Start an attempt unless the pool is already full.
    ///
    /// Returns `true` when the caller should fetch content and hand the
    /// result to [`Engine::complete_attempt`]. The capacity check happens
    /// here only, so attempts already in flight may overshoot it.
    pub fn begin_attempt(&mut self) -> bool {
        let active = self.active.len();
        if active >= self.settings.capacity {
            debug!(active, "pool at capacity, attempt dropped");
            self.emit(EngineEvent::AttemptSkipped { active });
            return false;
        }
        self.pending += 1;
        trace!(pending = self.pending, "attempt started");
        true
    }

    /// Finish an attempt with the fetched content.
    ///
    /// Failures and duplicates drop the attempt without scheduling a retry.
    pub fn complete_attempt(
        &mut self,
        outcome: Result<Blurb, ContentError>,
        now: Instant,
    ) -> SpawnOutcome {
        self.pending = self.pending.saturating_sub(1);

        let blurb = match outcome {
            Ok(blurb) => blurb,
            Err(err) => {
                debug!(error = %err, "content acquisition failed, attempt dropped");
                self.emit(EngineEvent::AcquisitionFailed {
                    reason: err.kind().to_string(),
                });
                return SpawnOutcome::AcquisitionFailed;
            }
        };

        if self.active.contains_key(&blurb.id) {
            debug!(id = %blurb.id, "content already on screen, attempt dropped");
            self.emit(EngineEvent::Duplicate {
                id: blurb.id.clone(),
            });
            return SpawnOutcome::Duplicate { id: blurb.id };
        }

        let node = match self.surface.create_node(&blurb.text) {
            Ok(node) => node,
            Err(err) => return self.surface_failed(&blurb.id, &err),
        };
        let measured = match self.surface.measure(&node) {
            Ok(rect) => rect,
            Err(err) => {
                self.surface.remove(node);
                return self.surface_failed(&blurb.id, &err);
            }
        };

        let size = measured.size();
        let placement = resolve_placement(
            size,
            self.surface.viewport(),
            self.active.values().map(|record| &record.rect),
            &self.settings.placement,
            &mut self.rng,
        );
        if let Err(err) = self.surface.set_position(&node, placement.x, placement.y) {
            self.surface.remove(node);
            return self.surface_failed(&blurb.id, &err);
        }

        let rect = placement.rect(size);
        if placement.degraded {
            warn!(
                id = %blurb.id,
                attempts = placement.attempts,
                "no free spot found, using last sampled position"
            );
            self.emit(EngineEvent::PlacementDegraded {
                id: blurb.id.clone(),
                attempts: placement.attempts,
            });
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        let lifetime = self.settings.lifetime.sample(&mut self.rng);
        self.timers.schedule(
            now + lifetime,
            Timer::BeginFade {
                id: blurb.id.clone(),
                serial,
            },
        );

        info!(
            id = %blurb.id,
            serial,
            x = rect.left,
            y = rect.top,
            lifetime_ms = duration_ms(lifetime),
            "blurb shown"
        );
        self.emit(EngineEvent::Committed {
            id: blurb.id.clone(),
            rect,
            degraded: placement.degraded,
        });

        let id = blurb.id.clone();
        self.active.insert(
            blurb.id.clone(),
            NotificationRecord {
                id: blurb.id,
                text: blurb.text,
                node,
                rect,
                serial,
                state: advance(LifecycleState::Pending, LifecycleState::Active),
                degraded: placement.degraded,
            },
        );
        SpawnOutcome::Committed {
            id,
            degraded: placement.degraded,
        }
    }

    /// Apply one due timer. Returns `true` when a new fetch should start.
    pub fn fire(&mut self, timer: Timer, now: Instant) -> bool {
        match timer {
            Timer::Spawn => self.begin_attempt(),
            Timer::BeginFade { id, serial } => {
                self.begin_fade(&id, serial, now);
                false
            }
            Timer::Remove { id, serial } => {
                self.finish_removal(&id, serial, now);
                false
            }
        }
    }

    fn begin_fade(&mut self, id: &str, serial: u64, now: Instant) {
        let Some(record) = self
            .active
            .get_mut(id)
            .filter(|record| record.serial == serial && record.state == LifecycleState::Active)
        else {
            trace!(id, serial, "stale fade timer ignored");
            return;
        };

        record.state = advance(record.state, LifecycleState::FadingOut);
        if let Err(err) = self.surface.fade_out(&record.node, self.settings.fade) {
            warn!(id, error = %err, "surface could not start fade");
        }
        self.timers.schedule(
            now + self.settings.fade,
            Timer::Remove {
                id: id.to_string(),
                serial,
            },
        );
        debug!(id, serial, "fade started");
        self.emit(EngineEvent::FadeStarted { id: id.to_string() });
    }

    fn finish_removal(&mut self, id: &str, serial: u64, now: Instant) {
        let matches = self
            .active
            .get(id)
            .is_some_and(|record| record.serial == serial && record.state == LifecycleState::FadingOut);
        if !matches {
            trace!(id, serial, "stale removal timer ignored");
            return;
        }
        let Some(mut record) = self.active.remove(id) else {
            return;
        };

        record.state = advance(record.state, LifecycleState::Removed);
        self.surface.remove(record.node);

        let delay = self.settings.respawn.sample(&mut self.rng);
        self.timers.schedule(now + delay, Timer::Spawn);

        info!(
            id,
            serial,
            active = self.active.len(),
            respawn_ms = duration_ms(delay),
            "blurb removed"
        );
        self.emit(EngineEvent::Removed { id: id.to_string() });
        self.emit(EngineEvent::RespawnScheduled {
            delay_ms: duration_ms(delay),
        });
    }

    fn surface_failed(&self, id: &str, err: &crate::error::SurfaceError) -> SpawnOutcome {
        warn!(id, error = %err, "surface failed, attempt dropped");
        self.emit(EngineEvent::SurfaceFailed {
            reason: err.to_string(),
        });
        SpawnOutcome::SurfaceFailed
    }

    fn emit(&self, event: EngineEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                warn!(event = event.name(), "event queue full, dropping event");
            }
        }
    }
}

fn advance(from: LifecycleState, to: LifecycleState) -> LifecycleState {
    debug_assert!(from.can_advance_to(to), "illegal transition {from} -> {to}");
    to
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
