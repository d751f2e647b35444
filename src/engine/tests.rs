use std::sync::Arc;
use std::time::Duration;

use async_channel::Receiver;
use async_trait::async_trait;
use tokio::time::Instant;

use super::{DurationWindow, Engine, EngineEvent, EngineSettings, SpawnOutcome, Timer};
use crate::content::{Blurb, ContentSource, RawContent, Substitution};
use crate::error::ContentError;
use crate::placement::{PlacementParams, exclusion_zone};
use crate::surface::{TextMetrics, VirtualSurface};
use crate::types::{LifecycleState, Viewport};

struct Offline;

#[async_trait]
impl ContentSource for Offline {
    async fn fetch(&self) -> Result<RawContent, ContentError> {
        Err(ContentError::MissingField { field: "id" })
    }
}

const VIEWPORT: Viewport = Viewport::new(1000.0, 800.0);

fn settings(capacity: usize) -> EngineSettings {
    EngineSettings {
        capacity,
        lifetime: DurationWindow::new(Duration::from_secs(30), Duration::from_secs(45)),
        fade: Duration::from_secs(2),
        respawn: DurationWindow::new(Duration::from_secs(2), Duration::from_secs(5)),
        seed_window: Duration::from_secs(2),
        placement: PlacementParams {
            edge_margin: 50.0,
            inner_margin: 10.0,
            center_padding: 150.0,
            max_attempts: 10,
        },
    }
}

fn engine(capacity: usize, seed: u64) -> (Engine<VirtualSurface>, Receiver<EngineEvent>) {
    let surface = VirtualSurface::new(
        VIEWPORT,
        TextMetrics {
            max_width: 180.0,
            char_width: 7.0,
            line_height: 18.0,
            padding: 12.0,
        },
    );
    let substitution = Substitution::new("Chuck Norris", "Gabe").expect("substitution");
    let (tx, rx) = async_channel::bounded(256);
    let engine = Engine::new(
        settings(capacity),
        surface,
        Arc::new(Offline),
        substitution,
        Some(seed),
    )
    .with_events(tx);
    (engine, rx)
}

fn blurb(id: &str) -> Result<Blurb, ContentError> {
    Ok(Blurb {
        id: id.to_string(),
        text: format!("Gabe #{id}"),
    })
}

fn drain(rx: &Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn spawn(engine: &mut Engine<VirtualSurface>, id: &str, now: Instant) -> SpawnOutcome {
    assert!(engine.begin_attempt(), "attempt for {id} should start");
    engine.complete_attempt(blurb(id), now)
}

#[test]
fn five_distinct_blurbs_fill_the_pool_without_collisions() {
    for seed in 0..20 {
        let (mut engine, rx) = engine(5, seed);
        let now = Instant::now();
        for id in ["a", "b", "c", "d", "e"] {
            assert!(matches!(
                spawn(&mut engine, id, now),
                SpawnOutcome::Committed { .. }
            ));
        }
        assert_eq!(engine.active_len(), 5);

        let records: Vec<_> = engine.records().collect();
        for (i, a) in records.iter().enumerate() {
            assert!(a.rect.within(VIEWPORT));
            if !a.degraded {
                let zone = exclusion_zone(a.rect.size(), VIEWPORT, 150.0);
                assert!(!a.rect.intersects(&zone), "seed {seed}: {} hits the centre", a.id);
            }
            for b in &records[i + 1..] {
                if a.rect.intersects(&b.rect) {
                    assert!(
                        a.degraded || b.degraded,
                        "seed {seed}: {} and {} overlap without a degraded flag",
                        a.id,
                        b.id
                    );
                }
            }
        }

        let events = drain(&rx);
        let flagged = events
            .iter()
            .filter(|event| matches!(event, EngineEvent::PlacementDegraded { .. }))
            .count();
        let degraded = records.iter().filter(|record| record.degraded).count();
        assert_eq!(flagged, degraded);
    }
}

#[test]
fn duplicate_id_leaves_the_pool_untouched() {
    let (mut engine, rx) = engine(5, 1);
    let now = Instant::now();
    spawn(&mut engine, "joke-1", now);
    let before = engine.record("joke-1").map(|record| (record.serial, record.rect));
    let timers_before = engine.timers().len();
    drain(&rx);

    let outcome = spawn(&mut engine, "joke-1", now);
    assert_eq!(
        outcome,
        SpawnOutcome::Duplicate {
            id: "joke-1".to_string()
        }
    );
    assert_eq!(engine.active_len(), 1);
    assert_eq!(
        engine.record("joke-1").map(|record| (record.serial, record.rect)),
        before
    );
    assert_eq!(engine.timers().len(), timers_before);
    assert_eq!(engine.surface().created(), 1);
    assert_eq!(
        drain(&rx),
        vec![EngineEvent::Duplicate {
            id: "joke-1".to_string()
        }]
    );
}

#[test]
fn full_pool_drops_new_attempts() {
    let (mut engine, rx) = engine(2, 2);
    let now = Instant::now();
    spawn(&mut engine, "a", now);
    spawn(&mut engine, "b", now);
    drain(&rx);

    assert!(!engine.begin_attempt());
    assert!(!engine.fire(Timer::Spawn, now));
    assert_eq!(engine.pending(), 0);
    assert_eq!(
        drain(&rx),
        vec![
            EngineEvent::AttemptSkipped { active: 2 },
            EngineEvent::AttemptSkipped { active: 2 }
        ]
    );
}

#[test]
fn racing_attempts_may_overshoot_capacity() {
    let (mut engine, _rx) = engine(1, 3);
    let now = Instant::now();
    assert!(engine.begin_attempt());
    assert!(engine.begin_attempt());
    assert_eq!(engine.pending(), 2);
    engine.complete_attempt(blurb("x"), now);
    engine.complete_attempt(blurb("y"), now);
    assert_eq!(engine.active_len(), 2);
    assert_eq!(engine.pending(), 0);
}

#[test]
fn failed_acquisition_schedules_nothing() {
    let (mut engine, rx) = engine(5, 4);
    assert!(engine.begin_attempt());
    let outcome = engine.complete_attempt(
        Err(ContentError::Json {
            message: "eof".to_string(),
        }),
        Instant::now(),
    );
    assert_eq!(outcome, SpawnOutcome::AcquisitionFailed);
    assert_eq!(engine.active_len(), 0);
    assert!(engine.timers().is_empty());
    assert_eq!(
        drain(&rx),
        vec![EngineEvent::AcquisitionFailed {
            reason: "json".to_string()
        }]
    );
}

#[test]
fn record_fades_then_is_removed_and_replaced() {
    let (mut engine, rx) = engine(5, 5);
    let start = Instant::now();
    spawn(&mut engine, "cycle", start);
    let node = engine
        .surface()
        .live_nodes()
        .map(|(id, _)| id)
        .next()
        .expect("node on surface");

    let (fade_due, fade_timer) = engine
        .timers()
        .iter()
        .map(|(due, timer)| (due, timer.clone()))
        .next()
        .expect("fade timer");
    assert!(matches!(fade_timer, Timer::BeginFade { ref id, .. } if id == "cycle"));
    assert!(engine.settings().lifetime.contains(fade_due - start));

    // Nothing is due before the display lifetime ends.
    assert!(engine.pop_due(start + Duration::from_secs(29)).is_empty());

    let due = engine.pop_due(fade_due);
    assert_eq!(due.len(), 1);
    for timer in due {
        assert!(!engine.fire(timer, fade_due));
    }
    assert_eq!(
        engine.record("cycle").map(|record| record.state),
        Some(LifecycleState::FadingOut)
    );
    let faded = engine.surface().node(node).expect("node snapshot");
    assert_eq!(faded.fade, Some(Duration::from_secs(2)));

    let removal_at = fade_due + Duration::from_secs(2);
    assert_eq!(engine.next_due(), Some(removal_at));
    for timer in engine.pop_due(removal_at) {
        engine.fire(timer, removal_at);
    }
    assert!(!engine.contains("cycle"));
    assert!(engine.surface().node(node).is_none());
    assert_eq!(engine.surface().removed(), 1);

    let respawn: Vec<_> = engine
        .timers()
        .iter()
        .filter(|(_, timer)| **timer == Timer::Spawn)
        .map(|(due, _)| due - removal_at)
        .collect();
    assert_eq!(respawn.len(), 1);
    assert!(engine.settings().respawn.contains(respawn[0]));

    let events = drain(&rx);
    let names: Vec<_> = events.iter().map(EngineEvent::name).collect();
    assert_eq!(
        names,
        vec!["committed", "fade_started", "removed", "respawn_scheduled"]
    );
    match events.last() {
        Some(EngineEvent::RespawnScheduled { delay_ms }) => {
            assert!((2_000..5_000).contains(delay_ms));
        }
        other => panic!("unexpected last event: {other:?}"),
    }

    // The replacement attempt runs once its delay elapses.
    let later = removal_at + Duration::from_secs(5);
    let starts: Vec<bool> = engine
        .pop_due(later)
        .into_iter()
        .map(|timer| engine.fire(timer, later))
        .collect();
    assert_eq!(starts, vec![true]);
    assert_eq!(engine.pending(), 1);
}

#[test]
fn stale_timers_are_ignored() {
    let (mut engine, rx) = engine(5, 6);
    let now = Instant::now();
    spawn(&mut engine, "keep", now);
    drain(&rx);

    // Removal before the fade started, wrong serial, unknown id.
    let serial = engine.record("keep").expect("record").serial;
    engine.fire(
        Timer::Remove {
            id: "keep".into(),
            serial,
        },
        now,
    );
    engine.fire(
        Timer::BeginFade {
            id: "keep".into(),
            serial: serial + 1,
        },
        now,
    );
    engine.fire(
        Timer::BeginFade {
            id: "ghost".into(),
            serial,
        },
        now,
    );

    assert_eq!(
        engine.record("keep").map(|record| record.state),
        Some(LifecycleState::Active)
    );
    assert!(drain(&rx).is_empty());
}

#[test]
fn seeding_staggers_capacity_attempts() {
    let (mut engine, _rx) = engine(5, 7);
    let now = Instant::now();
    engine.seed(now);
    let offsets: Vec<_> = engine.timers().iter().map(|(due, _)| due - now).collect();
    assert_eq!(offsets.len(), 5);
    assert!(offsets.iter().all(|offset| *offset < Duration::from_secs(2)));
    assert!(
        engine
            .timers()
            .iter()
            .all(|(_, timer)| *timer == Timer::Spawn)
    );
}

#[test]
fn removed_ids_can_come_back() {
    let (mut engine, _rx) = engine(5, 8);
    let now = Instant::now();
    spawn(&mut engine, "again", now);
    let first_serial = engine.record("again").expect("record").serial;

    let mut clock = now;
    for _ in 0..2 {
        clock = engine.next_due().expect("timer pending");
        for timer in engine.pop_due(clock) {
            engine.fire(timer, clock);
        }
    }
    assert!(!engine.contains("again"));

    spawn(&mut engine, "again", clock);
    let second = engine.record("again").expect("record");
    assert!(second.serial > first_serial);
}

#[test]
fn duration_window_sampling_stays_in_bounds() {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let window = DurationWindow::new(Duration::from_secs(2), Duration::from_secs(5));
    for _ in 0..500 {
        assert!(window.contains(window.sample(&mut rng)));
    }
    let fixed = DurationWindow::new(Duration::from_secs(1), Duration::from_secs(1));
    assert_eq!(fixed.sample(&mut rng), Duration::from_secs(1));
}
