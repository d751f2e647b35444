use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::{Instant, sleep_until};
use tracing::info;

use crate::content::{Blurb, ContentSource, Substitution, acquire};
use crate::error::ContentError;
use crate::surface::Surface;

use super::Engine;

type Acquisition = BoxFuture<'static, Result<Blurb, ContentError>>;

impl<S: Surface> Engine<S> {
    /// Seed the pool and keep it cycling until `shutdown` resolves.
    ///
    /// Everything runs on the calling task: fetches are polled alongside the
    /// timer wheel and each transition completes before the next one starts.
    /// Timers and fetches still pending at shutdown are abandoned and nodes
    /// on screen are left where they are.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut inflight: FuturesUnordered<Acquisition> = FuturesUnordered::new();
        tokio::pin!(shutdown);

        self.seed(Instant::now());
        info!(capacity = self.settings.capacity, "blurb engine started");

        loop {
            let next_due = self.next_due();
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!(
                        active = self.active_len(),
                        in_flight = inflight.len(),
                        "shutdown requested, stopping engine"
                    );
                    break;
                }
                Some(outcome) = inflight.next(), if !inflight.is_empty() => {
                    self.complete_attempt(outcome, Instant::now());
                }
                () = sleep_until(next_due.unwrap_or_else(Instant::now)), if next_due.is_some() => {
                    let now = Instant::now();
                    for timer in self.pop_due(now) {
                        if self.fire(timer, now) {
                            inflight.push(fetch(
                                Arc::clone(&self.source),
                                Arc::clone(&self.substitution),
                            ));
                        }
                    }
                }
            }
        }
    }
}

fn fetch(source: Arc<dyn ContentSource>, substitution: Arc<Substitution>) -> Acquisition {
    Box::pin(async move { acquire(source.as_ref(), &substitution).await })
}
