//! Sliding-window health history per actor.
//!
//! The tracker keeps, for every actor seen recently, the health samples that
//! fall inside a fixed window behind the newest sample. The observed damage
//! rate is the health lost between the oldest and newest in-window samples
//! divided by the time between them. Healing over the window is reported as a
//! rate of zero, never as negative damage.
//!
//! Actors that stop appearing in snapshots are evicted after a time-to-live so
//! the tracker stays bounded by the live scene.

use std::collections::{BTreeMap, VecDeque};

use crate::config::HistoryConfig;
use crate::state::{Actor, ActorId, Seconds};

/// One observation of an actor's health.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthSample {
    pub at: Seconds,
    pub health: f32,
    pub fraction: f32,
}

#[derive(Clone, Debug, Default)]
struct ActorHistory {
    samples: VecDeque<HealthSample>,
    last_seen: Seconds,
}

impl ActorHistory {
    fn push(&mut self, sample: HealthSample, window: Seconds) {
        self.last_seen = self.last_seen.max(sample.at);

        match self.samples.back().map(|newest| newest.at) {
            Some(newest_at) if sample.at < newest_at => return,
            Some(newest_at) if sample.at == newest_at => {
                if let Some(newest) = self.samples.back_mut() {
                    *newest = sample;
                }
            }
            _ => self.samples.push_back(sample),
        }

        let cutoff = sample.at - window;
        while self.samples.front().is_some_and(|oldest| oldest.at < cutoff) {
            self.samples.pop_front();
        }
    }

    fn rate(&self) -> f32 {
        let (Some(oldest), Some(newest)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let elapsed = newest.at - oldest.at;
        if self.samples.len() < 2 || elapsed <= 0.0 {
            return 0.0;
        }
        ((oldest.health - newest.health) / elapsed).max(0.0)
    }
}

/// Rolling health samples for every tracked actor.
#[derive(Clone, Debug)]
pub struct HistoryTracker {
    window: Seconds,
    ttl: Seconds,
    actors: BTreeMap<ActorId, ActorHistory>,
}

impl HistoryTracker {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            window: config.window,
            ttl: config.ttl,
            actors: BTreeMap::new(),
        }
    }

    /// Appends the actor's current health at time `at`.
    ///
    /// A sample at the same timestamp as the newest one replaces it; a sample
    /// older than the newest one is ignored, so timestamps stay strictly
    /// increasing.
    pub fn record(&mut self, actor: &Actor, at: Seconds) {
        let sample = HealthSample {
            at,
            health: actor.health,
            fraction: actor.health_fraction(),
        };
        self.actors
            .entry(actor.id)
            .or_default()
            .push(sample, self.window);
    }

    /// Observed damage per second over the window, never negative.
    ///
    /// Returns 0 for unknown actors, single samples, and zero elapsed time.
    pub fn rate(&self, actor: ActorId) -> f32 {
        self.actors.get(&actor).map_or(0.0, ActorHistory::rate)
    }

    /// In-window samples of `actor`, oldest first.
    pub fn samples(&self, actor: ActorId) -> impl Iterator<Item = &HealthSample> + '_ {
        self.actors
            .get(&actor)
            .into_iter()
            .flat_map(|history| history.samples.iter())
    }

    /// Drops actors not recorded within the time-to-live. Returns how many were evicted.
    pub fn evict_stale(&mut self, now: Seconds) -> usize {
        let before = self.actors.len();
        let ttl = self.ttl;
        self.actors.retain(|_, history| now - history.last_seen <= ttl);
        let evicted = before - self.actors.len();
        if evicted > 0 {
            tracing::debug!("HistoryTracker: evicted {} stale actors", evicted);
        }
        evicted
    }

    pub fn forget(&mut self, actor: ActorId) {
        self.actors.remove(&actor);
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    /// Number of tracked actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
