//! Priority scoring and target selection.
//!
//! # Score Formula
//!
//! ```text
//! base     = deficit_term + incoming_term + hazard_term
//! priority = base × role_multiplier − distance_penalty
//! priority ×= 2   when health fraction ≤ 0.30
//!
//! deficit_term     = (1 − fraction) × 200
//! incoming_term    = incoming / max_health × 150
//! hazard_term      = 30 when any hazard flag is set
//! distance_penalty = max(0, (distance − 20) × 2)
//! ```
//!
//! Weights come from [`ScoringConfig`]. Equal scores are resolved in favour of
//! the lowest [`ActorId`], so selection never depends on snapshot order.

use std::cmp::Ordering;

use glam::Vec3;

use crate::config::ScoringConfig;
use crate::env::SceneOracle;
use crate::forecast::ForecastModel;
use crate::state::{Actor, ActorId};

/// Structured priority of one actor, kept for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Priority {
    pub actor: ActorId,
    pub deficit_term: f32,
    pub incoming_term: f32,
    pub hazard_term: f32,
    pub role_multiplier: f32,
    pub distance_penalty: f32,
    /// The low-health doubling applied.
    pub doubled: bool,
}

impl Priority {
    /// Computes the final scalar priority.
    pub fn value(&self) -> f32 {
        let base = self.deficit_term + self.incoming_term + self.hazard_term;
        let weighted = base * self.role_multiplier - self.distance_penalty;
        if self.doubled { weighted * 2.0 } else { weighted }
    }
}

/// A selected actor with its priority.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredActor<'c> {
    pub actor: &'c Actor,
    pub priority: Priority,
}

impl ScoredActor<'_> {
    pub fn id(&self) -> ActorId {
        self.actor.id
    }

    pub fn value(&self) -> f32 {
        self.priority.value()
    }
}

/// Descending value, then ascending id.
fn rank_order(a: &ScoredActor<'_>, b: &ScoredActor<'_>) -> Ordering {
    b.value()
        .total_cmp(&a.value())
        .then_with(|| a.id().cmp(&b.id()))
}

/// Scores actors relative to the controller's position.
pub struct PriorityScorer<'a, S: SceneOracle + ?Sized> {
    config: &'a ScoringConfig,
    forecaster: &'a ForecastModel<'a, S>,
    origin: Vec3,
}

impl<'a, S: SceneOracle + ?Sized> PriorityScorer<'a, S> {
    pub fn new(config: &'a ScoringConfig, forecaster: &'a ForecastModel<'a, S>, origin: Vec3) -> Self {
        Self {
            config,
            forecaster,
            origin,
        }
    }

    pub fn forecaster(&self) -> &'a ForecastModel<'a, S> {
        self.forecaster
    }

    /// Priority of `actor`, using the forecast's incoming damage.
    pub fn score(&self, actor: &Actor) -> Priority {
        let incoming = self
            .forecaster
            .incoming_damage_estimate(actor, self.forecaster.horizon());
        self.score_with(actor, incoming)
    }

    /// Priority of `actor` given an explicit incoming-damage estimate.
    pub fn score_with(&self, actor: &Actor, incoming: f32) -> Priority {
        let config = self.config;
        let fraction = actor.health_fraction();
        let incoming_term = if actor.max_health > 0.0 {
            (incoming.max(0.0) / actor.max_health) * config.incoming_weight
        } else {
            0.0
        };
        let distance = actor.distance_to(self.origin);

        let priority = Priority {
            actor: actor.id,
            deficit_term: (1.0 - fraction) * config.deficit_weight,
            incoming_term,
            hazard_term: if actor.hazards.is_empty() {
                0.0
            } else {
                config.hazard_bonus
            },
            role_multiplier: config.role_multiplier(actor.role),
            distance_penalty: ((distance - config.free_distance) * config.distance_slope).max(0.0),
            doubled: fraction <= config.doubling_fraction,
        };

        tracing::trace!(
            "  Actor {}: priority={} (deficit={}, incoming={}, hazard={}, role={}, dist_penalty={}, doubled={})",
            actor.id,
            priority.value(),
            priority.deficit_term,
            priority.incoming_term,
            priority.hazard_term,
            priority.role_multiplier,
            priority.distance_penalty,
            priority.doubled
        );

        priority
    }

    /// Highest-priority live actor under `min_fraction` health and within `max_range`.
    ///
    /// Ties go to the lowest actor id. Returns `None` when nothing qualifies.
    pub fn best<'c>(
        &self,
        candidates: &'c [Actor],
        min_fraction: f32,
        max_range: f32,
    ) -> Option<ScoredActor<'c>> {
        let best = candidates
            .iter()
            .filter(|actor| actor.alive && actor.health_fraction() < min_fraction)
            .filter(|actor| actor.distance_to(self.origin) <= max_range)
            .map(|actor| ScoredActor {
                actor,
                priority: self.score(actor),
            })
            .min_by(rank_order);

        match &best {
            Some(scored) => tracing::debug!(
                "PriorityScorer: best = {} (priority={})",
                scored.id(),
                scored.value()
            ),
            None => tracing::debug!("PriorityScorer: no candidate qualifies"),
        }
        best
    }

    /// Up to `k` live actors under `min_fraction` health, highest priority first.
    ///
    /// `cluster_radius` is accepted for interface compatibility; no clustering
    /// is performed.
    pub fn top_k<'c>(
        &self,
        candidates: &'c [Actor],
        k: usize,
        min_fraction: f32,
        cluster_radius: f32,
    ) -> Vec<ScoredActor<'c>> {
        let _ = cluster_radius;
        let mut scored: Vec<_> = candidates
            .iter()
            .filter(|actor| actor.alive && actor.health_fraction() < min_fraction)
            .map(|actor| ScoredActor {
                actor,
                priority: self.score(actor),
            })
            .collect();
        scored.sort_by(rank_order);
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ForecastConfig, HistoryConfig};
    use crate::env::SceneSnapshot;
    use crate::history::HistoryTracker;
    use crate::state::{HazardFlags, Role};

    struct Fixture {
        scoring: ScoringConfig,
        forecast: ForecastConfig,
        history: HistoryTracker,
        scene: SceneSnapshot,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scoring: ScoringConfig::default(),
                forecast: ForecastConfig::default(),
                history: HistoryTracker::new(&HistoryConfig::default()),
                scene: SceneSnapshot::new(),
            }
        }
    }

    fn actor(id: u32, role: Role, x: f32, health: f32) -> Actor {
        Actor::new(ActorId(id), role, Vec3::new(x, 0.0, 0.0), 100.0).with_health(health)
    }

    #[test]
    fn tank_at_twenty_percent_scores_480() {
        let fx = Fixture::new();
        let model = ForecastModel::new(&fx.forecast, &fx.history, &fx.scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        let tank = actor(1, Role::Tank, 10.0, 20.0);
        let priority = scorer.score(&tank);
        // (0.8 × 200) × 1.5 × 2
        assert_eq!(priority.value(), 480.0);
        assert!(priority.doubled);
        assert_eq!(priority.distance_penalty, 0.0);
    }

    #[test]
    fn doubling_applies_at_exactly_thirty_percent() {
        let fx = Fixture::new();
        let model = ForecastModel::new(&fx.forecast, &fx.history, &fx.scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        let at = scorer.score(&actor(1, Role::Damage, 0.0, 30.0));
        let above = scorer.score(&actor(2, Role::Damage, 0.0, 31.0));
        assert!(at.doubled);
        assert!(!above.doubled);
        assert!((at.value() - 280.0).abs() < 1e-3);
    }

    #[test]
    fn score_increases_with_deficit() {
        let fx = Fixture::new();
        let model = ForecastModel::new(&fx.forecast, &fx.history, &fx.scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        let mut previous = f32::NEG_INFINITY;
        for health in [100.0, 90.0, 70.0, 50.0, 31.0, 30.0, 10.0, 0.0] {
            let value = scorer.score(&actor(1, Role::Support, 5.0, health)).value();
            assert!(value > previous, "health {health} scored {value}");
            previous = value;
        }
    }

    #[test]
    fn incoming_hazard_and_distance_terms() {
        let fx = Fixture::new();
        let scene = SceneSnapshot::new().with_damage_per_second(ActorId(1), 25.0);
        let model = ForecastModel::new(&fx.forecast, &fx.history, &scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        let target = actor(1, Role::Damage, 30.0, 60.0).with_hazards(HazardFlags::STANDING_IN_FIRE);
        let priority = scorer.score(&target);
        // incoming = 25 × 2 = 50 → 0.5 × 150
        assert_eq!(priority.incoming_term, 75.0);
        assert_eq!(priority.hazard_term, 30.0);
        assert_eq!(priority.distance_penalty, 20.0);
        assert!((priority.value() - (80.0 + 75.0 + 30.0 - 20.0)).abs() < 1e-3);
    }

    #[test]
    fn best_filters_dead_healthy_and_distant() {
        let fx = Fixture::new();
        let model = ForecastModel::new(&fx.forecast, &fx.history, &fx.scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        let actors = vec![
            actor(1, Role::Tank, 5.0, 10.0).dead(),
            actor(2, Role::Damage, 5.0, 99.0),
            actor(3, Role::Damage, 80.0, 10.0),
            actor(4, Role::Damage, 5.0, 60.0),
        ];
        let best = scorer.best(&actors, 0.95, 40.0).map(|s| s.id());
        assert_eq!(best, Some(ActorId(4)));
    }

    #[test]
    fn best_breaks_ties_by_lowest_id() {
        let fx = Fixture::new();
        let model = ForecastModel::new(&fx.forecast, &fx.history, &fx.scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        let actors = vec![
            actor(9, Role::Damage, 5.0, 50.0),
            actor(3, Role::Damage, 5.0, 50.0),
            actor(7, Role::Damage, 5.0, 50.0),
        ];
        let best = scorer.best(&actors, 0.95, 40.0).map(|s| s.id());
        assert_eq!(best, Some(ActorId(3)));
    }

    #[test]
    fn best_with_no_actors_is_none() {
        let fx = Fixture::new();
        let model = ForecastModel::new(&fx.forecast, &fx.history, &fx.scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        assert!(scorer.best(&[], 0.95, 40.0).is_none());
        assert!(scorer.top_k(&[], 5, 0.95, 8.0).is_empty());
    }

    #[test]
    fn top_k_orders_descending_and_truncates() {
        let fx = Fixture::new();
        let model = ForecastModel::new(&fx.forecast, &fx.history, &fx.scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        let actors = vec![
            actor(1, Role::Damage, 5.0, 90.0),
            actor(2, Role::Damage, 5.0, 40.0),
            actor(3, Role::Tank, 5.0, 40.0),
            actor(4, Role::Damage, 5.0, 40.0),
            actor(5, Role::Damage, 5.0, 100.0),
        ];
        let ids: Vec<_> = scorer
            .top_k(&actors, 3, 0.95, 8.0)
            .iter()
            .map(|s| s.id())
            .collect();
        assert_eq!(ids, vec![ActorId(3), ActorId(2), ActorId(4)]);
    }

    #[test]
    fn top_k_ignores_cluster_radius() {
        let fx = Fixture::new();
        let model = ForecastModel::new(&fx.forecast, &fx.history, &fx.scene);
        let scorer = PriorityScorer::new(&fx.scoring, &model, Vec3::ZERO);

        let actors = vec![
            actor(1, Role::Damage, 5.0, 40.0),
            actor(2, Role::Damage, 50.0, 50.0),
        ];
        let narrow: Vec<_> = scorer.top_k(&actors, 5, 0.95, 0.1).iter().map(|s| s.id()).collect();
        let wide: Vec<_> = scorer.top_k(&actors, 5, 0.95, 100.0).iter().map(|s| s.id()).collect();
        assert_eq!(narrow, wide);
    }
}
