//! Predicted health at a future horizon.
//!
//! ```text
//! predicted = current − incoming_damage(Δ) + incoming_healing
//! incoming_damage(Δ) = observed_rate × Δ + scene_estimate(Δ)
//! incoming_healing   = Σ magnitude_per_tick × multiplier × remaining / tick_period
//! ```
//!
//! The healing term assumes every periodic effect runs to completion at a
//! fixed tick period, regardless of the horizon. This over-counts long effects
//! on short horizons; the simplification keeps the model closed-form.
//!
//! `predicted` is floored at 0 but may exceed `max_health` when healing
//! outweighs the deficit; `predicted_fraction` and `deficit` clamp it. The
//! model is a pure function of
//! the actor, the history tracker and the scene, so repeated calls within a
//! tick return identical forecasts.

use std::collections::BTreeSet;

use crate::config::ForecastConfig;
use crate::env::SceneOracle;
use crate::history::HistoryTracker;
use crate::state::{Actor, ActorId, EffectId, Seconds};

/// Healing contribution of one timed effect, derived per call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectEstimate {
    pub effect: EffectId,
    pub magnitude_per_tick: f32,
    pub remaining: Seconds,
    pub multiplier: f32,
}

impl EffectEstimate {
    /// Total healing this effect still delivers.
    pub fn amount(&self, tick_period: Seconds) -> f32 {
        if tick_period <= 0.0 || self.magnitude_per_tick <= 0.0 {
            return 0.0;
        }
        self.magnitude_per_tick * self.multiplier * (self.remaining.max(0.0) / tick_period)
    }
}

/// Forecast of one actor's health.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Forecast {
    pub actor: ActorId,
    pub current: f32,
    pub max_health: f32,
    pub predicted: f32,
    /// Observed damage per second.
    pub rate: f32,
    /// Damage expected within the horizon.
    pub incoming: f32,
    /// Healing still owed by timed effects.
    pub healing: f32,
    /// Healing per second delivered by timed effects.
    pub healing_rate: f32,
    pub lethal: bool,
    pub critical: bool,
}

impl Forecast {
    pub fn predicted_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.predicted / self.max_health).clamp(0.0, 1.0)
    }

    /// Health still missing at the horizon.
    pub fn deficit(&self) -> f32 {
        (self.max_health - self.predicted).max(0.0)
    }

    /// Lethal or critical.
    pub fn is_emergency(&self) -> bool {
        self.lethal || self.critical
    }
}

/// Health forecaster over one tick's history and scene.
pub struct ForecastModel<'a, S: SceneOracle + ?Sized> {
    config: &'a ForecastConfig,
    history: &'a HistoryTracker,
    scene: &'a S,
}

impl<'a, S: SceneOracle + ?Sized> ForecastModel<'a, S> {
    pub fn new(config: &'a ForecastConfig, history: &'a HistoryTracker, scene: &'a S) -> Self {
        Self {
            config,
            history,
            scene,
        }
    }

    pub fn horizon(&self) -> Seconds {
        self.config.horizon
    }

    /// Forecast at the configured default horizon.
    pub fn forecast(&self, actor: &Actor) -> Forecast {
        self.predict(actor, self.config.horizon)
    }

    /// Forecast of `actor` at `now + horizon`.
    pub fn predict(&self, actor: &Actor, horizon: Seconds) -> Forecast {
        let horizon = horizon.max(0.0);
        let current = if actor.alive { actor.health.max(0.0) } else { 0.0 };
        let rate = self.history.rate(actor.id);
        let incoming = self.incoming_damage_estimate(actor, horizon);
        let healing = if actor.alive {
            self.incoming_healing_estimate(actor)
        } else {
            0.0
        };

        let predicted = (current - incoming + healing).max(0.0);
        let healing_rate = if self.config.tick_period > 0.0 {
            actor
                .effects
                .iter()
                .filter(|effect| effect.magnitude_per_tick > 0.0 && effect.remaining > 0.0)
                .map(|effect| effect.magnitude_per_tick * effect.multiplier)
                .sum::<f32>()
                / self.config.tick_period
        } else {
            0.0
        };

        let mut forecast = Forecast {
            actor: actor.id,
            current,
            max_health: actor.max_health,
            predicted,
            rate,
            incoming,
            healing,
            healing_rate,
            lethal: predicted <= 0.0,
            critical: false,
        };
        forecast.critical = forecast.predicted_fraction() < self.config.critical_fraction;
        forecast
    }

    /// Damage expected within `horizon`: observed trend plus the scene's estimate.
    pub fn incoming_damage_estimate(&self, actor: &Actor, horizon: Seconds) -> f32 {
        let trend = self.history.rate(actor.id) * horizon.max(0.0);
        let scene = self.scene.incoming_damage(actor, horizon).max(0.0);
        trend + scene
    }

    /// Healing still owed to `actor` by its timed effects.
    pub fn incoming_healing_estimate(&self, actor: &Actor) -> f32 {
        let tick_period = self.config.tick_period;
        Self::effect_estimates(actor)
            .map(|estimate| estimate.amount(tick_period))
            .sum()
    }

    /// Live actors whose forecast is lethal or critical.
    pub fn emergencies(&self, actors: &[Actor]) -> BTreeSet<ActorId> {
        actors
            .iter()
            .filter(|actor| actor.alive)
            .filter(|actor| self.forecast(actor).is_emergency())
            .map(|actor| actor.id)
            .collect()
    }

    pub fn effect_estimates(actor: &Actor) -> impl Iterator<Item = EffectEstimate> + '_ {
        actor.effects.iter().map(|effect| EffectEstimate {
            effect: effect.id,
            magnitude_per_tick: effect.magnitude_per_tick,
            remaining: effect.remaining,
            multiplier: effect.multiplier,
        })
    }
}
