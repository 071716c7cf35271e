//! Tracked actors and their timed effects.

use arrayvec::ArrayVec;
use bitflags::bitflags;
use glam::Vec3;

use crate::config::SustainConfig;
use crate::state::{ActorId, Seconds};

/// Role tag used to weight an actor's priority.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    /// Absorbs incoming damage for the group.
    Tank,
    /// Another support controller.
    Support,
    /// Any other group member.
    #[default]
    Damage,
    /// The controller's own actor.
    #[strum(serialize = "self")]
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    Myself,
}

bitflags! {
    /// Environmental dangers currently affecting an actor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HazardFlags: u8 {
        const STANDING_IN_FIRE = 1 << 0;
        const DEBUFFED         = 1 << 1;
        const TARGETED         = 1 << 2;
        const FIXATED          = 1 << 3;
    }
}

/// Identifier of a timed effect as reported by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u32);

/// A periodic effect ticking on an actor.
///
/// Positive magnitudes heal; non-positive magnitudes are ignored by the
/// forecast (damage over time reaches it through the damage rate instead).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedEffect {
    pub id: EffectId,
    pub remaining: Seconds,
    pub magnitude_per_tick: f32,
    /// Scene-side amplification (1.0 when none).
    pub multiplier: f32,
}

impl TimedEffect {
    pub fn new(id: EffectId, remaining: Seconds, magnitude_per_tick: f32) -> Self {
        Self {
            id,
            remaining,
            magnitude_per_tick,
            multiplier: 1.0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }
}

/// Bounded set of active effects on one actor.
pub type ActorEffects = ArrayVec<TimedEffect, { SustainConfig::MAX_EFFECTS }>;

/// One actor as observed this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    pub position: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub role: Role,
    pub alive: bool,
    pub effects: ActorEffects,
    pub hazards: HazardFlags,
}

impl Actor {
    /// Creates a live actor at full health with no effects.
    pub fn new(id: ActorId, role: Role, position: Vec3, max_health: f32) -> Self {
        Self {
            id,
            position,
            health: max_health,
            max_health,
            role,
            alive: true,
            effects: ArrayVec::new(),
            hazards: HazardFlags::empty(),
        }
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    pub fn with_hazards(mut self, hazards: HazardFlags) -> Self {
        self.hazards = hazards;
        self
    }

    pub fn with_effect(mut self, effect: TimedEffect) -> Self {
        if !self.effects.is_full() {
            self.effects.push(effect);
        }
        self
    }

    pub fn dead(mut self) -> Self {
        self.alive = false;
        self.health = 0.0;
        self
    }

    /// Current health as a fraction of maximum, clamped to `[0, 1]`.
    ///
    /// An actor with no maximum health reports 0.
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Missing health, never negative.
    pub fn deficit(&self) -> f32 {
        (self.max_health - self.health).max(0.0)
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}
