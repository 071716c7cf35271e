//! Snapshot-backed scene oracle.
//!
//! [`SceneSnapshot`] holds a frozen copy of the scene queries for one tick:
//! per-actor damage intake, spherical occluders and hazard regions. Hosts
//! without a live world query layer fill one per tick; tests build them by hand.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::env::{HazardRegion, SceneOracle};
use crate::path::geometry::segment_hits_sphere;
use crate::state::{Actor, ActorId, Seconds};

/// Sphere blocking line of sight.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occluder {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneSnapshot {
    /// Expected damage per second, by actor.
    damage_per_second: BTreeMap<ActorId, f32>,
    occluders: Vec<Occluder>,
    hazards: Vec<HazardRegion>,
}

impl SceneSnapshot {
    /// Open scene: no incoming damage, no occluders, no hazards.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damage_per_second(mut self, actor: ActorId, dps: f32) -> Self {
        self.damage_per_second.insert(actor, dps);
        self
    }

    pub fn with_occluder(mut self, center: Vec3, radius: f32) -> Self {
        self.occluders.push(Occluder { center, radius });
        self
    }

    pub fn with_hazard(mut self, hazard: HazardRegion) -> Self {
        self.hazards.push(hazard);
        self
    }

    pub fn set_damage_per_second(&mut self, actor: ActorId, dps: f32) {
        self.damage_per_second.insert(actor, dps);
    }
}

impl SceneOracle for SceneSnapshot {
    fn incoming_damage(&self, actor: &Actor, horizon: Seconds) -> f32 {
        let dps = self.damage_per_second.get(&actor.id).copied().unwrap_or(0.0);
        (dps * horizon).max(0.0)
    }

    fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        !self
            .occluders
            .iter()
            .any(|occluder| segment_hits_sphere(from, to, occluder.center, occluder.radius))
    }

    fn hazard_regions(&self) -> &[HazardRegion] {
        &self.hazards
    }
}
