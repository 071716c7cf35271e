//! Scene oracle: the world queries the engine consumes each tick.

use glam::Vec3;

use crate::state::{Actor, Seconds};

/// Externally supplied danger zone.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HazardRegion {
    pub center: Vec3,
    pub radius: f32,
    /// Seconds until the region becomes dangerous; 0 when already active.
    pub time_until_active: Seconds,
}

impl HazardRegion {
    pub fn new(center: Vec3, radius: f32, time_until_active: Seconds) -> Self {
        Self {
            center,
            radius,
            time_until_active,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.center.distance(point) <= self.radius
    }
}

/// Read-only world queries.
pub trait SceneOracle {
    /// Damage the scene expects `actor` to take within `horizon` seconds.
    fn incoming_damage(&self, actor: &Actor, horizon: Seconds) -> f32;

    /// Whether a straight segment between the points is unobstructed.
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool;

    /// Currently known hazard regions.
    fn hazard_regions(&self) -> &[HazardRegion];
}
