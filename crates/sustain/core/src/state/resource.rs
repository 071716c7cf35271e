//! Secondary resource gauge.
//!
//! The gauge itself is owned by the scene; the engine only needs to know what
//! it will hold a short time from now.

use crate::state::Seconds;

/// Externally owned resource with linear regeneration.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceGauge {
    pub current: f32,
    pub maximum: f32,
    pub regen_per_second: f32,
}

impl ResourceGauge {
    pub fn new(current: f32, maximum: f32, regen_per_second: f32) -> Self {
        Self {
            current,
            maximum,
            regen_per_second,
        }
    }

    /// Value after `dt` seconds of regeneration, capped at the maximum.
    pub fn projected(&self, dt: Seconds) -> f32 {
        let regen = self.regen_per_second.max(0.0) * dt.max(0.0);
        (self.current + regen).min(self.maximum).max(0.0)
    }

    /// Whether `cost` can be paid after `dt` seconds.
    pub fn can_afford(&self, cost: f32, dt: Seconds) -> bool {
        cost <= 0.0 || self.projected(dt) >= cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regenerates_up_to_maximum() {
        let gauge = ResourceGauge::new(2.0, 5.0, 0.5);
        assert_eq!(gauge.projected(0.0), 2.0);
        assert_eq!(gauge.projected(2.0), 3.0);
        assert_eq!(gauge.projected(100.0), 5.0);
    }

    #[test]
    fn affordability_includes_regen() {
        let gauge = ResourceGauge::new(2.0, 5.0, 1.0);
        assert!(!gauge.can_afford(3.0, 0.0));
        assert!(gauge.can_afford(3.0, 1.0));
        assert!(gauge.can_afford(0.0, 0.0));
    }
}
