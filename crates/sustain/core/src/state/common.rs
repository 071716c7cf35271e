use std::fmt;

/// Simulation time and durations, in seconds.
pub type Seconds = f32;

/// Stable identifier of a tracked actor.
///
/// Ordering is significant: equal-priority candidates are resolved in favour
/// of the lowest id so selections are reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
