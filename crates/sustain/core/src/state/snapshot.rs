//! Per-tick snapshot handed to the controller.

use glam::Vec3;

use crate::action::ActionId;
use crate::state::{Actor, ActorId, ResourceGauge, Seconds};

/// A simple action the scene reports as currently executing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InFlightAction {
    pub action: ActionId,
    pub target: Option<ActorId>,
    /// Time until the action lands.
    pub remaining: Seconds,
}

/// Everything the engine may observe during one tick.
///
/// Timing and resource values that would otherwise be ambient globals are
/// explicit here, so a tick is a pure function of the snapshot plus the
/// controller's own history.
#[derive(Clone, Copy, Debug)]
pub struct TickSnapshot<'a> {
    pub now: Seconds,
    /// The controller's own actor.
    pub controller: ActorId,
    pub position: Vec3,
    /// Primary resource available for action costs.
    pub mana: f32,
    pub gauge: ResourceGauge,
    /// The controller must relocate soon.
    pub movement_required: bool,
    /// Time the controller can stand still.
    pub time_available: Seconds,
    pub actors: &'a [Actor],
    /// Action the scene reports as executing, if any.
    pub in_flight: Option<InFlightAction>,
    /// Candidate actions in the caller's preference order.
    pub options: &'a [ActionId],
    /// Caller override for the rank of the next multi-phase action.
    pub forced_rank: Option<u8>,
}

impl<'a> TickSnapshot<'a> {
    pub fn new(now: Seconds, controller: ActorId, position: Vec3, actors: &'a [Actor]) -> Self {
        Self {
            now,
            controller,
            position,
            mana: f32::INFINITY,
            gauge: ResourceGauge::default(),
            movement_required: false,
            time_available: f32::INFINITY,
            actors,
            in_flight: None,
            options: &[],
            forced_rank: None,
        }
    }

    pub fn with_options(mut self, options: &'a [ActionId]) -> Self {
        self.options = options;
        self
    }

    pub fn with_in_flight(mut self, in_flight: InFlightAction) -> Self {
        self.in_flight = Some(in_flight);
        self
    }

    pub fn with_mana(mut self, mana: f32) -> Self {
        self.mana = mana;
        self
    }

    pub fn with_gauge(mut self, gauge: ResourceGauge) -> Self {
        self.gauge = gauge;
        self
    }

    pub fn with_movement(mut self, time_available: Seconds) -> Self {
        self.movement_required = true;
        self.time_available = time_available;
        self
    }

    pub fn with_forced_rank(mut self, rank: u8) -> Self {
        self.forced_rank = Some(rank);
        self
    }

    pub fn actor(&self, id: ActorId) -> Option<&'a Actor> {
        self.actors.iter().find(|actor| actor.id == id)
    }

    pub fn live_actors(&self) -> impl Iterator<Item = &'a Actor> + use<'a> {
        let actors = self.actors;
        actors.iter().filter(|actor| actor.alive)
    }
}
