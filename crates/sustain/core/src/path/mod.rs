//! Positional path search.
//!
//! Enumerates directed segments from an origin, `headings` evenly spaced
//! directions on the ground plane times lengths from `min_length` to the
//! action's `max_length` in `length_step` increments. Enumeration order is
//! heading first, then length ascending; among equal scores the first candidate
//! seen wins.
//!
//! ```text
//! score = coverage_weight × |covered|
//!       + Σ tier bonus(covered)
//!       + tank bonus × |covered tanks below tank_fraction|
//!       − hazard_weight × hazard_proximity
//!       − length_weight × length
//! ```
pub mod geometry;

use glam::Vec3;

use crate::config::PathConfig;
use crate::env::{HazardRegion, SceneOracle};
use crate::state::{Actor, ActorId, Role};

use self::geometry::{distance_to_segment, heading_direction, ray_offsets};

/// One actor covered by a candidate segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coverage {
    pub actor: ActorId,
    /// Distance from the origin along the segment.
    pub along: f32,
    /// Perpendicular distance from the segment.
    pub lateral: f32,
    pub fraction: f32,
}

/// An accepted (heading, length) candidate and its score.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidatePath {
    pub origin: Vec3,
    /// Heading index in `0..headings`.
    pub heading: u16,
    pub direction: Vec3,
    pub length: f32,
    pub terminal: Vec3,
    pub covered: Vec<Coverage>,
    pub hazard_proximity: f32,
    pub score: f32,
}

impl CandidatePath {
    pub fn coverage(&self) -> usize {
        self.covered.len()
    }
}

/// Path search over one tick's actors and scene.
pub struct PathSearch<'a, S: SceneOracle + ?Sized> {
    config: &'a PathConfig,
    scene: &'a S,
    actors: &'a [Actor],
    exclude: Option<ActorId>,
}

impl<'a, S: SceneOracle + ?Sized> PathSearch<'a, S> {
    pub fn new(config: &'a PathConfig, scene: &'a S, actors: &'a [Actor]) -> Self {
        Self {
            config,
            scene,
            actors,
            exclude: None,
        }
    }

    /// Leaves `actor` out of coverage, typically the controller itself.
    pub fn excluding(mut self, actor: ActorId) -> Self {
        self.exclude = Some(actor);
        self
    }

    fn candidates(&self) -> impl Iterator<Item = &'a Actor> + use<'a, S> {
        let exclude = self.exclude;
        self.actors
            .iter()
            .filter(move |actor| actor.alive && Some(actor.id) != exclude)
    }

    /// Cheap pre-check: enough injured actors within reach of `origin` to make
    /// a full search worthwhile.
    pub fn opportunity(&self, origin: Vec3, max_length: f32) -> bool {
        let reach = max_length + self.config.half_width;
        let injured = self
            .candidates()
            .filter(|actor| actor.health_fraction() < self.config.opportunity_fraction)
            .filter(|actor| actor.distance_to(origin) <= reach)
            .count();
        injured >= self.config.min_coverage.max(1)
    }

    /// Best accepted candidate with at least `min_coverage` covered actors.
    pub fn find_best_path(&self, origin: Vec3, max_length: f32) -> Option<CandidatePath> {
        if self.candidates().next().is_none() {
            return None;
        }

        let mut best: Option<CandidatePath> = None;
        let mut evaluated = 0usize;
        for heading in 0..self.config.headings {
            for length in self.lengths(max_length) {
                let Some(candidate) = self.evaluate(origin, heading, length) else {
                    continue;
                };
                evaluated += 1;
                if candidate.coverage() < self.config.min_coverage {
                    continue;
                }
                if best.as_ref().is_none_or(|current| candidate.score > current.score) {
                    best = Some(candidate);
                }
            }
        }

        match &best {
            Some(path) => tracing::debug!(
                "PathSearch: best heading={} length={} covered={} score={} ({} evaluated)",
                path.heading,
                path.length,
                path.coverage(),
                path.score,
                evaluated
            ),
            None => tracing::debug!("PathSearch: no eligible path ({} evaluated)", evaluated),
        }
        best
    }

    /// Scores one (heading, length) pair, or `None` when it is occluded or ends
    /// inside a hazard.
    pub fn evaluate(&self, origin: Vec3, heading: u16, length: f32) -> Option<CandidatePath> {
        let direction = heading_direction(heading, self.config.headings);
        let terminal = origin + direction * length;

        if !self.scene.line_of_sight(origin, terminal) {
            tracing::trace!("PathSearch: heading={} length={} occluded", heading, length);
            return None;
        }
        if self.hazards().any(|region| region.contains(terminal)) {
            tracing::trace!("PathSearch: heading={} length={} ends in hazard", heading, length);
            return None;
        }

        let covered: Vec<Coverage> = self
            .candidates()
            .filter_map(|actor| {
                let (along, lateral) = ray_offsets(origin, direction, actor.position);
                let inside = (0.0..=length).contains(&along) && lateral <= self.config.half_width;
                inside.then(|| Coverage {
                    actor: actor.id,
                    along,
                    lateral,
                    fraction: actor.health_fraction(),
                })
            })
            .collect();

        let hazard_proximity = self.hazard_proximity(origin, terminal);
        let score = self.score(&covered, hazard_proximity, length);
        Some(CandidatePath {
            origin,
            heading,
            direction,
            length,
            terminal,
            covered,
            hazard_proximity,
            score,
        })
    }

    fn score(&self, covered: &[Coverage], hazard_proximity: f32, length: f32) -> f32 {
        let config = self.config;
        let bonuses: f32 = covered
            .iter()
            .map(|coverage| {
                let tier = config
                    .tiers
                    .iter()
                    .find(|tier| coverage.fraction < tier.below)
                    .map_or(0.0, |tier| tier.bonus);
                let tank = self
                    .actors
                    .iter()
                    .find(|actor| actor.id == coverage.actor)
                    .filter(|actor| actor.role == Role::Tank)
                    .filter(|_| coverage.fraction < config.tank_fraction)
                    .map_or(0.0, |_| config.tank_bonus);
                tier + tank
            })
            .sum();

        config.coverage_weight * covered.len() as f32 + bonuses
            - config.hazard_weight * hazard_proximity
            - config.length_weight * length
    }

    /// Regions active within the lookahead.
    fn hazards(&self) -> impl Iterator<Item = &'a HazardRegion> + use<'a, S> {
        let lookahead = self.config.hazard_lookahead;
        let scene = self.scene;
        scene
            .hazard_regions()
            .iter()
            .filter(move |region| region.time_until_active <= lookahead)
    }

    /// 1 when the segment touches a hazard, falling to 0 at `hazard_margin`
    /// clearance from the nearest region edge.
    pub fn hazard_proximity(&self, origin: Vec3, terminal: Vec3) -> f32 {
        let margin = self.config.hazard_margin;
        self.hazards()
            .map(|region| {
                let clearance = distance_to_segment(origin, terminal, region.center) - region.radius;
                if margin <= 0.0 {
                    return if clearance <= 0.0 { 1.0 } else { 0.0 };
                }
                (1.0 - clearance / margin).clamp(0.0, 1.0)
            })
            .fold(0.0, f32::max)
    }

    fn lengths(&self, max_length: f32) -> impl Iterator<Item = f32> + use<S> {
        let min = self.config.min_length;
        let step = self.config.length_step;
        let count = if !max_length.is_finite() || max_length < min {
            0
        } else if step > 0.0 {
            ((max_length - min) / step + 1e-4).floor() as usize + 1
        } else {
            1
        };
        (0..count).map(move |i| min + step * i as f32)
    }
}
