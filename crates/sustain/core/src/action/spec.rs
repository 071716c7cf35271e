//! Static action descriptors supplied by the action catalog.

use std::fmt;

use arrayvec::ArrayVec;

use crate::action::strategy::{CountMatched, DeficitSteps, PhaseStrategy};
use crate::config::SustainConfig;
use crate::state::Seconds;

/// Catalog identifier of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u32);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action:{}", self.0)
    }
}

/// How an action is executed, which decides the component that handles it.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionFamily {
    /// Single-target action, optionally with a cast time.
    Instant,
    /// Channeled action escalating through ranks before release.
    MultiPhase,
    /// Directed segment through the scene, healing every actor it crosses.
    Positional,
}

/// Rank decision rule of a multi-phase action.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RankStrategyKind {
    /// One rank per average-deficit threshold reached (percent of max health).
    DeficitSteps {
        thresholds: ArrayVec<f32, { SustainConfig::MAX_THRESHOLDS }>,
    },
    /// Smallest rank whose target cap covers the injured targets.
    CountMatched,
}

/// Phase table of a multi-phase action.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseProfile {
    /// Duration of each phase; the length is the action's maximum rank.
    pub durations: ArrayVec<Seconds, { SustainConfig::MAX_PHASES }>,
    /// Effect multiplier at each rank.
    #[cfg_attr(feature = "serde", serde(default))]
    pub multipliers: ArrayVec<f32, { SustainConfig::MAX_PHASES }>,
    /// Number of targets affected at each rank.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_caps: ArrayVec<u8, { SustainConfig::MAX_PHASES }>,
    pub strategy: RankStrategyKind,
}

impl PhaseProfile {
    /// Uniform phase table with the deficit-step rule at 20/40/60 percent.
    pub fn uniform(max_rank: u8, phase_duration: Seconds) -> Self {
        let ranks = usize::from(max_rank).clamp(1, SustainConfig::MAX_PHASES);
        Self {
            durations: (0..ranks).map(|_| phase_duration).collect(),
            multipliers: ArrayVec::new(),
            target_caps: ArrayVec::new(),
            strategy: RankStrategyKind::DeficitSteps {
                thresholds: [20.0, 40.0, 60.0].into_iter().collect(),
            },
        }
    }

    pub fn with_strategy(mut self, strategy: RankStrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_target_caps(mut self, caps: &[u8]) -> Self {
        self.target_caps = caps.iter().copied().take(SustainConfig::MAX_PHASES).collect();
        self
    }

    pub fn max_rank(&self) -> u8 {
        self.durations.len() as u8
    }

    /// Effect multiplier at `rank`, 1.0 when the table does not list one.
    pub fn multiplier(&self, rank: u8) -> f32 {
        rank.checked_sub(1)
            .and_then(|index| self.multipliers.get(usize::from(index)))
            .copied()
            .unwrap_or(1.0)
    }

    /// Instantiates the rank rule named by this profile's tag.
    pub fn strategy(&self) -> Box<dyn PhaseStrategy + '_> {
        match &self.strategy {
            RankStrategyKind::DeficitSteps { thresholds } => {
                Box::new(DeficitSteps::new(self, thresholds))
            }
            RankStrategyKind::CountMatched => Box::new(CountMatched::new(self)),
        }
    }
}

/// Static descriptor of one catalog action.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionSpec {
    pub id: ActionId,
    pub name: String,
    pub family: ActionFamily,
    /// Primary resource cost.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: f32,
    /// Secondary gauge cost.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gauge_cost: f32,
    /// Maximum target distance; 0 uses the configured default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: f32,
    /// Expected healing on the primary target at rank 1.
    #[cfg_attr(feature = "serde", serde(default))]
    pub magnitude: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cast_time: Seconds,
    /// Present for multi-phase actions only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub phases: Option<PhaseProfile>,
    /// Longest segment a positional action may cover.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_length: f32,
}

impl ActionSpec {
    pub fn instant(id: ActionId, name: impl Into<String>, magnitude: f32) -> Self {
        Self {
            id,
            name: name.into(),
            family: ActionFamily::Instant,
            cost: 0.0,
            gauge_cost: 0.0,
            range: 0.0,
            magnitude,
            cast_time: 0.0,
            phases: None,
            max_length: 0.0,
        }
    }

    pub fn multi_phase(id: ActionId, name: impl Into<String>, phases: PhaseProfile) -> Self {
        Self {
            family: ActionFamily::MultiPhase,
            phases: Some(phases),
            ..Self::instant(id, name, 0.0)
        }
    }

    pub fn positional(id: ActionId, name: impl Into<String>, max_length: f32) -> Self {
        Self {
            family: ActionFamily::Positional,
            max_length,
            ..Self::instant(id, name, 0.0)
        }
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_gauge_cost(mut self, gauge_cost: f32) -> Self {
        self.gauge_cost = gauge_cost;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn with_cast_time(mut self, cast_time: Seconds) -> Self {
        self.cast_time = cast_time;
        self
    }

    /// Expected healing on the primary target when executed at `rank`.
    ///
    /// Actions without a phase table always project their base magnitude.
    pub fn projected_effect(&self, rank: u8) -> f32 {
        let multiplier = self
            .phases
            .as_ref()
            .map_or(1.0, |profile| profile.multiplier(rank));
        self.magnitude * multiplier
    }
}
