//! Feasibility stages.
//!
//! The two stages dispose of configurations differently: the mass/volume
//! stage only annotates, while the power stage drops configurations that
//! cannot cover the duty-cycle peak. Neither counts the battery.

use super::enumerate::PowertrainConfig;

/// Vessel mass and volume budget for the generator bays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselLimits {
    pub weight_limit: f64,
    pub volume_limit: f64,
}

impl VesselLimits {
    /// `true` when the occupied bays fit within both budgets (inclusive).
    pub fn admits(&self, config: &PowertrainConfig<'_>) -> bool {
        config.slots.total_mass() <= self.weight_limit
            && config.slots.total_volume() <= self.volume_limit
    }
}

/// A configuration carrying the mass/volume verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotated<'a> {
    pub config: PowertrainConfig<'a>,
    pub within_budget: bool,
}

/// Mass/volume stage: attaches the budget verdict, never removes.
///
/// # Arguments
///
/// * `config` - Candidate to annotate, moved into the result
/// * `limits` - Vessel weight and volume budgets (inclusive)
///
/// # Returns
///
/// The same configuration with `within_budget` set. Only occupied bays are
/// summed; battery mass and volume are ignored.
pub fn annotate_budget<'a>(config: PowertrainConfig<'a>, limits: &VesselLimits) -> Annotated<'a> {
    let within_budget = limits.admits(&config);
    Annotated {
        config,
        within_budget,
    }
}

/// Outcome of the power-capability stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerVerdict {
    Kept,
    Dropped,
}

impl PowerVerdict {
    pub fn is_kept(self) -> bool {
        self == Self::Kept
    }
}

/// Power-capability stage: keeps a configuration only if its generators'
/// summed rated power strictly exceeds `peak_kw`.
///
/// # Arguments
///
/// * `config` - Candidate to judge
/// * `peak_kw` - Duty-cycle peak power (kW), already scaled
///
/// # Returns
///
/// [`PowerVerdict::Kept`] or [`PowerVerdict::Dropped`]. Batteries do not
/// count towards the rated power, and a configuration exactly at the peak
/// is dropped.
pub fn power_verdict(config: &PowertrainConfig<'_>, peak_kw: f64) -> PowerVerdict {
    if config.slots.rated_power_kw() > peak_kw {
        PowerVerdict::Kept
    } else {
        PowerVerdict::Dropped
    }
}
