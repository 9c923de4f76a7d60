//! Enumerate → filter → map pipeline.
//!
//! Every stage is a lazy iterator; a run streams candidates through the
//! budget annotation and power filter straight into the mapper, so only
//! survivors are ever held in memory.

pub mod enumerate;
pub mod feasibility;
pub mod mapping;
pub mod slots;

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{BatterySpec, Catalog, FuelType};

pub use enumerate::{Candidates, PowertrainConfig};
pub use feasibility::{Annotated, PowerVerdict, VesselLimits, annotate_budget, power_verdict};
pub use mapping::{MappedParameterSet, Parameter, ParameterMapper};
pub use slots::{SlotAssignment, SlotOption, SlotSequences};

/// Preconditions that stop a run before enumeration starts.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("catalog has no {0} entries")]
    EmptyCatalog(&'static str),
    #[error("bay count must be at least 1")]
    NoBays,
    #[error("no {0} candidates configured")]
    NoCandidates(&'static str),
    #[error("duty cycle has no power samples; peak power is unknown")]
    MissingPeakPower,
}

/// Everything one run needs, passed explicitly.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInputs<'a> {
    pub catalog: &'a Catalog,
    pub limits: VesselLimits,
    /// Duty-cycle peak power (kW); `None` when the duty cycle was empty.
    pub peak_power_kw: Option<f64>,
    pub bay_count: usize,
    pub battery_counts: &'a [u32],
    pub lower_thresholds: &'a [f64],
    pub upper_thresholds: &'a [f64],
}

/// Stage counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Candidates produced by the enumerator.
    pub enumerated: u64,
    /// Candidates the budget stage flagged as fitting.
    pub within_budget: u64,
    /// Candidates that passed the power stage.
    pub power_capable: u64,
}

/// Mapped survivors of one run.
#[derive(Debug, Clone)]
pub struct BatchPlan<'a> {
    pub bay_count: usize,
    pub sets: Vec<MappedParameterSet<'a>>,
    pub stats: PipelineStats,
}

/// A validated pipeline over borrowed catalog data.
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    options: Vec<SlotOption<'a>>,
    batteries: &'a [BatterySpec],
    battery_counts: &'a [u32],
    bay_count: usize,
    limits: VesselLimits,
    peak_kw: f64,
    mapper: ParameterMapper,
}

impl<'a> Pipeline<'a> {
    /// Checks preconditions and prepares the slot options.
    ///
    /// # Errors
    ///
    /// Returns a `PipelineError` when the diesel, methanol or battery
    /// catalog is empty, when there are no bays, thresholds or battery
    /// counts, or when the peak power is unknown.
    pub fn new(inputs: PipelineInputs<'a>) -> Result<Self, PipelineError> {
        let catalog = inputs.catalog;
        if catalog.count_of(FuelType::Diesel) == 0 {
            return Err(PipelineError::EmptyCatalog("diesel generator"));
        }
        if catalog.count_of(FuelType::Methanol) == 0 {
            return Err(PipelineError::EmptyCatalog("methanol generator"));
        }
        if catalog.batteries().is_empty() {
            return Err(PipelineError::EmptyCatalog("battery"));
        }
        if inputs.bay_count == 0 {
            return Err(PipelineError::NoBays);
        }
        if inputs.battery_counts.is_empty() {
            return Err(PipelineError::NoCandidates("battery count"));
        }
        if inputs.lower_thresholds.is_empty() {
            return Err(PipelineError::NoCandidates("lower threshold"));
        }
        if inputs.upper_thresholds.is_empty() {
            return Err(PipelineError::NoCandidates("upper threshold"));
        }
        let peak_kw = inputs.peak_power_kw.ok_or(PipelineError::MissingPeakPower)?;

        let options = SlotOption::cross(
            catalog.generators(),
            inputs.lower_thresholds,
            inputs.upper_thresholds,
        );

        Ok(Self {
            options,
            batteries: catalog.batteries(),
            battery_counts: inputs.battery_counts,
            bay_count: inputs.bay_count,
            limits: inputs.limits,
            peak_kw,
            mapper: ParameterMapper::new(inputs.bay_count),
        })
    }

    /// Expected enumerator output size, or `None` if it overflows `u128`.
    pub fn candidate_count(&self) -> Option<u128> {
        let per_assignment = (self.batteries.len() * self.battery_counts.len()) as u128;
        SlotSequences::total(self.options.len(), self.bay_count)?.checked_mul(per_assignment)
    }

    /// Fresh slot-sequence iterator.
    pub fn assignments(&self) -> SlotSequences<'_, 'a> {
        SlotSequences::new(&self.options, self.bay_count)
    }

    /// Fresh candidate iterator.
    pub fn candidates(&self) -> Candidates<'_, 'a> {
        Candidates::new(self.assignments(), self.batteries, self.battery_counts)
    }

    /// Annotated candidates that pass the power stage, lazily.
    ///
    /// Items borrow the catalog, not the pipeline.
    pub fn survivors(&self) -> impl Iterator<Item = Annotated<'a>> + Clone + '_ {
        self.candidates()
            .map(|c| annotate_budget(c, &self.limits))
            .filter(|a| power_verdict(&a.config, self.peak_kw).is_kept())
    }

    /// Mapped survivors, lazily.
    pub fn mapped(&self) -> impl Iterator<Item = MappedParameterSet<'a>> + Clone + '_ {
        self.survivors().map(|a| self.mapper.map(a))
    }

    /// Runs every stage in one pass and collects the mapped survivors.
    ///
    /// The plan borrows only the catalog, so the pipeline may be a temporary.
    pub fn run(&self) -> BatchPlan<'a> {
        info!(
            slot_options = self.options.len(),
            bays = self.bay_count,
            expected = ?self.candidate_count(),
            peak_kw = self.peak_kw,
            "enumerating powertrain candidates"
        );

        let mut stats = PipelineStats::default();
        let mut sets = Vec::new();
        for candidate in self.candidates() {
            stats.enumerated += 1;
            let annotated = annotate_budget(candidate, &self.limits);
            if annotated.within_budget {
                stats.within_budget += 1;
            }
            if !power_verdict(&annotated.config, self.peak_kw).is_kept() {
                continue;
            }
            stats.power_capable += 1;
            debug!(config = %annotated.config.sim_name(), "candidate kept");
            sets.push(self.mapper.map(annotated));
        }

        info!(
            enumerated = stats.enumerated,
            within_budget = stats.within_budget,
            power_capable = stats.power_capable,
            "pipeline finished"
        );
        BatchPlan {
            bay_count: self.bay_count,
            sets,
            stats,
        }
    }
}
