//! Library-level batch run: load inputs, build the plan, export and send it.

use std::path::Path;

use tracing::info;

use crate::catalog::{Catalog, load_catalog};
use crate::config::{BatchConfig, ConfigError};
use crate::duty_cycle::{DutyCycle, DutyCycleSummary};
use crate::error::Result;
use crate::io::export::export_plan;
use crate::pipeline::{BatchPlan, Pipeline, PipelineInputs};

/// Catalog and duty-cycle summary read from the configured files.
#[derive(Debug, Clone)]
pub struct BatchInputs {
    pub catalog: Catalog,
    pub duty: DutyCycleSummary,
}

impl BatchInputs {
    /// Reads the catalog and duty cycle named in `cfg.inputs`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] when either path is unset, and the
    /// catalog or duty-cycle error when a file cannot be read.
    pub fn load(cfg: &BatchConfig) -> Result<Self> {
        let catalog_path = cfg.inputs.catalog.as_deref().ok_or_else(|| {
            ConfigError::new("inputs.catalog", "no catalog given; pass --catalog")
        })?;
        let duty_path = cfg.inputs.duty_cycle.as_deref().ok_or_else(|| {
            ConfigError::new("inputs.duty_cycle", "no duty cycle given; pass --duty-cycle")
        })?;

        let catalog = load_catalog(catalog_path)?;
        let duty = DutyCycle::from_path(duty_path)?.summary(cfg.inputs.power_scale);
        info!(
            start = ?duty.start_time,
            stop = ?duty.end_time,
            peak_kw = ?duty.max_power,
            "duty cycle summarised"
        );
        Ok(Self { catalog, duty })
    }
}

/// Runs the pipeline over loaded inputs with the configured factors.
///
/// # Arguments
///
/// * `cfg` - Vessel limits and enumeration factors
/// * `inputs` - Catalog and duty-cycle summary the plan borrows from
///
/// # Errors
///
/// Returns [`crate::Error::Pipeline`] when a precondition fails, such as an
/// empty fuel group or a duty cycle without samples.
pub fn build_plan<'a>(cfg: &'a BatchConfig, inputs: &'a BatchInputs) -> Result<BatchPlan<'a>> {
    let e = &cfg.enumeration;
    let pipeline = Pipeline::new(PipelineInputs {
        catalog: &inputs.catalog,
        limits: cfg.vessel.limits(),
        peak_power_kw: inputs.duty.max_power,
        bay_count: e.bay_count,
        battery_counts: &e.battery_counts,
        lower_thresholds: &e.lower_thresholds,
        upper_thresholds: &e.upper_thresholds,
    })?;
    Ok(pipeline.run())
}

/// Writes the plan CSV.
///
/// # Errors
///
/// Returns [`crate::Error::Export`] if the file cannot be written.
pub fn write_plan_file(plan: &BatchPlan<'_>, path: &Path) -> Result<()> {
    export_plan(plan, path)?;
    info!(path = %path.display(), rows = plan.sets.len(), "plan written");
    Ok(())
}

/// Uploads the model (unless `skip_upload` or no model file is set) and
/// dispatches the plan, returning the service's reply.
///
/// # Errors
///
/// Returns [`crate::Error::Dispatch`] when the upload or the batch fails
/// after retries.
#[cfg(feature = "dispatch")]
pub async fn send_plan(
    cfg: &BatchConfig,
    plan: &BatchPlan<'_>,
    duty: &DutyCycleSummary,
    skip_upload: bool,
) -> Result<serde_json::Value> {
    use crate::dispatch::{BatchDispatcher, BatchRequest, HttpDispatcher};

    let model_name = cfg.model.resolved_name();
    let request = BatchRequest::from_plan(
        plan,
        duty,
        model_name.as_str(),
        cfg.vessel.name.as_str(),
        cfg.vessel.task.as_str(),
    );
    let dispatcher = HttpDispatcher::new(
        cfg.dispatch.base_url.as_str(),
        cfg.dispatch.timeout(),
        cfg.dispatch.retry_policy(),
    )?;

    match (&cfg.model.path, skip_upload) {
        (Some(path), false) => {
            dispatcher.upload_model_file(&model_name, path).await?;
        }
        (Some(_), true) => info!("model upload skipped"),
        (None, _) => {}
    }
    let reply = dispatcher.dispatch(&request).await?;
    info!(combinations = request.len(), "batch accepted");
    Ok(reply)
}
