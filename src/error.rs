//! Crate-level error.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::duty_cycle::DutyCycleError;
use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    DutyCycle(#[from] DutyCycleError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("plan export failed: {0}")]
    Export(#[from] csv::Error),
    #[cfg(feature = "dispatch")]
    #[error(transparent)]
    Dispatch(#[from] crate::dispatch::DispatchError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
