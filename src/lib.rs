//! Batch preparation for marine hybrid powertrain simulation.
//!
//! Enumerates generator bay assignments and battery options, filters them
//! against vessel budgets and the duty-cycle peak, maps survivors onto
//! simulation parameters and hands the batch to a simulation service.

pub mod catalog;
pub mod cli;
pub mod config;
#[cfg(feature = "dispatch")]
pub mod dispatch;
pub mod duty_cycle;
pub mod error;
/// Plan export.
pub mod io {
    pub mod export;
}
pub mod logging;
/// Enumeration, feasibility and parameter mapping stages.
pub mod pipeline;
pub mod runner;

pub use error::{Error, Result};
