//! CSV export of a batch plan.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::pipeline::{BatchPlan, MappedParameterSet};

/// Column header for the plan CSV.
const HEADER: &str = "index,sim_name,sequence,battery,battery_count,mass,volume,\
                      rated_power_kw,battery_power,total_cost,retrofit_cost,\
                      within_budget,parameters";

/// Exports a plan to a CSV file at the given path.
///
/// Writes a header row followed by one row per mapped configuration, in
/// plan order. Produces identical output for identical plans.
///
/// # Errors
///
/// Returns a `csv::Error` if file creation or writing fails.
pub fn export_plan(plan: &BatchPlan<'_>, path: &Path) -> csv::Result<()> {
    let file = File::create(path)?;
    write_plan(&plan.sets, io::BufWriter::new(file))
}

/// Writes mapped configurations as CSV to any writer.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_plan(sets: &[MappedParameterSet<'_>], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for (i, set) in sets.iter().enumerate() {
        let config = set.config();
        let parameters = set
            .parameters
            .iter()
            .map(|p| format!("{}={}", p.param, p.value))
            .collect::<Vec<_>>()
            .join(";");
        wtr.write_record(&[
            i.to_string(),
            config.sim_name(),
            config.describe(),
            config.battery.name.clone(),
            config.battery_count.to_string(),
            format!("{:.3}", config.slots.total_mass()),
            format!("{:.3}", config.slots.total_volume()),
            format!("{:.3}", config.slots.rated_power_kw()),
            format!("{:.3}", config.battery_power()),
            format!("{:.2}", config.total_cost()),
            format!("{:.2}", config.retrofit_cost()),
            set.source.within_budget.to_string(),
            parameters,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
