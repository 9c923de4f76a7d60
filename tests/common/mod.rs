//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use powertrain_batch::catalog::{BatterySpec, Catalog, FuelType, GeneratorSpec};
use powertrain_batch::pipeline::{PipelineInputs, VesselLimits};

/// Round-trip catalog: one diesel, one methanol, one battery, plus a row
/// the loader must skip.
pub const ROUND_TRIP_CATALOG: &str = "name,p_max,p_min,cost,mass,volume,fuel,bsfc,fcc,db_index,retrofit,\
bat_name,capacity,cost,mass,volume,voltage,current,c_rate,db_index,abb,cycles
D500,500,50,1000,10,5,Diesel,,,E1,0,B100,100,0,1,1,400,50,1,B1,LFP,
Mystery,400,40,900,9,4,LNG,,,,,,,,,,,,,,,
M300,300,30,800,8,4,Methanol,,,E2,0
";

/// Duty cycle peaking at 600 kW over one hour.
pub const ROUND_TRIP_DUTY_CYCLE: &str = "#1\ndouble dutyCycle(4,2)\n0 200\n1200 600\n2400 450\n3600 100\n";

/// Round-trip catalog built in memory.
pub fn round_trip_catalog() -> Catalog {
    Catalog::new(
        vec![
            GeneratorSpec::new("D500", FuelType::Diesel, 500.0, 10.0, 5.0),
            GeneratorSpec::new("M300", FuelType::Methanol, 300.0, 8.0, 4.0),
        ],
        vec![BatterySpec::new("B100", 100.0, 0.0, 1.0, 1.0, 400.0, 50.0, 1.0)],
    )
}

/// Round-trip pipeline inputs: two bays, counts {0, 1}, limits 20/10, peak 600.
pub fn round_trip_inputs(catalog: &Catalog) -> PipelineInputs<'_> {
    PipelineInputs {
        catalog,
        limits: VesselLimits {
            weight_limit: 20.0,
            volume_limit: 10.0,
        },
        peak_power_kw: Some(600.0),
        bay_count: 2,
        battery_counts: &[0, 1],
        lower_thresholds: &[0.05],
        upper_thresholds: &[0.9],
    }
}

/// Writes `contents` to `name` inside `dir` and returns the path.
pub fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture should be writable");
    path
}
