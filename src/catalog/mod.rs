//! Equipment catalogs: generator units and battery modules.

pub mod loader;
pub mod types;

pub use loader::{CatalogError, load_catalog, read_catalog};
pub use types::{BatterySpec, FuelType, GeneratorSpec};

/// kWh → J.
pub const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Generators and batteries loaded for one run. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    generators: Vec<GeneratorSpec>,
    batteries: Vec<BatterySpec>,
}

impl Catalog {
    /// Builds a catalog, grouping generators by fuel type.
    ///
    /// Generators keep their relative order within a fuel group; groups are
    /// ordered Diesel, Methanol, FuelCell, Hydrogen.
    pub fn new(mut generators: Vec<GeneratorSpec>, batteries: Vec<BatterySpec>) -> Self {
        generators.sort_by_key(|g| g.fuel_type);
        Self {
            generators,
            batteries,
        }
    }

    /// All generators in enumeration order.
    pub fn generators(&self) -> &[GeneratorSpec] {
        &self.generators
    }

    /// Generators burning the given fuel.
    pub fn generators_of(&self, fuel: FuelType) -> impl Iterator<Item = &GeneratorSpec> {
        self.generators.iter().filter(move |g| g.fuel_type == fuel)
    }

    /// Number of generators burning the given fuel.
    pub fn count_of(&self, fuel: FuelType) -> usize {
        self.generators_of(fuel).count()
    }

    pub fn batteries(&self) -> &[BatterySpec] {
        &self.batteries
    }
}
