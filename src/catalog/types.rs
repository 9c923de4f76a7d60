//! Generator and battery catalog records.

use std::fmt;

/// Fuel burned by a generator unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FuelType {
    Diesel,
    Methanol,
    FuelCell,
    /// Placeholder until hydrogen combustion units are characterised.
    Hydrogen,
}

impl FuelType {
    /// All fuel types in enumeration order.
    pub const ALL: [FuelType; 4] = [
        FuelType::Diesel,
        FuelType::Methanol,
        FuelType::FuelCell,
        FuelType::Hydrogen,
    ];

    /// Parses the fuel marker used in catalog files.
    ///
    /// Returns `None` for unknown markers so the loader can skip the row.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim() {
            "Diesel" => Some(Self::Diesel),
            "Methanol" => Some(Self::Methanol),
            "FC" => Some(Self::FuelCell),
            "Hydrogen" | "H2" => Some(Self::Hydrogen),
            _ => None,
        }
    }

    /// Catalog marker for this fuel type.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Diesel => "Diesel",
            Self::Methanol => "Methanol",
            Self::FuelCell => "FC",
            Self::Hydrogen => "Hydrogen",
        }
    }

    /// Single-letter code used in simulation names.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Diesel => "D",
            Self::Methanol => "M",
            Self::FuelCell => "F",
            Self::Hydrogen => "H",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// A generator unit (engine or fuel-cell module) available for a bay.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSpec {
    pub name: String,
    /// Rated maximum power (kW).
    pub p_max_kw: f64,
    /// Minimum (idle) power (kW).
    pub p_min_kw: f64,
    pub cost: f64,
    pub mass: f64,
    pub volume: f64,
    pub fuel_type: FuelType,
    /// Brake-specific fuel consumption curve, passed through untouched.
    pub bsfc: String,
    /// Fuel consumption curve, passed through untouched.
    pub fcc: String,
    pub db_index: String,
    pub retrofit_cost: f64,
}

impl GeneratorSpec {
    /// Creates a generator with empty curves and zero cost fields.
    ///
    /// Intended for fixtures and programmatic catalogs; the CSV loader
    /// fills every field explicitly.
    pub fn new(
        name: impl Into<String>,
        fuel_type: FuelType,
        p_max_kw: f64,
        mass: f64,
        volume: f64,
    ) -> Self {
        Self {
            name: name.into(),
            p_max_kw,
            p_min_kw: 0.0,
            cost: 0.0,
            mass,
            volume,
            fuel_type,
            bsfc: String::new(),
            fcc: String::new(),
            db_index: "default_eng_idx".to_string(),
            retrofit_cost: 0.0,
        }
    }
}

/// A battery module type. Configurations install it in integer counts.
#[derive(Debug, Clone, PartialEq)]
pub struct BatterySpec {
    pub name: String,
    /// Energy capacity of one module (kWh).
    pub capacity_kwh: f64,
    pub cost: f64,
    pub mass: f64,
    pub volume: f64,
    /// Nominal voltage (V).
    pub voltage: f64,
    /// Rated current (A).
    pub current: f64,
    pub max_c_rate: f64,
    /// Derived: `max_c_rate * current`.
    pub charge_rate: f64,
    /// Derived: `voltage * current` (W).
    pub max_charge_power: f64,
    pub db_index: String,
    pub abbreviation: String,
    pub cycle_limit: Option<f64>,
}

impl BatterySpec {
    /// Creates a battery and computes the derived charge rate and power.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        capacity_kwh: f64,
        cost: f64,
        mass: f64,
        volume: f64,
        voltage: f64,
        current: f64,
        max_c_rate: f64,
    ) -> Self {
        Self {
            name: name.into(),
            capacity_kwh,
            cost,
            mass,
            volume,
            voltage,
            current,
            max_c_rate,
            charge_rate: max_c_rate * current,
            max_charge_power: voltage * current,
            db_index: "DF_DB_IDX".to_string(),
            abbreviation: "DF_ABB".to_string(),
            cycle_limit: None,
        }
    }

    /// Capacity of one module in joules.
    pub fn capacity_joules(&self) -> f64 {
        self.capacity_kwh * super::JOULES_PER_KWH
    }
}
