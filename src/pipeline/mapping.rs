//! Translation of configurations into simulator parameter overrides.
//!
//! Parameter order is fixed: bays ascending, each bay's block complete before
//! the next, battery parameters last.

use serde::Serialize;

use crate::catalog::FuelType;

use super::enumerate::PowertrainConfig;
use super::feasibility::Annotated;

/// kW → W.
pub const WATTS_PER_KW: f64 = 1000.0;

/// Battery power emitted when no battery is installed. The simulator's
/// controller divides by this value, so it must stay non-zero.
pub const NO_BATTERY_POWER_PLACEHOLDER: f64 = 1.0;

/// Simulator battery component name.
const BATTERY: &str = "battery1";

/// Physical constants the simulator needs for a fuel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelProperties {
    /// Density (kg/m³).
    pub density: f64,
    /// Lower heating value (J/kg).
    pub lower_heating_value: f64,
    /// CO₂ emitted per mass of fuel burned (t CO₂ / t fuel).
    pub co2_factor: f64,
}

pub const DIESEL: FuelProperties = FuelProperties {
    density: 832.0,
    lower_heating_value: 42.7e6,
    co2_factor: 3.206,
};

pub const METHANOL: FuelProperties = FuelProperties {
    density: 791.0,
    lower_heating_value: 19.9e6,
    co2_factor: 1.375,
};

/// Provisional: reuses diesel values until hydrogen units are characterised.
pub const HYDROGEN_PROVISIONAL: FuelProperties = DIESEL;

impl FuelProperties {
    /// Constants used for a generator's fuel. Fuel cells run on hydrogen.
    pub fn for_fuel(fuel: FuelType) -> Self {
        match fuel {
            FuelType::Diesel => DIESEL,
            FuelType::Methanol => METHANOL,
            FuelType::FuelCell | FuelType::Hydrogen => HYDROGEN_PROVISIONAL,
        }
    }
}

/// One named simulation parameter override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub param: String,
    pub value: String,
}

impl Parameter {
    fn new(param: impl Into<String>, value: impl ToString) -> Self {
        Self {
            param: param.into(),
            value: value.to_string(),
        }
    }
}

/// A surviving configuration with its ordered simulator parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedParameterSet<'a> {
    pub source: Annotated<'a>,
    pub parameters: Vec<Parameter>,
}

impl<'a> MappedParameterSet<'a> {
    pub fn config(&self) -> &PowertrainConfig<'a> {
        &self.source.config
    }

    /// Looks up a parameter value by name.
    pub fn get(&self, param: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.param == param)
            .map(|p| p.value.as_str())
    }
}

/// Maps configurations onto a model with a fixed number of generator bays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterMapper {
    bay_count: usize,
}

impl ParameterMapper {
    pub fn new(bay_count: usize) -> Self {
        Self { bay_count }
    }

    /// Builds the parameter list for one configuration.
    ///
    /// Each occupied bay `i` emits `gen{i}_is_on = true`, its rated and idle
    /// power in W, the fuel constants and both controller thresholds. An
    /// empty bay emits only `gen{i}_is_on = false`. Battery power and energy
    /// follow, scaled by the module count; without modules only the
    /// non-zero [`NO_BATTERY_POWER_PLACEHOLDER`] is emitted.
    ///
    /// Bays beyond the configuration's own bay list are treated as empty.
    pub fn parameters(&self, config: &PowertrainConfig<'_>) -> Vec<Parameter> {
        let mut params = Vec::new();

        for i in 1..=self.bay_count {
            let bay = config.slots.bays().get(i - 1).copied().flatten();
            let Some(option) = bay else {
                params.push(Parameter::new(format!("gen{i}_is_on"), false));
                continue;
            };
            let unit = option.generator;
            let fuel = FuelProperties::for_fuel(unit.fuel_type);
            let generator = format!("generator{i}");

            params.push(Parameter::new(format!("gen{i}_is_on"), true));
            params.push(Parameter::new(
                format!("{generator}.P_rated"),
                unit.p_max_kw * WATTS_PER_KW,
            ));
            params.push(Parameter::new(
                format!("{generator}.P_idle"),
                unit.p_min_kw * WATTS_PER_KW,
            ));
            params.push(Parameter::new(format!("{generator}.rho_fuel"), fuel.density));
            params.push(Parameter::new(
                format!("{generator}.LHV_fuel"),
                fuel.lower_heating_value,
            ));
            params.push(Parameter::new(format!("{generator}.C_f"), fuel.co2_factor));
            params.push(Parameter::new(
                format!("controller.gen{i}_upper"),
                option.upper,
            ));
            params.push(Parameter::new(
                format!("controller.gen{i}_lower"),
                option.lower,
            ));
        }

        if config.battery_count > 0 {
            let count = f64::from(config.battery_count);
            params.push(Parameter::new(
                format!("{BATTERY}.P_max"),
                config.battery.max_charge_power * count,
            ));
            params.push(Parameter::new(
                format!("{BATTERY}.E_max"),
                config.battery.capacity_joules() * count,
            ));
        } else {
            params.push(Parameter::new(
                format!("{BATTERY}.P_max"),
                NO_BATTERY_POWER_PLACEHOLDER,
            ));
        }

        params
    }

    /// Maps an annotated configuration, keeping it as the set's source.
    pub fn map<'a>(&self, source: Annotated<'a>) -> MappedParameterSet<'a> {
        let parameters = self.parameters(&source.config);
        MappedParameterSet { source, parameters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BatterySpec, GeneratorSpec};
    use crate::pipeline::slots::{SlotAssignment, SlotOption};

    fn fixtures() -> (Vec<GeneratorSpec>, BatterySpec) {
        let mut diesel = GeneratorSpec::new("D", FuelType::Diesel, 500.0, 10.0, 5.0);
        diesel.p_min_kw = 50.0;
        let mut methanol = GeneratorSpec::new("M", FuelType::Methanol, 300.0, 8.0, 4.0);
        methanol.p_min_kw = 30.0;
        let fc = GeneratorSpec::new("F", FuelType::FuelCell, 200.0, 3.0, 2.0);
        (
            vec![diesel, methanol, fc],
            BatterySpec::new("B", 100.0, 0.0, 1.0, 1.0, 400.0, 50.0, 1.0),
        )
    }

    fn names(params: &[Parameter]) -> Vec<&str> {
        params.iter().map(|p| p.param.as_str()).collect()
    }

    #[test]
    fn occupied_and_empty_bays_in_order() {
        let (gens, bat) = fixtures();
        let opts = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let config = PowertrainConfig {
            slots: SlotAssignment::packed([opts[0]], 2),
            battery: &bat,
            battery_count: 0,
        };
        let params = ParameterMapper::new(2).parameters(&config);
        assert_eq!(
            names(&params),
            [
                "gen1_is_on",
                "generator1.P_rated",
                "generator1.P_idle",
                "generator1.rho_fuel",
                "generator1.LHV_fuel",
                "generator1.C_f",
                "controller.gen1_upper",
                "controller.gen1_lower",
                "gen2_is_on",
                "battery1.P_max",
            ]
        );
        assert_eq!(params[0].value, "true");
        assert_eq!(params[1].value, "500000");
        assert_eq!(params[2].value, "50000");
        assert_eq!(params[3].value, "832");
        assert_eq!(params[6].value, "0.9");
        assert_eq!(params[7].value, "0.05");
        assert_eq!(params[8].value, "false");
        assert_eq!(params[9].value, "1");
    }

    #[test]
    fn battery_parameters_scale_with_count() {
        let (gens, bat) = fixtures();
        let opts = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let config = PowertrainConfig {
            slots: SlotAssignment::packed([opts[1]], 1),
            battery: &bat,
            battery_count: 5,
        };
        let set = ParameterMapper::new(1).map(Annotated {
            config,
            within_budget: true,
        });
        assert_eq!(set.get("battery1.P_max"), Some("100000"));
        assert_eq!(set.get("battery1.E_max"), Some("1800000000"));
        assert_eq!(set.get("generator1.rho_fuel"), Some("791"));
        assert_eq!(set.parameters.last().map(|p| p.param.as_str()), Some("battery1.E_max"));
    }

    #[test]
    fn fuel_cell_uses_provisional_hydrogen_constants() {
        assert_eq!(FuelProperties::for_fuel(FuelType::FuelCell), HYDROGEN_PROVISIONAL);
        assert_eq!(FuelProperties::for_fuel(FuelType::Hydrogen), DIESEL);
        assert_ne!(FuelProperties::for_fuel(FuelType::Methanol), DIESEL);
    }

    #[test]
    fn mapping_is_deterministic() {
        let (gens, bat) = fixtures();
        let opts = SlotOption::cross(&gens, &[0.05, 0.1], &[0.9]);
        let config = PowertrainConfig {
            slots: SlotAssignment::packed([opts[5], opts[2], opts[0]], 4),
            battery: &bat,
            battery_count: 1,
        };
        let mapper = ParameterMapper::new(4);
        assert_eq!(mapper.parameters(&config), mapper.parameters(&config.clone()));
    }

    #[test]
    fn empty_bays_emit_only_the_off_flag() {
        let (gens, bat) = fixtures();
        let opts = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let config = PowertrainConfig {
            slots: SlotAssignment::packed([opts[2]], 3),
            battery: &bat,
            battery_count: 1,
        };
        let params = ParameterMapper::new(3).parameters(&config);
        for i in [2, 3] {
            let per_bay: Vec<&str> = names(&params)
                .into_iter()
                .filter(|n| n.contains(&format!("gen{i}")) || n.contains(&format!("generator{i}")))
                .collect();
            assert_eq!(per_bay, [format!("gen{i}_is_on")]);
        }
    }
}
