//! Wire types for the batch simulation service.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::catalog::{BatterySpec, GeneratorSpec};
use crate::duty_cycle::DutyCycleSummary;
use crate::pipeline::{BatchPlan, MappedParameterSet, Parameter};

/// Engine record as the service expects it inside a slot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EngineRecord {
    pub engine_name: String,
    pub engine_p_max: f64,
    pub engine_p_min: f64,
    pub engine_cost: f64,
    pub engine_mass: f64,
    pub engine_volume: f64,
    pub engine_bsfc: String,
    pub engine_fcc: String,
    pub engine_fuel_type: &'static str,
    pub engine_db_index: String,
    pub engine_retrofit_cost: f64,
}

impl From<&GeneratorSpec> for EngineRecord {
    fn from(g: &GeneratorSpec) -> Self {
        Self {
            engine_name: g.name.clone(),
            engine_p_max: g.p_max_kw,
            engine_p_min: g.p_min_kw,
            engine_cost: g.cost,
            engine_mass: g.mass,
            engine_volume: g.volume,
            engine_bsfc: g.bsfc.clone(),
            engine_fcc: g.fcc.clone(),
            engine_fuel_type: g.fuel_type.marker(),
            engine_db_index: g.db_index.clone(),
            engine_retrofit_cost: g.retrofit_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatteryRecord {
    pub battery_name: String,
    pub battery_capacity: f64,
    pub battery_cost: f64,
    pub battery_mass: f64,
    pub battery_volume: f64,
    pub battery_voltage: f64,
    pub battery_current: f64,
    pub battery_max_c_rate: f64,
    pub battery_charge_rate: f64,
    pub battery_max_charge_power: f64,
    pub battery_db_index: String,
    pub battery_abbreviation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_cycle_limit: Option<f64>,
}

impl From<&BatterySpec> for BatteryRecord {
    fn from(b: &BatterySpec) -> Self {
        Self {
            battery_name: b.name.clone(),
            battery_capacity: b.capacity_kwh,
            battery_cost: b.cost,
            battery_mass: b.mass,
            battery_volume: b.volume,
            battery_voltage: b.voltage,
            battery_current: b.current,
            battery_max_c_rate: b.max_c_rate,
            battery_charge_rate: b.charge_rate,
            battery_max_charge_power: b.max_charge_power,
            battery_db_index: b.db_index.clone(),
            battery_abbreviation: b.abbreviation.clone(),
            battery_cycle_limit: b.cycle_limit,
        }
    }
}

/// One bay as sent on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRecord {
    pub engine: Option<EngineRecord>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// The `config` object: `"slot {i}"`, `"slot {i}_lower"`, `"slot {i}_upper"`
/// per bay, then the battery fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotConfig {
    pub slots: Vec<SlotRecord>,
    pub battery: BatteryRecord,
    pub battery_count: u32,
    pub within_budget: bool,
}

impl Serialize for SlotConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len() * 3 + 3))?;
        for (i, slot) in self.slots.iter().enumerate() {
            let n = i + 1;
            map.serialize_entry(&format!("slot {n}"), &slot.engine)?;
            map.serialize_entry(&format!("slot {n}_lower"), &slot.lower)?;
            map.serialize_entry(&format!("slot {n}_upper"), &slot.upper)?;
        }
        map.serialize_entry("battery", &self.battery)?;
        map.serialize_entry("battery_count", &self.battery_count)?;
        map.serialize_entry("within_budget", &self.within_budget)?;
        map.end()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Instance {
    pub config: SlotConfig,
}

/// One configuration and its parameter overrides.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigCombination {
    pub instance: Instance,
    pub modelica_parameters: Vec<Parameter>,
}

impl From<&MappedParameterSet<'_>> for ConfigCombination {
    fn from(set: &MappedParameterSet<'_>) -> Self {
        let config = set.config();
        let slots = config
            .slots
            .bays()
            .iter()
            .map(|bay| SlotRecord {
                engine: bay.map(|o| EngineRecord::from(o.generator)),
                lower: bay.map(|o| o.lower),
                upper: bay.map(|o| o.upper),
            })
            .collect();
        Self {
            instance: Instance {
                config: SlotConfig {
                    slots,
                    battery: BatteryRecord::from(config.battery),
                    battery_count: config.battery_count,
                    within_budget: set.source.within_budget,
                },
            },
            modelica_parameters: set.parameters.clone(),
        }
    }
}

/// Batch simulation request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchRequest {
    pub model_name: String,
    pub start_time: f64,
    pub stop_time: f64,
    pub list_of_config_combinations: Vec<ConfigCombination>,
    pub number_of_slots: usize,
    #[serde(rename = "vesselName")]
    pub vessel_name: String,
    #[serde(rename = "taskName")]
    pub task_name: String,
}

impl BatchRequest {
    /// Builds the request for a whole plan, timed by the duty cycle.
    ///
    /// A duty cycle without samples yields a zero-length window.
    pub fn from_plan(
        plan: &BatchPlan<'_>,
        duty: &DutyCycleSummary,
        model_name: impl Into<String>,
        vessel_name: impl Into<String>,
        task_name: impl Into<String>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            start_time: duty.start_time.unwrap_or_default(),
            stop_time: duty.end_time.unwrap_or_default(),
            list_of_config_combinations: plan.sets.iter().map(ConfigCombination::from).collect(),
            number_of_slots: plan.bay_count,
            vessel_name: vessel_name.into(),
            task_name: task_name.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.list_of_config_combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list_of_config_combinations.is_empty()
    }
}

/// Model upload body; `model_data` is base64 text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelUpload {
    pub model_name: String,
    pub model_data: String,
}

/// Service reply to an upload.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadReply {
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
}

impl UploadReply {
    pub const MODEL_WRITTEN: &'static str = "Model written";

    pub fn is_written(&self) -> bool {
        self.status == Self::MODEL_WRITTEN
    }
}
