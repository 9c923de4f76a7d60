//! Candidate powertrain configurations: bay assignments crossed with battery choices.

use std::fmt::Write as _;

use crate::catalog::BatterySpec;

use super::slots::{SlotAssignment, SlotSequences};

/// One candidate powertrain.
#[derive(Debug, Clone, PartialEq)]
pub struct PowertrainConfig<'a> {
    pub slots: SlotAssignment<'a>,
    pub battery: &'a BatterySpec,
    /// Installed battery modules; 0 means no battery capacity.
    pub battery_count: u32,
}

impl PowertrainConfig<'_> {
    /// Aggregate battery charge power (W) across all installed modules.
    pub fn battery_power(&self) -> f64 {
        self.battery.max_charge_power * f64::from(self.battery_count)
    }

    /// Capital cost: engines plus battery modules.
    pub fn total_cost(&self) -> f64 {
        let engines: f64 = self.slots.occupied().map(|o| o.generator.cost).sum();
        engines + self.battery.cost * f64::from(self.battery_count)
    }

    pub fn retrofit_cost(&self) -> f64 {
        self.slots.occupied().map(|o| o.generator.retrofit_cost).sum()
    }

    /// Compact simulation name, e.g. `G1_D_500:G2_M_300:B_20000`.
    ///
    /// Empty bays read `G{i}_None_0`; the battery term is the aggregate
    /// charge power, or `0` without batteries.
    pub fn sim_name(&self) -> String {
        let mut name = String::new();
        for (i, bay) in self.slots.bays().iter().enumerate() {
            match bay {
                Some(o) => {
                    let _ = write!(
                        name,
                        "G{}_{}_{}:",
                        i + 1,
                        o.generator.fuel_type.abbreviation(),
                        o.generator.p_max_kw
                    );
                }
                None => {
                    let _ = write!(name, "G{}_None_0:", i + 1);
                }
            }
        }
        let _ = write!(name, "B_{}", self.battery_power());
        name
    }

    /// Human-readable sequence, e.g. `Gen1:[Cat] -> Gen2:[None] + Batt:[1xLFP]`.
    pub fn describe(&self) -> String {
        let gens: Vec<String> = self
            .slots
            .bays()
            .iter()
            .enumerate()
            .map(|(i, bay)| {
                let label = bay.map_or("None", |o| o.generator.name.as_str());
                format!("Gen{}:[{label}]", i + 1)
            })
            .collect();
        format!(
            "{} + Batt:[{}x{}]",
            gens.join(" -> "),
            self.battery_count,
            self.battery.name
        )
    }
}

/// Lazy cross product of assignments × battery types × battery counts.
///
/// Order: assignment-major, then battery type, then count. A battery
/// count of zero is an ordinary candidate.
#[derive(Debug, Clone)]
pub struct Candidates<'s, 'a> {
    sequences: SlotSequences<'s, 'a>,
    batteries: &'a [BatterySpec],
    counts: &'a [u32],
    current: Option<SlotAssignment<'a>>,
    battery_idx: usize,
    count_idx: usize,
}

impl<'s, 'a> Candidates<'s, 'a> {
    /// Crosses `sequences` with every battery type and module count.
    ///
    /// # Arguments
    ///
    /// * `sequences` - Bay assignments, consumed lazily
    /// * `batteries` - Battery types from the catalog
    /// * `counts` - Module counts tried for each battery type
    ///
    /// Yields nothing when `batteries` or `counts` is empty.
    pub fn new(
        sequences: SlotSequences<'s, 'a>,
        batteries: &'a [BatterySpec],
        counts: &'a [u32],
    ) -> Self {
        Self {
            sequences,
            batteries,
            counts,
            current: None,
            battery_idx: 0,
            count_idx: 0,
        }
    }
}

impl<'a> Iterator for Candidates<'_, 'a> {
    type Item = PowertrainConfig<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batteries.is_empty() || self.counts.is_empty() {
            return None;
        }

        if self.count_idx == self.counts.len() {
            self.count_idx = 0;
            self.battery_idx += 1;
        }
        if self.battery_idx == self.batteries.len() {
            self.battery_idx = 0;
            self.current = None;
        }
        if self.current.is_none() {
            self.current = Some(self.sequences.next()?);
        }

        let slots = self.current.clone()?;
        let config = PowertrainConfig {
            slots,
            battery: &self.batteries[self.battery_idx],
            battery_count: self.counts[self.count_idx],
        };
        self.count_idx += 1;
        Some(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FuelType, GeneratorSpec};
    use crate::pipeline::slots::SlotOption;

    fn fixtures() -> (Vec<GeneratorSpec>, Vec<BatterySpec>) {
        let mut diesel = GeneratorSpec::new("Cat", FuelType::Diesel, 500.0, 10.0, 5.0);
        diesel.cost = 1000.0;
        diesel.retrofit_cost = 50.0;
        let mut methanol = GeneratorSpec::new("Wartsila", FuelType::Methanol, 300.0, 8.0, 4.0);
        methanol.cost = 800.0;
        let gens = vec![diesel, methanol];
        let bats = vec![
            BatterySpec::new("LFP", 100.0, 200.0, 1.0, 1.0, 400.0, 50.0, 1.0),
            BatterySpec::new("NMC", 80.0, 150.0, 1.0, 1.0, 350.0, 40.0, 1.0),
        ];
        (gens, bats)
    }

    #[test]
    fn size_is_product_of_factors() {
        let (gens, bats) = fixtures();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let counts = [0, 1];
        let one_battery = Candidates::new(SlotSequences::new(&options, 2), &bats[..1], &counts);
        assert_eq!(one_battery.count(), 12);

        let counts = [0, 1, 5, 10];
        let all = Candidates::new(SlotSequences::new(&options, 2), &bats, &counts);
        assert_eq!(all.count(), 6 * 2 * 4);
    }

    #[test]
    fn iterates_counts_then_batteries_per_assignment() {
        let (gens, bats) = fixtures();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let counts = [0, 5];
        let first: Vec<(String, &str, u32)> =
            Candidates::new(SlotSequences::new(&options, 1), &bats, &counts)
                .map(|c| (c.sim_name(), c.battery.name.as_str(), c.battery_count))
                .collect();
        assert_eq!(first.len(), 8);
        assert_eq!(first[0].1, "LFP");
        assert_eq!(first[0].2, 0);
        assert_eq!(first[1].2, 5);
        assert_eq!(first[2].1, "NMC");
        assert!(first[3].0.starts_with("G1_D_500"));
        assert!(first[4].0.starts_with("G1_M_300"));
    }

    #[test]
    fn zero_battery_count_is_a_candidate() {
        let (gens, bats) = fixtures();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let counts = [0];
        let all: Vec<_> = Candidates::new(SlotSequences::new(&options, 1), &bats[..1], &counts)
            .collect();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|c| c.battery_count == 0 && c.battery_power() == 0.0));
    }

    #[test]
    fn empty_battery_inputs_yield_nothing() {
        let (gens, bats) = fixtures();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        assert_eq!(
            Candidates::new(SlotSequences::new(&options, 2), &[], &[1]).count(),
            0
        );
        assert_eq!(
            Candidates::new(SlotSequences::new(&options, 2), &bats, &[]).count(),
            0
        );
    }

    #[test]
    fn descriptors_cover_every_bay() {
        let (gens, bats) = fixtures();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let config = PowertrainConfig {
            slots: SlotAssignment::packed([options[0]], 3),
            battery: &bats[0],
            battery_count: 2,
        };
        assert_eq!(config.sim_name(), "G1_D_500:G2_None_0:G3_None_0:B_40000");
        assert_eq!(
            config.describe(),
            "Gen1:[Cat] -> Gen2:[None] -> Gen3:[None] + Batt:[2xLFP]"
        );
        assert_eq!(config.total_cost(), 1000.0 + 400.0);
        assert_eq!(config.retrofit_cost(), 50.0);
    }
}
