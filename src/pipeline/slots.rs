//! Slot options and front-packed bay assignments.

use crate::catalog::GeneratorSpec;

/// One generator paired with one control-threshold pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotOption<'a> {
    pub generator: &'a GeneratorSpec,
    /// Lower load-fraction bound for the engine controller.
    pub lower: f64,
    /// Upper load-fraction bound for the engine controller.
    pub upper: f64,
}

impl<'a> SlotOption<'a> {
    /// Crosses every generator with every `(lower, upper)` threshold pair.
    ///
    /// Order: generator-major, then lower threshold, then upper threshold.
    /// The result holds `generators × lower × upper` options.
    ///
    /// # Arguments
    ///
    /// * `generators` - Catalog generators, already in fuel-group order
    /// * `lower` - Candidate lower load-fraction thresholds
    /// * `upper` - Candidate upper load-fraction thresholds
    ///
    /// # Returns
    ///
    /// Options borrowing `generators`; empty if any input is empty.
    pub fn cross(
        generators: &'a [GeneratorSpec],
        lower: &[f64],
        upper: &[f64],
    ) -> Vec<SlotOption<'a>> {
        let mut options = Vec::with_capacity(generators.len() * lower.len() * upper.len());
        for generator in generators {
            for &lo in lower {
                for &hi in upper {
                    options.push(SlotOption {
                        generator,
                        lower: lo,
                        upper: hi,
                    });
                }
            }
        }
        options
    }
}

/// Contents of every bay, occupied bays packed at the front.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotAssignment<'a> {
    bays: Vec<Option<SlotOption<'a>>>,
}

impl<'a> SlotAssignment<'a> {
    /// Packs `active` into the first bays and pads the rest with empty bays.
    ///
    /// # Panics
    ///
    /// Panics if `active` holds more options than `bay_count`.
    pub fn packed(active: impl IntoIterator<Item = SlotOption<'a>>, bay_count: usize) -> Self {
        let mut bays: Vec<Option<SlotOption<'a>>> = active.into_iter().map(Some).collect();
        assert!(bays.len() <= bay_count, "more generators than bays");
        bays.resize(bay_count, None);
        Self { bays }
    }

    /// Every bay in order; `None` is an empty bay.
    pub fn bays(&self) -> &[Option<SlotOption<'a>>] {
        &self.bays
    }

    pub fn bay_count(&self) -> usize {
        self.bays.len()
    }

    /// Occupied bays in bay order.
    pub fn occupied(&self) -> impl Iterator<Item = &SlotOption<'a>> {
        self.bays.iter().flatten()
    }

    pub fn active_count(&self) -> usize {
        self.occupied().count()
    }

    /// `true` when no empty bay precedes an occupied one.
    pub fn is_front_packed(&self) -> bool {
        let k = self.active_count();
        self.bays[..k].iter().all(Option::is_some)
    }

    pub fn total_mass(&self) -> f64 {
        self.occupied().map(|o| o.generator.mass).sum()
    }

    pub fn total_volume(&self) -> f64 {
        self.occupied().map(|o| o.generator.volume).sum()
    }

    /// Summed rated power of the occupied bays (kW).
    pub fn rated_power_kw(&self) -> f64 {
        self.occupied().map(|o| o.generator.p_max_kw).sum()
    }
}

/// Lazy generator of every front-packed assignment.
///
/// For each active-bay count `k` in `1..=bay_count` it yields all `M^k`
/// ordered sequences of the `M` options (repetition allowed), right-padded
/// with empty bays. A clone resumes independently from the same position,
/// and [`SlotSequences::new`] starts the sequence over.
///
/// The option slice is only borrowed for `'s`; yielded assignments borrow
/// the catalog for `'a` and may outlive the iterator and its slice.
#[derive(Debug, Clone)]
pub struct SlotSequences<'s, 'a> {
    options: &'s [SlotOption<'a>],
    bay_count: usize,
    /// Current active-bay count.
    active: usize,
    /// Option index per active bay; bay 1 varies slowest.
    odometer: Vec<usize>,
    done: bool,
}

impl<'s, 'a> SlotSequences<'s, 'a> {
    /// Starts the sequence at one active bay holding the first option.
    ///
    /// # Arguments
    ///
    /// * `options` - Slot options, usually from [`SlotOption::cross`]
    /// * `bay_count` - Generator bays in the model
    ///
    /// Yields nothing when `options` is empty or `bay_count` is zero.
    pub fn new(options: &'s [SlotOption<'a>], bay_count: usize) -> Self {
        Self {
            options,
            bay_count,
            active: 1,
            odometer: vec![0],
            done: options.is_empty() || bay_count == 0,
        }
    }

    /// Number of assignments `Σ_{k=1..n} m^k`, or `None` on overflow.
    pub fn total(options: usize, bay_count: usize) -> Option<u128> {
        let m = options as u128;
        let mut power: u128 = 1;
        let mut sum: u128 = 0;
        for _ in 0..bay_count {
            power = power.checked_mul(m)?;
            sum = sum.checked_add(power)?;
        }
        Some(sum)
    }

    /// Advances the odometer; returns `false` once it wraps around.
    fn tick(&mut self) -> bool {
        let m = self.options.len();
        for digit in self.odometer.iter_mut().rev() {
            *digit += 1;
            if *digit < m {
                return true;
            }
            *digit = 0;
        }
        false
    }
}

impl<'a> Iterator for SlotSequences<'_, 'a> {
    type Item = SlotAssignment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let assignment = SlotAssignment::packed(
            self.odometer.iter().map(|&i| self.options[i]),
            self.bay_count,
        );

        if !self.tick() {
            if self.active == self.bay_count {
                self.done = true;
            } else {
                self.active += 1;
                self.odometer = vec![0; self.active];
            }
        }

        Some(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FuelType;

    fn generators() -> Vec<GeneratorSpec> {
        vec![
            GeneratorSpec::new("D", FuelType::Diesel, 500.0, 10.0, 5.0),
            GeneratorSpec::new("M", FuelType::Methanol, 300.0, 8.0, 4.0),
        ]
    }

    fn names<'a>(a: &'a SlotAssignment<'_>) -> Vec<&'a str> {
        a.bays()
            .iter()
            .map(|b| b.map_or("-", |o| o.generator.name.as_str()))
            .collect()
    }

    #[test]
    fn cross_pairs_every_generator_with_every_threshold_pair() {
        let gens = generators();
        let options = SlotOption::cross(&gens, &[0.1, 0.2], &[0.8]);
        assert_eq!(options.len(), 4);
        assert_eq!(options[1].generator.name, "D");
        assert_eq!((options[1].lower, options[1].upper), (0.2, 0.8));
        assert_eq!(options[2].generator.name, "M");
    }

    #[test]
    fn two_options_two_bays_yield_six_in_order() {
        let gens = generators();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let all: Vec<_> = SlotSequences::new(&options, 2).collect();
        let listed: Vec<Vec<&str>> = all.iter().map(names).collect();
        assert_eq!(
            listed,
            vec![
                vec!["D", "-"],
                vec!["M", "-"],
                vec!["D", "D"],
                vec!["D", "M"],
                vec!["M", "D"],
                vec!["M", "M"],
            ]
        );
    }

    #[test]
    fn count_matches_geometric_sum_without_duplicates() {
        let gens = generators();
        let options = SlotOption::cross(&gens, &[0.05, 0.1], &[0.9]);
        let all: Vec<_> = SlotSequences::new(&options, 3).collect();
        assert_eq!(all.len() as u128, SlotSequences::total(4, 3).unwrap_or(0));
        assert_eq!(all.len(), 4 + 16 + 64);
        for (i, a) in all.iter().enumerate() {
            assert_eq!(a.bay_count(), 3);
            assert!(a.is_front_packed());
            assert!(all[i + 1..].iter().all(|b| b != a), "duplicate at {i}");
        }
    }

    #[test]
    fn never_places_generator_after_empty_bay() {
        let gens = generators();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        assert!(
            SlotSequences::new(&options, 4).all(|a| a.bays()[0].is_some() && a.is_front_packed())
        );
    }

    #[test]
    fn clone_restarts_from_same_position() {
        let gens = generators();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let mut seq = SlotSequences::new(&options, 2);
        seq.next();
        let rest_a: Vec<_> = seq.clone().collect();
        let rest_b: Vec<_> = seq.collect();
        assert_eq!(rest_a, rest_b);
        assert_eq!(rest_a.len(), 5);
    }

    #[test]
    fn empty_inputs_yield_nothing() {
        let gens = generators();
        let options = SlotOption::cross(&gens, &[], &[0.9]);
        assert_eq!(SlotSequences::new(&options, 2).count(), 0);

        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        assert_eq!(SlotSequences::new(&options, 0).count(), 0);
        assert_eq!(SlotSequences::total(2, 0), Some(0));
    }

    #[test]
    fn total_reports_overflow() {
        assert_eq!(SlotSequences::total(2, 2), Some(6));
        assert_eq!(SlotSequences::total(1_000, 20), None);
    }

    #[test]
    fn sums_only_occupied_bays() {
        let gens = generators();
        let options = SlotOption::cross(&gens, &[0.05], &[0.9]);
        let a = SlotAssignment::packed([options[0], options[1]], 3);
        assert_eq!(a.active_count(), 2);
        assert_eq!(a.total_mass(), 18.0);
        assert_eq!(a.total_volume(), 9.0);
        assert_eq!(a.rated_power_kw(), 800.0);
    }
}
