use super::config::GridSpec;
use super::error::EngineError;
use super::features::FeatureVector;
use super::forest::YieldModel;
use super::progress::{Progress, ProgressReporter};
use crate::core::descriptors::DescriptorSet;
use crate::core::solvent::{SolventMixture, estimate_polarity};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub temperature_c: f64,
    pub ethanol_fraction: f64,
    pub water_fraction: f64,
    pub solvent_polarity: f64,
    pub predicted_yield: f64,
}

impl GridPoint {
    pub fn ethanol_percent(&self) -> f64 {
        self.ethanol_fraction * 100.0
    }

    pub fn water_percent(&self) -> f64 {
        self.water_fraction * 100.0
    }

    pub fn mixture(&self) -> SolventMixture {
        SolventMixture::new(self.ethanol_fraction, self.water_fraction, 0.0)
    }
}

/// Every evaluated grid point in enumeration order (temperature outer, ethanol
/// fraction inner) together with the position of the optimum.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResults {
    points: Vec<GridPoint>,
    optimum: usize,
}

impl GridResults {
    /// Picks the first point whose predicted yield is strictly greater than every
    /// point before it. Returns `None` for an empty grid.
    pub fn from_points(points: Vec<GridPoint>) -> Option<Self> {
        let mut optimum = 0;
        for (idx, point) in points.iter().enumerate().skip(1) {
            if point.predicted_yield > points[optimum].predicted_yield {
                optimum = idx;
            }
        }
        (!points.is_empty()).then_some(Self { points, optimum })
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn optimum(&self) -> &GridPoint {
        &self.points[self.optimum]
    }

    pub fn optimum_index(&self) -> usize {
        self.optimum
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct temperatures in enumeration order.
    pub fn temperatures(&self) -> Vec<f64> {
        distinct(self.points.iter().map(|p| p.temperature_c))
    }

    /// Distinct ethanol fractions in enumeration order.
    pub fn ethanol_fractions(&self) -> Vec<f64> {
        distinct(self.points.iter().map(|p| p.ethanol_fraction))
    }
}

fn distinct(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Evaluates `model` at every (temperature, ethanol fraction) pair of `grid` for a
/// compound with the given descriptors. Water makes up the rest of the solvent;
/// hexane is always absent.
#[instrument(skip_all, name = "grid_search", fields(points = grid.len()))]
pub fn search<M: YieldModel + ?Sized>(
    model: &M,
    descriptors: &DescriptorSet,
    grid: &GridSpec,
    reporter: &ProgressReporter,
) -> Result<GridResults, EngineError> {
    let temperatures = grid.temperatures();
    let fractions = grid.ethanol_fractions();

    reporter.report(Progress::TaskStart {
        total_steps: (temperatures.len() * fractions.len()) as u64,
    });
    let mut points = Vec::with_capacity(temperatures.len() * fractions.len());
    for &temperature_c in &temperatures {
        for &ethanol_fraction in &fractions {
            let mixture = SolventMixture::ethanol_water(ethanol_fraction);
            let solvent_polarity = estimate_polarity(&mixture);
            let features = FeatureVector::new(descriptors, temperature_c, solvent_polarity);
            points.push(GridPoint {
                temperature_c,
                ethanol_fraction,
                water_fraction: mixture.water,
                solvent_polarity,
                predicted_yield: model.predict(&features),
            });
            reporter.report(Progress::TaskIncrement);
        }
    }
    reporter.report(Progress::TaskFinish);

    let results = GridResults::from_points(points).ok_or(EngineError::EmptyGrid)?;
    let best = results.optimum();
    info!(
        temperature_c = best.temperature_c,
        ethanol_percent = best.ethanol_percent(),
        predicted_yield = best.predicted_yield,
        "Grid search complete."
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::features::{SOLVENT_POLARITY, TEMPERATURE};

    struct Constant(f64);

    impl YieldModel for Constant {
        fn predict(&self, _: &FeatureVector) -> f64 {
            self.0
        }
    }

    /// Peaks at 50 C and a polarity of 52.2 (half ethanol, half water).
    struct Peaked;

    impl YieldModel for Peaked {
        fn predict(&self, x: &FeatureVector) -> f64 {
            100.0 - (x.get(TEMPERATURE) - 50.0).abs() - (x.get(SOLVENT_POLARITY) - 52.2).abs()
        }
    }

    fn descriptors() -> DescriptorSet {
        DescriptorSet {
            molecular_weight: 154.25,
            log_p: 2.67,
            polarizability: 70.0,
            h_bond_donors: 1,
            h_bond_acceptors: 1,
        }
    }

    fn point(yield_percent: f64) -> GridPoint {
        GridPoint {
            temperature_c: 0.0,
            ethanol_fraction: 0.0,
            water_fraction: 1.0,
            solvent_polarity: 80.1,
            predicted_yield: yield_percent,
        }
    }

    #[test]
    fn default_grid_has_twenty_five_points_in_nested_order() {
        let results = search(
            &Constant(1.0),
            &descriptors(),
            &GridSpec::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(results.len(), 25);
        assert_eq!(results.temperatures(), vec![30.0, 40.0, 50.0, 60.0, 70.0]);
        assert_eq!(results.ethanol_fractions(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let second = results.points()[1];
        assert_eq!(second.temperature_c, 30.0);
        assert_eq!(second.ethanol_fraction, 0.25);
        assert_eq!(second.water_fraction, 0.75);
        assert!((second.solvent_polarity - (0.25 * 24.3 + 0.75 * 80.1)).abs() < 1e-9);
    }

    #[test]
    fn ties_resolve_to_the_first_point() {
        let results = search(
            &Constant(42.0),
            &descriptors(),
            &GridSpec::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(results.optimum_index(), 0);
        assert_eq!(results.optimum().temperature_c, 30.0);
        assert_eq!(results.optimum().ethanol_fraction, 0.0);
    }

    #[test]
    fn optimum_is_the_maximum() {
        let results = search(
            &Peaked,
            &descriptors(),
            &GridSpec::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        let best = results.optimum();
        assert_eq!(best.temperature_c, 50.0);
        assert_eq!(best.ethanol_fraction, 0.5);
        assert_eq!(best.ethanol_percent(), 50.0);
        assert_eq!(best.water_percent(), 50.0);
        assert!(results
            .points()
            .iter()
            .all(|p| p.predicted_yield <= best.predicted_yield));
    }

    #[test]
    fn later_equal_maximum_does_not_replace_earlier_one() {
        let results = GridResults::from_points(vec![
            point(1.0),
            point(3.0),
            point(2.0),
            point(3.0),
        ])
        .unwrap();
        assert_eq!(results.optimum_index(), 1);
    }

    #[test]
    fn empty_point_list_has_no_results() {
        assert!(GridResults::from_points(Vec::new()).is_none());
    }

    #[test]
    fn mixture_of_a_point_has_no_hexane() {
        let p = GridPoint {
            ethanol_fraction: 0.75,
            water_fraction: 0.25,
            ..point(0.0)
        };
        let mixture = p.mixture();
        assert_eq!(mixture.hexane, 0.0);
        assert_eq!(mixture.ethanol, 0.75);
    }

    #[test]
    fn custom_grid_changes_the_enumeration() {
        let grid = GridSpec {
            temperature_start: 20.0,
            temperature_stop: 40.0,
            temperature_step: 20.0,
            ethanol_points: 3,
        };
        let results =
            search(&Constant(0.0), &descriptors(), &grid, &ProgressReporter::new()).unwrap();
        assert_eq!(results.len(), 6);
        assert_eq!(results.temperatures(), vec![20.0, 40.0]);
        assert_eq!(results.ethanol_fractions(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn invalid_grid_is_rejected() {
        let grid = GridSpec {
            ethanol_points: 0,
            ..GridSpec::default()
        };
        let result = search(&Constant(0.0), &descriptors(), &grid, &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::EmptyGrid)));
    }
}
