use crate::core::data::{Compound, Dataset};
use crate::core::descriptors::DescriptorSet;
use crate::core::io::smiles;
use crate::engine::assembly::{self, DroppedRow};
use crate::engine::config::OptimizationConfig;
use crate::engine::error::EngineError;
use crate::engine::forest::RandomForest;
use crate::engine::grid::{self, GridResults};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub target: Compound,
    /// Hill-order formula of the target.
    pub formula: String,
    pub descriptors: DescriptorSet,
    pub training_rows: usize,
    pub dropped_rows: Vec<DroppedRow>,
    pub grid: GridResults,
}

/// Runs the full optimization for `config.target` against `dataset`.
///
/// The target structure is checked before anything else, so an invalid SMILES
/// fails the run without training a model.
#[instrument(skip_all, name = "optimize_workflow", fields(target = %config.target.name))]
pub fn run(
    dataset: &Dataset,
    config: &OptimizationConfig,
    reporter: &ProgressReporter,
) -> Result<OptimizationResult, EngineError> {
    let target = &config.target;

    // === Phase 1: Target descriptors ===
    let (formula, descriptors) = reporter.phase("Computing Descriptors", || {
        let mol = smiles::parse(&target.smiles).map_err(|source| EngineError::InvalidStructure {
            name: target.name.clone(),
            smiles: target.smiles.clone(),
            source,
        })?;
        Ok::<_, EngineError>((mol.formula(), DescriptorSet::compute(&mol)))
    })?;
    info!(
        formula = %formula,
        molecular_weight = descriptors.molecular_weight,
        log_p = descriptors.log_p,
        "Target descriptors computed."
    );

    // === Phase 2: Training table ===
    let assembled = reporter.phase("Assembling Dataset", || {
        let assembled = assembly::assemble(dataset);
        if assembled.table.is_empty() {
            return Err(EngineError::EmptyTrainingSet {
                total: dataset.experiments.len(),
                dropped: assembled.dropped.len(),
            });
        }
        Ok(assembled)
    })?;
    for row in &assembled.dropped {
        reporter.report(Progress::Message(format!(
            "Skipped experiment #{} ({}): {}",
            row.index + 1,
            row.compound,
            row.reason
        )));
    }

    // === Phase 3: Model ===
    let model = reporter.phase("Training Model", || {
        RandomForest::fit(&assembled.table, &config.forest, reporter)
    })?;

    // === Phase 4: Grid search ===
    let grid = reporter.phase("Searching Grid", || {
        grid::search(&model, &descriptors, &config.grid, reporter)
    })?;

    info!(
        points = grid.len(),
        training_rows = assembled.table.len(),
        "Workflow complete."
    );
    Ok(OptimizationResult {
        target: target.clone(),
        formula,
        descriptors,
        training_rows: assembled.table.len(),
        dropped_rows: assembled.dropped,
        grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::LINALOOL;
    use crate::engine::config::{GridSpec, OptimizationConfigBuilder};
    use std::sync::{Arc, Mutex};

    fn linalool_config() -> OptimizationConfig {
        let dataset = Dataset::builtin();
        OptimizationConfigBuilder::new()
            .target(dataset.compound(LINALOOL).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn builtin_run_evaluates_the_full_grid() {
        let result = run(&Dataset::builtin(), &linalool_config(), &ProgressReporter::new()).unwrap();

        assert_eq!(result.grid.len(), 25);
        assert_eq!(result.training_rows, 9);
        assert!(result.dropped_rows.is_empty());
        assert_eq!(result.formula, "C10H18O");

        let best = result.grid.optimum();
        assert!(GridSpec::default().temperatures().contains(&best.temperature_c));
        assert!([0.0, 25.0, 50.0, 75.0, 100.0].contains(&best.ethanol_percent()));
        assert!(result
            .grid
            .points()
            .iter()
            .all(|p| p.predicted_yield <= best.predicted_yield));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let config = linalool_config();
        let a = run(&Dataset::builtin(), &config, &ProgressReporter::new()).unwrap();
        let b = run(&Dataset::builtin(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn invalid_target_fails_before_training() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |e| {
            sink.lock().unwrap().push(e);
        }));
        let config = OptimizationConfigBuilder::new()
            .target_name("Target")
            .target_smiles("InvalidSMILES")
            .build()
            .unwrap();

        let err = run(&Dataset::builtin(), &config, &reporter).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStructure { .. }));
        assert_eq!(
            *events.lock().unwrap(),
            vec![Progress::PhaseStart {
                name: "Computing Descriptors"
            }]
        );
    }

    #[test]
    fn dataset_without_usable_rows_is_an_error() {
        let dataset = Dataset {
            compounds: Vec::new(),
            ..Dataset::builtin()
        };
        let err = run(&dataset, &linalool_config(), &ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::EmptyTrainingSet {
                total: 9,
                dropped: 9
            }
        ));
    }

    #[test]
    fn target_need_not_be_in_the_dataset() {
        let config = OptimizationConfigBuilder::new()
            .target_name("Ethyl acetate")
            .target_smiles("CCOC(C)=O")
            .build()
            .unwrap();
        let result = run(&Dataset::builtin(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(result.formula, "C4H8O2");
        assert_eq!(result.grid.len(), 25);
    }
}
