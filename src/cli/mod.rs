//! Command-line entry for the training pipeline.
//!
//! One argument-light command: run the whole load → split → build → train →
//! log sequence against the data source configured in `DB_URI`, inside a
//! single tracked run, and report wall-clock time at the end.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use crate::data::{load_data, preprocess};
use crate::pipeline::{build_pipeline, ALPHA_PARAM};
use crate::registry::JsonFileRegistry;
use crate::tracking::storage::JsonFileBackend;
use crate::tracking::{ExperimentTracker, RunScope, RunStatus};
use crate::train::{r_squared, train_and_log_model, FittedModel, ParamGrid, DEFAULT_CV};

const EXPERIMENT_NAME: &str = "housing-prices";
const ARTIFACT_PATH: &str = "housing-prices-estimator";
const REGISTERED_MODEL_NAME: &str = "housing-prices-estimator-LR";

/// Train the housing-price estimator and log it to the local registry
#[derive(Debug, Parser)]
#[command(name = "tasador", version, about)]
pub struct Cli {
    /// Directory for tracked runs and their artifacts
    #[arg(long, default_value = "runs")]
    pub tracking_dir: PathBuf,

    /// Directory for the model registry
    #[arg(long, default_value = "registry")]
    pub registry_dir: PathBuf,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = DEFAULT_CV)]
    pub cv: usize,
}

/// Run the whole training pipeline once.
pub fn run_command(cli: Cli) -> crate::Result<()> {
    let started = Instant::now();
    println!("Training model...");

    let dataset = load_data()?;
    let split = preprocess(&dataset)?;
    let pipeline = build_pipeline();

    // Regularization sweep over [100, 1000) stepped by 25.
    let grid = ParamGrid::new().with(ALPHA_PARAM, (100..1000).step_by(25).map(f64::from));

    let mut tracker =
        ExperimentTracker::new(EXPERIMENT_NAME, JsonFileBackend::new(&cli.tracking_dir));
    let mut registry = JsonFileRegistry::new(&cli.registry_dir);

    let run_id = tracker.start_run(Some(REGISTERED_MODEL_NAME))?;
    let outcome = {
        let mut run = RunScope::new(&mut tracker, run_id.as_str());
        train_and_log_model(
            &pipeline,
            &split.x_train,
            &split.y_train,
            &grid,
            cli.cv,
            ARTIFACT_PATH,
            REGISTERED_MODEL_NAME,
            &mut run,
            &mut registry,
        )
        .and_then(|model| {
            // Generalization on the held-out partition.
            let predictions = model.predict(&split.x_test)?;
            let test_r2 = r_squared(predictions.view(), split.y_test.view());
            run.log_metric("test_r2", test_r2, 0)?;
            Ok((model, test_r2))
        })
    };

    match outcome {
        Ok((model, test_r2)) => {
            tracker.end_run(&run_id, RunStatus::Completed)?;
            report(&model, test_r2, started);
            Ok(())
        }
        Err(e) => {
            tracker.end_run(&run_id, RunStatus::Failed)?;
            Err(e)
        }
    }
}

fn report(model: &FittedModel, test_r2: f64, started: Instant) {
    let alpha = model
        .best_params()
        .get(ALPHA_PARAM)
        .copied()
        .unwrap_or_default();
    println!("best alpha: {alpha}");
    println!("mean CV R²: {:.4}", model.best_score());
    println!("test R²: {test_r2:.4}");
    println!("...Done!");
    println!(
        "---Total training time: {:.2}s",
        started.elapsed().as_secs_f64()
    );
}
