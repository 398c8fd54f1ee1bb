//! Run command implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arbor_adapter_sim::EmulatedResource;
use arbor_exec::{ExecConfig, LatticeBackend};
use arbor_hal::JobHandle;
use arbor_translate::QobjTranslator;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::common::{load_job, print_results};
use crate::OutputFormat;

/// Overrides and presentation options of `arbor run`.
pub struct RunOptions {
    pub shots: Option<u32>,
    pub seed: Option<u64>,
    pub lattice: Option<String>,
    pub as_emulator: bool,
    pub timeout: Option<Duration>,
    pub format: OutputFormat,
}

/// Execute the run command.
pub async fn execute(input: &Path, options: &RunOptions, config: &ExecConfig) -> Result<()> {
    let mut spec = load_job(input, config.default_shots)?;
    if let Some(shots) = options.shots {
        spec.config.shots = shots;
    }
    if let Some(seed) = options.seed {
        spec.config.seed_simulator = Some(seed);
    }

    let resource = EmulatedResource::new()
        .with_max_qubits(config.max_qubits)
        .with_max_concurrent(config.max_concurrent_executions);
    let backend = LatticeBackend::from_config(
        config,
        options.lattice.as_deref(),
        options.as_emulator,
        Arc::new(QobjTranslator::new()),
        Arc::new(resource),
    )?;

    let table = options.format == OutputFormat::Table;
    if table {
        println!(
            "{} Running {} on {} ({} experiment(s), {} shots)",
            style("→").cyan().bold(),
            style(input.display()).green(),
            style(backend.name()).yellow(),
            spec.experiments.len(),
            spec.config.shots
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("invalid spinner template")?,
    );
    spinner.set_message("Submitting job...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let job = backend.run(spec).await?;
    spinner.set_message(format!("Running job {}...", job.job_id()));
    let result = job.result(options.timeout).await;
    spinner.finish_and_clear();
    let result = result?;

    match options.format {
        OutputFormat::Table => print_results(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result.as_ref())?),
    }
    Ok(())
}
