//! Helpers shared by commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use arbor_hal::{JobResult, JobSpec};
use console::style;

/// Load a JSON job description.
///
/// A description without `config.shots` takes `default_shots`.
pub fn load_job(path: &Path, default_shots: u32) -> Result<JobSpec> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {}", path.display()))?;

    let has_shots = value
        .get("config")
        .and_then(|c| c.get("shots"))
        .is_some();
    let mut spec: JobSpec = serde_json::from_value(value)
        .with_context(|| format!("Invalid job description in {}", path.display()))?;
    if !has_shots {
        spec.config.shots = default_shots;
    }
    Ok(spec)
}

/// Print per-experiment histograms.
pub fn print_results(result: &JobResult) {
    println!(
        "\n{} Job {} on {} ({:.3}s)",
        style("✓").green().bold(),
        style(&result.job_id).dim(),
        style(&result.backend_name).yellow(),
        result.time_taken
    );

    for experiment in &result.results {
        println!(
            "\n  {} ({} shots)",
            style(experiment.name()).bold(),
            experiment.shots
        );

        let sorted = experiment.counts.sorted();
        let total = experiment.counts.total_shots().max(1) as f64;
        for (label, count) in sorted.iter().take(16) {
            let prob = **count as f64 / total * 100.0;
            let bar: String = "█".repeat((prob / 2.0).round() as usize);
            println!(
                "    {:>6}: {:>6} ({:>5.2}%) {}",
                style(label).cyan(),
                count,
                prob,
                style(bar).green()
            );
        }
        if sorted.len() > 16 {
            println!("    ... and {} more outcomes", sorted.len() - 16);
        }

        if let Some(state) = &experiment.statevector {
            println!("    Statevector ({} amplitudes):", state.len());
            for (i, amp) in state.amplitudes().iter().enumerate().take(16) {
                println!("      |{i}>: {:+.4} {:+.4}i", amp.re, amp.im);
            }
        }
    }
}
