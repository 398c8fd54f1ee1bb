//! Backends command implementation.

use anyhow::Result;
use arbor_exec::{ExecConfig, STATEVECTOR_RESOURCE, get_backend};
use console::style;

/// Execute the backends command.
pub fn execute(config: &ExecConfig) -> Result<()> {
    println!("{} Available backends:\n", style("Arbor").cyan().bold());

    for lattice in [None, Some(STATEVECTOR_RESOURCE)] {
        let backend = get_backend(lattice, false);
        let caps = backend.configuration();
        println!(
            "  {} {} {}",
            style("●").green(),
            style(backend.name()).bold(),
            if caps.local { "(local)" } else { "" }
        );
        println!("    Version: {}", backend.version());
        println!("    Qubits: {}", caps.n_qubits.min(config.max_qubits as u32));
        println!("    Max shots: {}", caps.max_shots.min(config.max_shots));
        println!("    Gates: {}", caps.basis_gates.join(", "));
        println!();
    }

    println!(
        "  Concurrent executions: {}",
        style(config.max_concurrent_executions).yellow()
    );
    Ok(())
}
