//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - batch execution of quantum experiments",
        style("Arbor").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  arbor-ir         Circuit intermediate representation");
    println!("  arbor-hal        Job model and collaborator contracts");
    println!("  arbor-translate  Experiment translation");
    println!("  arbor-exec       Scheduling and result assembly");
    println!("  arbor-cli        Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
