//! Circuit command implementation.

use anyhow::Result;
use console::style;

use hhl_core::{ComponentRegistry, Hhl, NullSink};

use super::common::{load_config, load_problem};

/// Execute the circuit command.
pub fn execute(input: &str, config_path: Option<&str>, measurement: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let problem = load_problem(input)?;
    let hhl = Hhl::from_config_with_sink(
        Some(&problem),
        &config,
        &ComponentRegistry::default(),
        std::sync::Arc::new(NullSink),
    )?;
    let built = hhl.construct_circuit(measurement)?;

    println!(
        "{} Circuit {} for {}",
        style("→").cyan().bold(),
        style(built.circuit.name()).green(),
        style(input).green()
    );
    println!(
        "  Registers: io {}, eigs {}, ancilla q{}",
        built.io.len(),
        built.eigenvalue.len(),
        built.ancilla.0
    );
    println!(
        "  Components: {} / {} / {}",
        hhl.components().eigs.name(),
        hhl.components().init_state.name(),
        hhl.components().reciprocal.name()
    );
    println!();

    let props = built.circuit.properties();
    print!("{props}");
    Ok(())
}
