//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use num_complex::Complex64;

use hhl_adapter_sim::SimulatorBackend;
use hhl_core::config::BackendSettings;
use hhl_core::{HhlConfig, HhlSolution, LinearSystemInput, ProbabilityResult};
use hhl_hal::{Backend, BackendRegistry};

/// Load a linear system from a YAML or JSON file.
pub fn load_problem(path: &str) -> Result<LinearSystemInput> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    LinearSystemInput::from_file(path).with_context(|| format!("Failed to load problem: {path}"))
}

/// Load the solver configuration: file, then `HHL_*` variables, then defaults.
pub fn load_config(path: Option<&str>) -> Result<HhlConfig> {
    HhlConfig::load(path).map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))
}

/// Registry of the backends this binary ships with.
pub fn backend_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<SimulatorBackend>("statevector_simulator");
    registry.register::<SimulatorBackend>("qasm_simulator");
    registry
}

/// Create the backend named in `settings`.
pub fn create_backend(settings: &BackendSettings) -> Result<Box<dyn Backend>> {
    let registry = backend_registry();
    let name = settings.name.to_lowercase();
    if !registry.has_backend(&name) {
        anyhow::bail!(
            "Unknown backend: '{}'. Available: {}",
            settings.name,
            registry.available_backends().join(", ")
        );
    }
    let mut config = settings.to_backend_config();
    config.name = name.clone();
    Ok(registry.create(&name, config)?)
}

/// Format a complex number as `a+bi`, dropping a zero imaginary part.
pub fn format_complex(z: Complex64) -> String {
    let re = clean_zero(z.re);
    let im = clean_zero(z.im);
    if im == 0.0 {
        format!("{re:.6}")
    } else if im < 0.0 {
        format!("{re:.6}-{:.6}i", -im)
    } else {
        format!("{re:.6}+{im:.6}i")
    }
}

fn clean_zero(x: f64) -> f64 {
    if x.abs() < 5e-7 { 0.0 } else { x }
}

/// JSON document for a solution.
pub fn solution_json(solution: &HhlSolution) -> serde_json::Value {
    let pairs = |values: &[Complex64]| -> Vec<[f64; 2]> {
        values.iter().map(|z| [z.re, z.im]).collect()
    };
    let probability = match solution.probability_result() {
        ProbabilityResult::Scalar(p) => serde_json::json!(p),
        ProbabilityResult::PerBasis(ps) => serde_json::json!(ps),
    };
    serde_json::json!({
        "solution": pairs(&solution.solution().to_vec()),
        "output": pairs(&solution.output().to_vec()),
        "probability_result": probability,
        "circuit_info": solution.circuit_info(),
    })
}

/// Print a solution in a table format.
pub fn print_solution(solution: &HhlSolution) {
    println!("\n{} Solution:", style("✓").green().bold());
    for (i, (x, raw)) in solution
        .solution()
        .iter()
        .zip(solution.output().iter())
        .enumerate()
    {
        println!(
            "  x[{}] = {:<28} {}",
            i,
            style(format_complex(*x)).cyan(),
            style(format!("(raw {})", format_complex(*raw))).dim()
        );
    }

    println!(
        "\n  Success probability: {}",
        style(solution.probability_result()).yellow()
    );

    let info = solution.circuit_info();
    println!(
        "  Circuit: {} qubits, {} ops, depth {}",
        info.width, info.size, info.depth
    );
}
