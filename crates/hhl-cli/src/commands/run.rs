//! Run command implementation.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use hhl_core::{ComponentRegistry, Hhl};

use super::common::{create_backend, load_config, load_problem, print_solution, solution_json};

/// Command-line values that take precedence over the configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub backend: Option<String>,
    pub shots: Option<u32>,
    pub seed: Option<u64>,
}

/// Execute the run command.
pub async fn execute(
    input: &str,
    config_path: Option<&str>,
    overrides: Overrides,
    format: &str,
) -> Result<()> {
    let json = match format.to_lowercase().as_str() {
        "table" => false,
        "json" => true,
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    };

    let mut config = load_config(config_path)?;
    if let Some(backend) = overrides.backend {
        config.backend.name = backend;
    }
    if let Some(shots) = overrides.shots {
        config.backend.shots = shots;
    }
    if let Some(seed) = overrides.seed {
        config.backend.seed = Some(seed);
    }
    config.validate()?;

    let problem = load_problem(input)?;
    let backend = create_backend(&config.backend)?;
    debug!(backend = backend.name(), shots = config.backend.shots, "backend created");

    if !json {
        println!(
            "{} Solving {} on {}",
            style("→").cyan().bold(),
            style(input).green(),
            style(backend.name()).yellow()
        );
    }

    let hhl = Hhl::from_config(Some(&problem), &config, &ComponentRegistry::default())?;
    if !json {
        let (num_q, num_a) = hhl.components().eigs.register_sizes();
        println!(
            "  Dimension {} (original {}), {} io + {} eigenvalue qubits",
            hhl.problem().dimension(),
            hhl.problem().original_dimension(),
            num_q,
            num_a
        );
    }

    let status = backend.availability().await?;
    if !status.is_available {
        anyhow::bail!(
            "Backend '{}' is not available: {}",
            backend.name(),
            status.status_message.as_deref().unwrap_or("no reason given")
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Running HHL...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let solution = hhl.run(backend.as_ref()).await;
    spinner.finish_and_clear();
    let solution = solution?;

    if json {
        println!("{}", serde_json::to_string_pretty(&solution_json(&solution))?);
    } else {
        print_solution(&solution);
    }

    Ok(())
}
