//! HHL Command-Line Interface
//!
//! Solves `A x = b` with the HHL algorithm on a local simulator.
//!
//! ```text
//!   hhl run -i problem.yaml -b qasm_simulator -s 4096 --seed 7
//!   hhl circuit -i problem.yaml --measurement
//!   hhl backends
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, circuit, run, version};

/// HHL - quantum linear-system solver
#[derive(Parser)]
#[command(name = "hhl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Solver configuration file (YAML or JSON)
    #[arg(short, long, global = true, env = "HHL_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a linear system
    Run {
        /// Problem file with `matrix` and `vector` (YAML or JSON)
        #[arg(short, long)]
        input: String,

        /// Backend to use (statevector_simulator, qasm_simulator)
        #[arg(short, long)]
        backend: Option<String>,

        /// Number of shots for sampling backends
        #[arg(short, long)]
        shots: Option<u32>,

        /// Sampling seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Build the HHL circuit and print its statistics
    Circuit {
        /// Problem file with `matrix` and `vector` (YAML or JSON)
        #[arg(short, long)]
        input: String,

        /// Measure the success ancilla
        #[arg(long)]
        measurement: bool,
    },

    /// List available backends and solver components
    Backends,

    /// Show version information
    Version,
}

fn init_tracing(verbose: u8) {
    let default_level = ["warn", "info", "debug"]
        .get(usize::from(verbose))
        .copied()
        .unwrap_or("trace");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let outcome = match cli.command {
        Commands::Run {
            input,
            backend,
            shots,
            seed,
            format,
        } => {
            let overrides = run::Overrides {
                backend,
                shots,
                seed,
            };
            run::execute(&input, config, overrides, &format).await
        }
        Commands::Circuit { input, measurement } => circuit::execute(&input, config, measurement),
        Commands::Backends => backends::execute().await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}
