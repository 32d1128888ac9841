//! `hhl backends`: registered backends and solver components.

use anyhow::Result;
use console::style;

use hhl_core::ComponentRegistry;
use hhl_hal::BackendConfig;

use super::common::backend_registry;

pub async fn execute() -> Result<()> {
    let registry = backend_registry();
    println!("{}", style("Backends").cyan().bold());

    for name in registry.available_backends() {
        let backend = registry.create(&name, BackendConfig::new(&name))?;
        let status = backend.availability().await?;
        let caps = backend.capabilities();

        let marker = if status.is_available {
            style("●").green()
        } else {
            style("○").red()
        };
        let read_out = if backend.is_statevector() {
            "amplitudes"
        } else {
            "counts, tomography"
        };
        println!(
            "  {marker} {:<22} {:>3} qubits, up to {} shots, read-out: {read_out}",
            style(&name).bold(),
            caps.num_qubits,
            caps.max_shots,
        );
        if let Some(message) = status.status_message {
            println!("      {}", style(message).dim());
        }
    }

    println!();
    println!("{}", style("Components").cyan().bold());
    for (kind, names) in ComponentRegistry::default().available() {
        println!("  {:<12} {}", style(kind).bold(), names.join(", "));
    }

    Ok(())
}
