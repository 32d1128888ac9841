//! `hhl version`.

use console::style;

const CRATES: &[(&str, &str)] = &[
    ("hhl-ir", "circuits, registers, gates"),
    ("hhl-hal", "backend trait and result records"),
    ("hhl-core", "preprocessing, circuit assembly, read-out"),
    ("hhl-adapter-sim", "statevector and sampling simulator"),
    ("hhl-cli", "this binary"),
];

pub fn execute() {
    println!(
        "{} {}",
        style("hhl").cyan().bold(),
        style(env!("CARGO_PKG_VERSION")).yellow()
    );
    for (krate, role) in CRATES {
        println!("  {krate:<16} {}", style(role).dim());
    }
}
