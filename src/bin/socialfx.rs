//! socialfx CLI tool
//!
//! Command-line interface for outline stroke and face blur effects.

#[cfg(feature = "cli")]
use socialfx::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
