//! Logo normalization CLI tool
//!
//! Keys out logo backgrounds and writes light/dark canvas variants using the
//! logo-normalize library.

#[cfg(feature = "cli")]
use logo_normalize::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
