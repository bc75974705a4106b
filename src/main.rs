mod cli;
mod config;
mod fstime;
mod metadata;
mod mods;
mod mordhau;
mod repair;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_logging();

    let mut options = cli::CliOptions {
        mods_dir: None,
        assume_yes: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mods-dir" | "-m" => {
                if let Some(path) = args.next() {
                    options.mods_dir = Some(path.into());
                } else {
                    eprintln!("--mods-dir requires a path");
                }
            }
            "--yes" | "-y" => options.assume_yes = true,
            "--help" | "-h" => {
                println!("mordmend");
                println!("  --mods-dir <path>  Audit this directory instead of the configured one");
                println!("  --yes              Repair without prompting and skip the exit pause");
                return Ok(());
            }
            _ => {}
        }
    }

    cli::run(options)
}

// Diagnostics go to stderr; stdout is the status report itself.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
