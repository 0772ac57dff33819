use anyhow::{Context, Result};
use clap::Parser;

use isx_cli::args::{CliArgs, Command};
use isx_cli::{driver, tracing_config};

fn main() -> Result<()> {
    // Initialize tracing if ISX_LOG is set (zero cost otherwise).
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    match &args.command {
        Command::Complete(complete) => {
            let output = driver::run_complete(complete, &cwd)?;
            print!("{output}");
            if !output.is_empty() && !output.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
