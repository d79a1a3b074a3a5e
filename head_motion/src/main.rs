//! head_motion — command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use head_motion::app::run;
use head_motion::config::Cli;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match cli.into_config() {
        Ok(cfg) => cfg,
        Err(e)  => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Head Motion — Headphone Motion Playground           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    if let Err(e) = run(cfg) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
