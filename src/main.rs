//! resetctl - GPU reset coordination tool
//!
//! A command-line front end for exercising the reset domain, handler
//! dispatch, and coredump recorder against a simulated accelerator.

use clap::Parser;
use resetctl::cli::args::{generate_completions, Cli, Commands};
use resetctl::commands::{run_coredump, run_simulate};
use resetctl::config::ConfigFile;
use resetctl::error::AppError;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default().unwrap_or_default(),
    };

    match &cli.command {
        Commands::Simulate(args) => run_simulate(args, cli.format, &config),

        Commands::Coredump(args) => run_coredump(args, &config),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Reset(resetctl::error::ResetError::Unsupported) => {
            eprintln!();
            eprintln!("Hint: This hardware revision has no custom reset handler,");
            eprintln!("      or the requested method is not supported by it.");
            eprintln!("      Known revisions: 13.0.2, 13.0.6 (mode2); 11.0.7, 13.0.10 (psp).");
        }
        AppError::Reset(resetctl::error::ResetError::ResetFailed(_)) => {
            eprintln!();
            eprintln!("Hint: The reset itself failed; device state is indeterminate");
            eprintln!("      and a full reinitialization should be assumed.");
        }
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Hint: Check the configuration file syntax.");
            eprintln!("      See resetctl.toml for the expected layout.");
        }
        _ => {}
    }
}
