//! Main entry point for the sjzip CLI app

use sjzip::cli;
use sjzip::cli_runner;
use sjzip::progress::{self, ProgressCallback, ProgressEvent};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive, e.g. `SJZIP_LOG=debug`.
const LOG_ENV: &str = "SJZIP_LOG";

const USAGE_EXIT: u8 = 2;

fn main() -> std::process::ExitCode {
    let args = cli::run();
    init_logging(args.verbose);

    match run_app(&args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) if e.is_usage() => {
            // Nothing was created; same status clap uses for bad arguments.
            eprintln!("{}", e);
            std::process::ExitCode::from(USAGE_EXIT)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn run_app(args: &cli::Args) -> Result<(), sjzip::ArchiverError> {
    let opts = args.to_run_options();
    let print_progress = |event: &ProgressEvent| {
        if let Some(line) = progress::console_line(event) {
            println!("{}", line);
        }
    };

    let cb: ProgressCallback<'_> = &print_progress;
    let outcome = cli_runner::run(&opts, Some(cb))?;

    // The only record of a generated password.
    if let Some(generated) = outcome.password.generated() {
        println!("Generated password: {}", generated);
    }
    println!("Created {}", outcome.archive.display());
    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.is_empty() => EnvFilter::new(directive),
        _ => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
