use std::process::ExitCode;

use ccextract::RunError;
use ccextract::cli::{Cli, USAGE_EXIT_CODE, execute};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ccextract: {e}");
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };
    init_tracing(&cli.log_filter(&config));

    match execute(&cli, &config) {
        Ok(report) => {
            info!(files = report.copied.len(), skipped = report.skipped, "done");
            ExitCode::SUCCESS
        }
        // already logged by the extractor
        Err(e) if e.is::<RunError>() => {
            ExitCode::from(e.downcast_ref::<RunError>().map_or(USAGE_EXIT_CODE, RunError::exit_code))
        }
        Err(e) => {
            eprintln!("ccextract: {e:#}");
            ExitCode::from(USAGE_EXIT_CODE)
        }
    }
}
