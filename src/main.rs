//! validate-infrastructure CLI entry point
//!
//! Post-deploy validation for the Glue ingestion pipeline infrastructure.

use clap::error::ErrorKind;
use clap::Parser;
use infra_validator::cli::args::{Args, USAGE, USAGE_EXAMPLE};
use infra_validator::cli::logging;
use infra_validator::cli::output::get_formatter;
use infra_validator::version::get_build_info;
use infra_validator::{InfraError, InfrastructureValidator, RunOptions};

use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            print_usage();
            return ExitCode::from(1);
        }
    };

    if args.version {
        println!("{}", get_build_info());
        return ExitCode::SUCCESS;
    }

    logging::init(&args.log_level);

    let config = match args.validator_config() {
        Ok(config) => config,
        Err(InfraError::Usage(message)) => {
            eprintln!("Error: {}", message);
            print_usage();
            return ExitCode::from(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    };

    let options = RunOptions::from_args(&args);
    if config.mode.includes_deep() && options.timeout_ms <= config.trigger.timeout.as_millis() as u64
    {
        tracing::warn!(
            timeout_ms = options.timeout_ms,
            trigger_timeout_ms = config.trigger.timeout.as_millis() as u64,
            "per-check timeout does not exceed the trigger wait; the trigger test will stop waiting early"
        );
    }

    let validator = Arc::new(InfrastructureValidator::connect(config).await);
    let report = match validator.run_all_validations(&options).await {
        Ok(report) => report,
        Err(InfraError::Usage(message)) => {
            eprintln!("Error: {}", message);
            print_usage();
            return ExitCode::from(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    };

    let formatter = get_formatter(&args.format, args.no_color, args.verbose, args.quiet);
    println!("{}", formatter.format(&report));

    ExitCode::from(report.exit_code() as u8)
}

fn print_usage() {
    eprintln!("Usage: {}", USAGE);
    eprintln!("Example: {}", USAGE_EXAMPLE);
}
