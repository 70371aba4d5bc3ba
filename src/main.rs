use clap::{value_parser, Arg, ArgAction, Command};
use hypescript::{run_file, RunError};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = Command::new("hypescript")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interpreter for HypeScript, a small C-like scripting language")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .required(true)
                .index(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log interpreter internals to stderr (-v debug, -vv trace); RUST_LOG overrides")
                .action(ArgAction::Count),
        )
        .get_matches();

    init_tracing(matches.get_count("verbose"));

    let Some(path) = matches.get_one::<PathBuf>("file") else {
        return ExitCode::FAILURE;
    };

    match run_file(path) {
        Ok(()) => ExitCode::SUCCESS,
        // Diagnostics have already been reported.
        Err(RunError::Syntax { count }) => {
            tracing::debug!(count, "refusing to run a script with syntax errors");
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}
