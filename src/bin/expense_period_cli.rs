use std::process::ExitCode;

use expense_period::cli::{self, output, CliError};

fn main() -> ExitCode {
    expense_period::init();
    match cli::run_cli(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&err);
            if matches!(err, CliError::Usage(_)) {
                eprintln!("\n{}", cli::USAGE);
            }
            ExitCode::FAILURE
        }
    }
}
