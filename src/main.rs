//! subway - Line and section management for a subway network

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = subway::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
