//! Module Tool - Unreal project and plugin scaffolding

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = module_tool::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
