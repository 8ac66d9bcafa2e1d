use clap::Parser;
use crossterm::style::Stylize;
use cursor_forge::cli::{self, Cli, RunStatus};
use cursor_forge::error::is_definition_error;

fn main() {
    let cli = Cli::parse();

    match cli::dispatch(cli) {
        Ok(RunStatus::Success) => {}
        Ok(RunStatus::Failures) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            // A broken build definition is distinguished from a run that failed.
            let code = if is_definition_error(&e) { 2 } else { 1 };
            std::process::exit(code);
        }
    }
}
