use std::ffi::OsString;
use std::process;

use clap::ErrorKind;
use colored::*;

mod backend;
mod branch;
mod chain;
mod cli;
mod commands;
mod config;
mod error;
mod git_chain;
mod output;
mod relocate;
mod types;

use cli::parse_arg_matches;
use commands::run;

// Re-export for use by other modules
pub use branch::Branch;
pub use git_chain::GitChain;

pub fn executable_name() -> String {
    let name = std::env::current_exe()
        .ok()
        .and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    if name.starts_with("git-") && name.len() > 4 {
        let tmp: Vec<String> = name.split("git-").map(|x| x.to_string()).collect();
        let git_cmd = &tmp[1];
        return format!("git {}", git_cmd);
    }
    name
}

fn run_app<I, T>(arguments: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let arg_matches = match parse_arg_matches(arguments) {
        Ok(arg_matches) => arg_matches,
        Err(err) => match err.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => {
                println!("{}", err.message);
                return 0;
            }
            _ => {
                eprintln!("{}", err.message);
                return 2;
            }
        },
    };

    match run(arg_matches) {
        Ok(exit_code) => exit_code,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            err.exit_code()
        }
    }
}

fn main() {
    process::exit(run_app(std::env::args_os()));
}
