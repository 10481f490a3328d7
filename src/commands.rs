use std::io::{self, BufRead, IsTerminal, Write};

use clap::ArgMatches;
use colored::*;
use log::{debug, info};

use crate::backend::VcsBackend;
use crate::chain::{resolve_chain, strategy_for, ChainHead, Discovery};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::git_chain::GitChain;
use crate::output::{setup_logging, Printer};
use crate::relocate::ChainRelocator;
use crate::types::{RelocateOptions, RelocationReport, StrategyKind, Verbosity};

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn run(arg_matches: ArgMatches) -> Result<i32> {
    let verbosity = Verbosity::from_flags(
        arg_matches.occurrences_of("verbose"),
        arg_matches.is_present("quiet"),
    );
    setup_logging(verbosity);

    let json = arg_matches.is_present("json");
    let printer = Printer::new(verbosity, json);

    let git_chain = GitChain::init()?;
    let settings = Settings::load(&git_chain)?;
    debug!("settings: {:?}", settings);

    let dry_run = arg_matches.is_present("dry");
    let force = arg_matches.is_present("force");

    let push_remote = arg_matches
        .value_of("push")
        .map(|remote| remote.to_string())
        .or_else(|| settings.remote.clone());

    if let Some(remote) = &push_remote {
        if !git_chain.remote_exists(remote)? {
            return Err(Error::not_found(format!(
                "Remote does not exist: {}",
                remote.bold()
            )));
        }
    }

    let head_name = match arg_matches.value_of("head") {
        Some(head_name) => head_name.to_string(),
        None => git_chain.get_current_branch_name()?,
    };
    let head = ChainHead::resolve(&git_chain, &head_name)?;

    let target_name = arg_matches.value_of("target").unwrap_or("HEAD");
    let target = git_chain.resolve_commit(target_name)?;

    let base = match arg_matches.value_of("base") {
        Some(base) => Some(git_chain.resolve_commit(base)?),
        None => None,
    };

    let explicit = arg_matches
        .values_of("chain")
        .map(|values| values.map(|value| value.to_string()).collect::<Vec<_>>());
    let kind = if arg_matches.is_present("tracking") {
        StrategyKind::Tracking
    } else {
        settings.strategy
    };
    let strategy = strategy_for(kind, explicit);

    let chain = match resolve_chain(&git_chain, strategy.as_ref(), &head, target, base)? {
        Discovery::AlreadyBasedOnTarget => {
            if json {
                printer.print_report(&RelocationReport::empty(), &git_chain.executable_name)?;
            } else {
                printer.line(&format!(
                    "{} is already based on {}. Nothing to be done!",
                    "Head".bold(),
                    "target".bold()
                ));
            }
            return Ok(0);
        }
        Discovery::Chain(chain) => chain,
    };

    if !dry_run {
        // a detached HEAD is never one of the chain's branches
        if let Ok(checked_out) = git_chain.current_checked_out_ref() {
            if chain.branches.contains(&checked_out) && git_chain.dirty_working_directory()? {
                return Err(Error::DirtyWorkingDirectory(checked_out));
            }
        }
    }

    printer.print_plan(&target, &chain.old_base, &chain.branches);

    if let Some(remote) = &push_remote {
        if !force && !dry_run && io::stdin().is_terminal() {
            let question = format!(
                "Force-push {} {} to {}?",
                chain.branches.len(),
                if chain.branches.len() == 1 {
                    "branch"
                } else {
                    "branches"
                },
                remote.bold()
            );
            if !confirm(&question)? {
                info!("aborted by the operator");
                printer.line("Aborted. No refs were changed.");
                return Ok(0);
            }
        }
    }

    let options = RelocateOptions {
        dry_run,
        push_remote,
        force,
        verbosity,
    };

    let relocator = ChainRelocator::new(&git_chain, &printer);
    let report = relocator.relocate(target, &chain, &options)?;

    printer.print_report(&report, &git_chain.executable_name)?;

    Ok(report.exit_code())
}
