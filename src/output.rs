use colored::*;
use git2::Oid;

use crate::error::Result;
use crate::types::{RelocationReport, RelocationStatus, Verbosity};

pub fn setup_logging(verbosity: Verbosity) {
    // RUST_LOG still wins over the -v/-q flags
    env_logger::Builder::new()
        .filter_level(verbosity.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

pub fn short_id(oid: &Oid) -> String {
    let id = oid.to_string();
    id[..7.min(id.len())].to_string()
}

/// Operator-facing output. Diagnostics go through `log` instead.
pub struct Printer {
    verbosity: Verbosity,
    json: bool,
}

impl Printer {
    pub fn new(verbosity: Verbosity, json: bool) -> Self {
        Printer { verbosity, json }
    }

    #[cfg(test)]
    pub fn quiet() -> Self {
        Printer::new(Verbosity::Quiet, false)
    }

    fn enabled(&self, level: Verbosity) -> bool {
        !self.json && self.verbosity >= level
    }

    pub fn line(&self, message: &str) {
        if self.enabled(Verbosity::Normal) {
            println!("{}", message);
        }
    }

    pub fn detail(&self, message: &str) {
        if self.enabled(Verbosity::Verbose) {
            println!("{}", message);
        }
    }

    pub fn updating_remote(&self, branch_name: &str, new_tip: &Oid) {
        self.line(&format!(
            "Updating remote {} to {}",
            branch_name.red(),
            new_tip.to_string().yellow()
        ));
    }

    pub fn updating_local(&self, branch_name: &str, new_tip: &Oid) {
        self.line(&format!(
            "Updating {} to {}",
            branch_name.green(),
            new_tip.to_string().yellow()
        ));
    }

    pub fn print_plan(&self, target: &Oid, old_base: &Oid, branches: &[String]) {
        self.detail(&format!(
            "Relocating {} {} from {} onto {}",
            branches.len(),
            if branches.len() == 1 {
                "branch"
            } else {
                "branches"
            },
            short_id(old_base).yellow(),
            short_id(target).yellow()
        ));
        for (index, branch_name) in branches.iter().enumerate() {
            self.detail(&format!("{:>6}. {}", index + 1, branch_name.bold()));
        }
    }

    pub fn print_report(&self, report: &RelocationReport, executable_name: &str) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        match &report.status {
            RelocationStatus::Completed => {
                if report.updated_count() == 0 {
                    self.line("Chain is already up-to-date.");
                } else {
                    self.line("");
                    self.line(&format!(
                        "🎉 Successfully relocated {} of {} branches",
                        report.updated_count(),
                        report.outcomes.len()
                    ));
                }
            }
            RelocationStatus::DryRun => {
                self.line("");
                self.line(&format!(
                    "Dry run: {} of {} branches would be updated. No refs were changed.",
                    report.updated_count(),
                    report.outcomes.len()
                ));
            }
            RelocationStatus::PartiallyCompleted {
                at,
                reason,
                remaining,
                old_tip,
                since,
                onto,
            } => {
                // Always shown, even with --quiet.
                eprintln!(
                    "{} Relocation halted at branch {}",
                    "🛑".red(),
                    at.bold()
                );
                eprintln!("{}", reason);
                eprintln!();

                let updated: Vec<&str> = report
                    .outcomes
                    .iter()
                    .filter(|o| o.local_updated)
                    .map(|o| o.branch.as_str())
                    .collect();
                if !updated.is_empty() {
                    eprintln!("Already updated: {}", updated.join(", "));
                }
                eprintln!("Not processed: {}", remaining.join(", "));
                eprintln!(
                    "{} Updated branches keep their new tips. Nothing was rolled back.",
                    "⚠️ ".yellow()
                );
                eprintln!();
                eprintln!("To finish by hand, rebase {} and resolve the conflicts:", at.bold());
                eprintln!("   git rebase --onto {} {} {}", onto, since, at);
                if let Some(last) = remaining.last().filter(|last| *last != at) {
                    eprintln!("then relocate the rest of the chain onto it:");
                    eprintln!(
                        "   {} -@ {} --base {} {}",
                        executable_name, last, old_tip, at
                    );
                }
            }
            RelocationStatus::WouldHalt {
                at,
                reason,
                remaining,
            } => {
                eprintln!(
                    "{} Dry run: relocation would halt at branch {}",
                    "🛑".red(),
                    at.bold()
                );
                eprintln!("{}", reason);
                eprintln!();

                let would_update: Vec<&str> = report
                    .outcomes
                    .iter()
                    .filter(|o| !o.is_unchanged())
                    .map(|o| o.branch.as_str())
                    .collect();
                if !would_update.is_empty() {
                    eprintln!("Would be updated: {}", would_update.join(", "));
                }
                eprintln!("Not processed: {}", remaining.join(", "));
                eprintln!("No refs were changed.");
            }
        }

        Ok(())
    }
}
