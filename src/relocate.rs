use std::collections::HashSet;

use git2::Oid;
use log::{debug, info, warn};

use crate::backend::VcsBackend;
use crate::error::{Error, Result};
use crate::output::{short_id, Printer};
use crate::types::{
    BranchOutcome, PushOutcome, RelocateOptions, RelocationReport, RelocationStatus,
    ResolvedChain, Verbosity,
};

/// Replays every branch of a chain onto the amended history, one branch at a
/// time, each on top of its predecessor's new tip.
pub struct ChainRelocator<'a, B: VcsBackend> {
    backend: &'a B,
    printer: &'a Printer,
}

struct Halt {
    error: Error,
    outcome: Option<BranchOutcome>,
}

impl<'a, B: VcsBackend> ChainRelocator<'a, B> {
    pub fn new(backend: &'a B, printer: &'a Printer) -> Self {
        ChainRelocator { backend, printer }
    }

    pub fn relocate(
        &self,
        target: Oid,
        chain: &ResolvedChain,
        options: &RelocateOptions,
    ) -> Result<RelocationReport> {
        let old_tips = self.preflight(chain)?;

        let mut outcomes: Vec<BranchOutcome> = vec![];
        let mut current_base = target;
        let mut old_base = chain.old_base;

        for (index, branch_name) in chain.branches.iter().enumerate() {
            let old_tip = old_tips[index];

            info!(
                "[{}/{}] {}: {} -> onto {}",
                index + 1,
                chain.branches.len(),
                branch_name,
                short_id(&old_tip),
                short_id(&current_base)
            );

            // chain.old_base stays hidden so a branch relocated by an earlier,
            // halted run doesn't drag the pre-amend history along
            let since = [old_base, chain.old_base, current_base];

            let result = self
                .compute_new_tip(old_tip, &since, current_base, options)
                .map_err(|error| Halt {
                    error,
                    outcome: None,
                })
                .and_then(|new_tip| self.apply(branch_name, old_tip, new_tip, options));

            match result {
                Ok(outcome) => {
                    current_base = outcome.new_tip;
                    old_base = old_tip;
                    outcomes.push(outcome);
                }
                Err(halt) => {
                    // the remote may have moved even though the local ref did not
                    if let Some(outcome) = halt.outcome {
                        outcomes.push(outcome);
                    }
                    let remaining = chain.branches[index..].to_vec();

                    if halt.error.is_conflict() {
                        info!("conflict while replaying {}", branch_name);
                    } else {
                        warn!("relocation halted at {}: {}", branch_name, halt.error);
                    }

                    // simulated tips are no use for recovering by hand
                    let status = if options.dry_run {
                        RelocationStatus::WouldHalt {
                            at: branch_name.clone(),
                            reason: halt.error.to_string(),
                            remaining,
                        }
                    } else {
                        RelocationStatus::PartiallyCompleted {
                            at: branch_name.clone(),
                            reason: halt.error.to_string(),
                            remaining,
                            old_tip,
                            since: old_base,
                            onto: current_base,
                        }
                    };

                    return Ok(RelocationReport { outcomes, status });
                }
            }
        }

        let status = if options.dry_run {
            RelocationStatus::DryRun
        } else {
            RelocationStatus::Completed
        };

        Ok(RelocationReport { outcomes, status })
    }

    /// Resolves every branch before anything is touched, so a missing or
    /// repeated branch never leaves the chain half relocated.
    fn preflight(&self, chain: &ResolvedChain) -> Result<Vec<Oid>> {
        let mut seen = HashSet::new();
        let mut old_tips = Vec::with_capacity(chain.branches.len());

        for branch_name in &chain.branches {
            if !seen.insert(branch_name.as_str()) {
                return Err(Error::CycleDetected(branch_name.clone()));
            }
            old_tips.push(self.backend.resolve_ref(branch_name)?);
        }

        Ok(old_tips)
    }

    fn compute_new_tip(
        &self,
        old_tip: Oid,
        since: &[Oid],
        current_base: Oid,
        options: &RelocateOptions,
    ) -> Result<Oid> {
        let unique = self.backend.unique_commits(old_tip, since)?;

        debug!(
            "{} unique commits below {}",
            unique.len(),
            short_id(&old_tip)
        );

        if options.verbosity >= Verbosity::Verbose {
            for commit in &unique {
                self.printer
                    .detail(&format!("    {} {}", short_id(&commit.id), commit.summary));
            }
        }

        if unique.is_empty() {
            return Ok(current_base);
        }

        self.backend.replay_onto(&unique, current_base)
    }

    fn apply(
        &self,
        branch_name: &str,
        old_tip: Oid,
        new_tip: Oid,
        options: &RelocateOptions,
    ) -> std::result::Result<BranchOutcome, Halt> {
        let mut outcome = BranchOutcome {
            branch: branch_name.to_string(),
            old_tip,
            new_tip,
            local_updated: false,
            remote_updated: false,
        };

        if outcome.is_unchanged() {
            info!("{} is already up to date", branch_name);
            return Ok(outcome);
        }

        if let Some(remote) = &options.push_remote {
            let pushed = if options.dry_run {
                let exists = options.force
                    || self
                        .backend
                        .remote_branch_exists(remote, branch_name)
                        .map_err(|error| Halt {
                            error,
                            outcome: None,
                        })?;
                if exists {
                    PushOutcome::Pushed
                } else {
                    PushOutcome::RemoteMissing
                }
            } else {
                self.backend
                    .push_branch(remote, branch_name, new_tip, options.force)
                    .map_err(|error| Halt {
                        error,
                        outcome: None,
                    })?
            };

            match pushed {
                PushOutcome::Pushed => {
                    self.printer.updating_remote(branch_name, &new_tip);
                    outcome.remote_updated = !options.dry_run;
                }
                PushOutcome::RemoteMissing => {
                    warn!(
                        "{}/{} does not exist, not pushing it (use --force to create it)",
                        remote, branch_name
                    );
                }
            }
        }

        self.printer.updating_local(branch_name, &new_tip);

        if !options.dry_run {
            // history is rewritten on purpose, so the local ref is always forced
            if let Err(error) = self.backend.update_local_branch(branch_name, new_tip, true) {
                return Err(Halt {
                    error,
                    outcome: outcome.remote_updated.then_some(outcome),
                });
            }
            outcome.local_updated = true;
        }

        Ok(outcome)
    }
}
