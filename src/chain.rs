use std::collections::{HashMap, HashSet};

use colored::*;
use git2::Oid;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::output::short_id;
use crate::types::{ResolvedChain, StrategyKind};
use crate::{Branch, GitChain};

/// The top of the chain as the operator named it.
#[derive(Debug, Clone)]
pub struct ChainHead {
    pub name: String,
    pub tip: Oid,
    // Set when the head names a local branch
    pub branch: Option<String>,
}

impl ChainHead {
    pub fn resolve(git_chain: &GitChain, name: &str) -> Result<ChainHead> {
        let branch = if git_chain.git_local_branch_exists(name)? {
            Some(name.to_string())
        } else {
            None
        };

        let tip = match &branch {
            Some(branch_name) => git_chain.get_branch_commit_oid(branch_name)?,
            None => git_chain.resolve_commit(name)?,
        };

        Ok(ChainHead {
            name: name.to_string(),
            tip,
            branch,
        })
    }
}

pub enum Discovery {
    // The head already contains the target, nothing to relocate
    AlreadyBasedOnTarget,

    Chain(ResolvedChain),
}

/// Picks the branches that make up the chain once the pre-amend base is known.
///
/// `target` is the amended commit. Branches an earlier, halted run already
/// moved onto it still belong to the chain.
pub trait ChainStrategy {
    fn branches(
        &self,
        git_chain: &GitChain,
        head: &ChainHead,
        old_base: Oid,
        target: Oid,
    ) -> Result<Vec<String>>;
}

/// Every local branch pointing into the straight line of commits from the
/// pre-amend base up to the head, oldest first. A branch already relocated
/// onto the target is placed by matching its commits' patch ids against that
/// line.
pub struct AncestryChain;

/// Follows `branch.<name>.merge` upstream links from the head branch down to
/// the first branch that is built neither on the pre-amend base nor on the
/// target.
pub struct TrackingChain;

/// Branches named on the command line, in the given order.
pub struct ExplicitChain(pub Vec<String>);

impl ChainStrategy for AncestryChain {
    fn branches(
        &self,
        git_chain: &GitChain,
        head: &ChainHead,
        old_base: Oid,
        target: Oid,
    ) -> Result<Vec<String>> {
        let mut range = git_chain.commits_between(old_base, head.tip)?;
        range.reverse();

        let mut positions: HashMap<Oid, usize> = HashMap::new();
        let mut patch_positions: HashMap<Oid, usize> = HashMap::new();
        positions.insert(old_base, 0);
        for (index, commit) in range.iter().enumerate() {
            positions.insert(commit.id, index + 1);
            patch_positions.insert(git_chain.patch_id(commit.id)?, index + 1);
        }

        let mut branches: Vec<(usize, String)> = vec![];
        for (name, tip) in git_chain.local_branch_tips()? {
            if let Some(position) = positions.get(&tip) {
                branches.push((*position, name));
            } else if let Some(position) =
                relocated_position(git_chain, tip, target, &patch_positions)?
            {
                debug!("{} was already relocated onto the target", name);
                branches.push((position, name));
            }
        }

        // sort is stable, so branches on the same commit keep name order
        branches.sort_by_key(|(position, _name)| *position);

        Ok(branches.into_iter().map(|(_position, name)| name).collect())
    }
}

/// Position in the chain of a branch that sits on top of `target`, when
/// every commit it adds is the replay of a commit from the chain.
fn relocated_position(
    git_chain: &GitChain,
    tip: Oid,
    target: Oid,
    patch_positions: &HashMap<Oid, usize>,
) -> Result<Option<usize>> {
    if tip == target || !git_chain.is_ancestor(target, tip)? {
        return Ok(None);
    }

    let commits = match git_chain.commits_between(target, tip) {
        Ok(commits) => commits,
        Err(Error::MergeCommit(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut newest = None;
    for commit in &commits {
        match patch_positions.get(&git_chain.patch_id(commit.id)?) {
            Some(position) => newest = newest.or(Some(*position)),
            None => return Ok(None),
        }
    }

    // commits are newest first
    Ok(newest)
}

impl ChainStrategy for TrackingChain {
    fn branches(
        &self,
        git_chain: &GitChain,
        head: &ChainHead,
        old_base: Oid,
        target: Oid,
    ) -> Result<Vec<String>> {
        let start = match &head.branch {
            Some(branch_name) => branch_name.clone(),
            None => {
                return Err(Error::Usage(format!(
                    "Tracking discovery needs a branch as head, got: {}",
                    head.name.bold()
                )));
            }
        };

        let mut visited: HashSet<String> = HashSet::new();
        let mut branches = vec![];
        let mut current = start;

        loop {
            if !visited.insert(current.clone()) {
                return Err(Error::CycleDetected(current));
            }

            let branch = Branch::get_branch(git_chain, &current)?;
            let relocated = branch.tip != target && git_chain.is_ancestor(target, branch.tip)?;
            if !relocated && !git_chain.is_ancestor(old_base, branch.tip)? {
                debug!(
                    "{} is not built on {}, stopping",
                    current,
                    short_id(&old_base)
                );
                break;
            }

            branches.push(branch.branch_name);

            match branch.upstream {
                Some(upstream) => current = upstream,
                None => break,
            }
        }

        branches.reverse();
        Ok(branches)
    }
}

impl ChainStrategy for ExplicitChain {
    fn branches(
        &self,
        git_chain: &GitChain,
        _head: &ChainHead,
        _old_base: Oid,
        _target: Oid,
    ) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        for branch_name in &self.0 {
            if !seen.insert(branch_name.as_str()) {
                return Err(Error::CycleDetected(branch_name.clone()));
            }
            if !git_chain.git_local_branch_exists(branch_name)? {
                return Err(Error::not_found(format!(
                    "Branch does not exist: {}",
                    branch_name.bold()
                )));
            }
        }
        Ok(self.0.clone())
    }
}

pub fn strategy_for(kind: StrategyKind, explicit: Option<Vec<String>>) -> Box<dyn ChainStrategy> {
    match (explicit, kind) {
        (Some(branches), _) => Box::new(ExplicitChain(branches)),
        (None, StrategyKind::Ancestry) => Box::new(AncestryChain),
        (None, StrategyKind::Tracking) => Box::new(TrackingChain),
    }
}

/// Finds the commit `target` was amended from: the newest commit between the
/// merge base and the head whose summary matches the target's.
///
/// Returns `None` when the head already contains the target.
pub fn find_predecessor(git_chain: &GitChain, head: &ChainHead, target: Oid) -> Result<Option<Oid>> {
    let merge_base = git_chain.merge_base(head.tip, target)?.ok_or_else(|| {
        Error::not_found(format!(
            "{} and the target have no common history",
            head.name.bold()
        ))
    })?;

    if merge_base == target {
        return Ok(None);
    }

    let target_commit = git_chain.find_commit_info(target)?;

    let predecessor = git_chain
        .commits_between(merge_base, head.tip)?
        .into_iter()
        .find(|commit| commit.summary == target_commit.summary);

    match predecessor {
        Some(commit) => {
            info!(
                "{} ({}) was amended into {}",
                short_id(&commit.id),
                commit.summary,
                short_id(&target)
            );
            Ok(Some(commit.id))
        }
        None => Err(Error::not_found(format!(
            "Unable to identify the predecessor of {} in the current chain. Please specify it explicitly with --base and try again",
            target_commit.summary.bold()
        ))),
    }
}

/// Works out the pre-amend base and the chain of branches built on it.
pub fn resolve_chain(
    git_chain: &GitChain,
    strategy: &dyn ChainStrategy,
    head: &ChainHead,
    target: Oid,
    base: Option<Oid>,
) -> Result<Discovery> {
    let old_base = match base {
        Some(base) => {
            if !git_chain.is_ancestor(base, head.tip)? {
                return Err(Error::not_found(format!(
                    "{} is not an ancestor of {}",
                    short_id(&base),
                    head.name.bold()
                )));
            }
            base
        }
        None => match find_predecessor(git_chain, head, target)? {
            Some(old_base) => old_base,
            None => return Ok(Discovery::AlreadyBasedOnTarget),
        },
    };

    let branches = strategy.branches(git_chain, head, old_base, target)?;

    if branches.is_empty() {
        return Err(Error::not_found(format!(
            "No local branches found between {} and {}",
            short_id(&old_base),
            head.name.bold()
        )));
    }

    Ok(Discovery::Chain(ResolvedChain { old_base, branches }))
}
