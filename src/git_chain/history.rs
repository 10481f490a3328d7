use std::collections::HashSet;

use colored::*;
use git2::{BranchType, ErrorCode, Oid, Sort};

use super::GitChain;
use crate::error::{Error, Result};
use crate::types::Commit;

impl GitChain {
    pub fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        match self.repo.revparse_single(revision) {
            Ok(object) => Ok(object.peel_to_commit()?.id()),
            Err(ref e) if e.code() == ErrorCode::NotFound || e.code() == ErrorCode::Ambiguous => {
                Err(Error::not_found(format!(
                    "Unable to resolve {} to a commit",
                    revision.bold()
                )))
            }
            Err(ref e) if e.class() == git2::ErrorClass::Invalid => Err(Error::not_found(
                format!("Unable to resolve {} to a commit", revision.bold()),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub fn merge_base(&self, one: Oid, two: Oid) -> Result<Option<Oid>> {
        match self.repo.merge_base(one, two) {
            Ok(oid) => Ok(Some(oid)),
            Err(ref e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    pub fn find_commit_info(&self, oid: Oid) -> Result<Commit> {
        let commit = self.repo.find_commit(oid)?;
        Ok(Commit {
            id: commit.id(),
            parents: commit.parent_ids().collect(),
            summary: commit.summary().unwrap_or_default().to_string(),
        })
    }

    /// Commits reachable from `head` but not from `since`, newest first.
    ///
    /// A chain is a straight line of commits, so any merge commit in the range
    /// is an error.
    pub fn commits_between(&self, since: Oid, head: Oid) -> Result<Vec<Commit>> {
        self.commits_excluding(head, &[since])
    }

    /// Like `commits_between`, hiding everything reachable from any of `hidden`.
    pub fn commits_excluding(&self, head: Oid, hidden: &[Oid]) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;
        revwalk.push(head)?;
        for oid in hidden {
            revwalk.hide(*oid)?;
        }

        let mut commits = vec![];
        for oid in revwalk {
            let commit = self.find_commit_info(oid?)?;
            if commit.parents.len() > 1 {
                return Err(Error::MergeCommit(commit.id.to_string()));
            }
            commits.push(commit);
        }

        Ok(commits)
    }

    /// Stable id of the change a commit introduces, as `git patch-id` computes
    /// it. Equal for a commit and its cherry-picks.
    pub fn patch_id(&self, oid: Oid) -> Result<Oid> {
        let commit = self.repo.find_commit(oid)?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };
        let tree = commit.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        Ok(diff.patchid(None)?)
    }

    /// Patch ids of the non-merge commits reachable from `head` but not from
    /// `since`.
    pub fn patch_ids_between(&self, since: Oid, head: Oid) -> Result<HashSet<Oid>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(head)?;
        revwalk.hide(since)?;

        let mut patch_ids = HashSet::new();
        for oid in revwalk {
            let oid = oid?;
            if self.repo.find_commit(oid)?.parent_count() > 1 {
                continue;
            }
            patch_ids.insert(self.patch_id(oid)?);
        }

        Ok(patch_ids)
    }

    /// Every local branch and the commit it points at, sorted by name.
    pub fn local_branch_tips(&self) -> Result<Vec<(String, Oid)>> {
        let mut tips = vec![];

        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _branch_type) = branch?;
            let name = match branch.name()? {
                Some(name) => name.to_string(),
                None => continue,
            };
            let tip = branch.get().peel_to_commit()?.id();
            tips.push((name, tip));
        }

        tips.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(tips)
    }
}
