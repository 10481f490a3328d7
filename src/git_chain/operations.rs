use std::collections::HashSet;

use git2::Oid;
use log::debug;

use super::GitChain;
use crate::backend::VcsBackend;
use crate::error::{Error, Result};
use crate::output::short_id;
use crate::types::{Commit, PushOutcome};

impl VcsBackend for GitChain {
    fn resolve_ref(&self, name: &str) -> Result<Oid> {
        if self.git_local_branch_exists(name)? {
            return self.get_branch_commit_oid(name);
        }
        self.resolve_commit(name)
    }

    fn unique_commits(&self, from: Oid, since: &[Oid]) -> Result<Vec<Commit>> {
        let mut commits = self.commits_excluding(from, since)?;
        commits.reverse();
        Ok(commits)
    }

    fn replay_onto(&self, commits: &[Commit], new_base: Oid) -> Result<Oid> {
        // changes that reached new_base since the commits forked off
        let upstream = match commits.first().and_then(|commit| commit.parents.first()) {
            Some(fork_point) => self.patch_ids_between(*fork_point, new_base)?,
            None => HashSet::new(),
        };

        let mut base = new_base;

        for commit in commits {
            // already sits on the running base, keep it as is
            if commit.parents.first() == Some(&base) {
                base = commit.id;
                continue;
            }

            let original = self.repo.find_commit(commit.id)?;
            let was_empty = original
                .parent(0)
                .map(|parent| parent.tree_id() == original.tree_id())
                .unwrap_or(false);

            if !was_empty && upstream.contains(&self.patch_id(commit.id)?) {
                debug!(
                    "skipping {} ({}): already applied upstream",
                    short_id(&commit.id),
                    commit.summary
                );
                continue;
            }

            let onto = self.repo.find_commit(base)?;

            // git cherry-pick, without touching the working tree
            let mut index = self.repo.cherrypick_commit(&original, &onto, 0, None)?;

            if index.has_conflicts() {
                let mut files = vec![];
                for conflict in index.conflicts()? {
                    let conflict = conflict?;
                    if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
                        files.push(String::from_utf8_lossy(&entry.path).to_string());
                    }
                }
                return Err(Error::conflict(
                    format!("{} ({})", short_id(&commit.id), commit.summary),
                    short_id(&base),
                    files,
                ));
            }

            let tree_id = index.write_tree_to(&self.repo)?;

            if tree_id == onto.tree_id() && !was_empty {
                debug!(
                    "dropping {} ({}): its changes are already in {}",
                    short_id(&commit.id),
                    commit.summary,
                    short_id(&base)
                );
                continue;
            }

            let tree = self.repo.find_tree(tree_id)?;
            let committer = self
                .repo
                .signature()
                .unwrap_or_else(|_| original.committer().to_owned());

            base = self.repo.commit(
                None,
                &original.author(),
                &committer,
                original.message_raw().unwrap_or_default(),
                &tree,
                &[&onto],
            )?;

            debug!(
                "replayed {} as {} on {}",
                short_id(&commit.id),
                short_id(&base),
                short_id(&onto.id())
            );
        }

        Ok(base)
    }

    fn update_local_branch(&self, name: &str, new_tip: Oid, force: bool) -> Result<()> {
        let checked_out = self.get_current_branch_name().ok().as_deref() == Some(name);

        self.repo.reference(
            &format!("refs/heads/{}", name),
            new_tip,
            force,
            &format!("{}: relocate onto {}", self.executable_name, short_id(&new_tip)),
        )?;

        if checked_out {
            debug!("{} is checked out, updating the working tree", name);
            self.checkout_branch(name)?;
        }

        Ok(())
    }

    fn remote_branch_exists(&self, remote: &str, name: &str) -> Result<bool> {
        self.git_remote_branch_exists(remote, name)
    }

    fn push_branch(
        &self,
        remote: &str,
        name: &str,
        new_tip: Oid,
        force: bool,
    ) -> Result<PushOutcome> {
        if !force && !self.git_remote_branch_exists(remote, name)? {
            return Ok(PushOutcome::RemoteMissing);
        }

        let refspec = format!("{}:refs/heads/{}", new_tip, name);
        // the branch history was rewritten, a plain push would be rejected
        self.run_git(&["push", "-f", remote, &refspec])?;

        Ok(PushOutcome::Pushed)
    }

    fn current_checked_out_ref(&self) -> Result<String> {
        self.get_current_branch_name()
    }
}
