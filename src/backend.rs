//! The repository operations the relocator needs, kept behind a trait so the
//! relocation kernel can run against an in-memory repository in tests.

use git2::Oid;

use crate::error::Result;
use crate::types::{Commit, PushOutcome};

pub trait VcsBackend {
    /// Resolve a branch name or revision to a commit.
    ///
    /// Fails with `Error::NotFound` when nothing matches.
    fn resolve_ref(&self, name: &str) -> Result<Oid>;

    /// Commits reachable from `from` but from none of `since`, oldest first.
    fn unique_commits(&self, from: Oid, since: &[Oid]) -> Result<Vec<Commit>>;

    /// Re-apply `commits` on top of `new_base` and return the new tip.
    ///
    /// A commit whose change is already in `new_base` (same patch id, or a
    /// replay that leaves the base tree as it is) is dropped.
    /// Fails with `Error::Conflict` when a commit does not apply cleanly.
    fn replay_onto(&self, commits: &[Commit], new_base: Oid) -> Result<Oid>;

    fn update_local_branch(&self, name: &str, new_tip: Oid, force: bool) -> Result<()>;

    /// Whether `<remote>/<name>` is known locally. Never touches the network.
    fn remote_branch_exists(&self, remote: &str, name: &str) -> Result<bool>;

    /// Point `<remote>/<name>` at `new_tip`, overwriting whatever it held.
    ///
    /// Without `force`, a branch that has no counterpart on the remote is left
    /// alone and reported as `PushOutcome::RemoteMissing`; with `force` it is
    /// created.
    fn push_branch(&self, remote: &str, name: &str, new_tip: Oid, force: bool)
        -> Result<PushOutcome>;

    /// Name of the checked-out branch, or `Error::DetachedHead`.
    fn current_checked_out_ref(&self) -> Result<String>;
}
