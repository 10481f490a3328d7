use colored::*;
use git2::Oid;

use crate::error::{Error, Result};
use crate::GitChain;

fn remote_key(branch_name: &str) -> String {
    format!("branch.{}.remote", branch_name)
}

fn merge_key(branch_name: &str) -> String {
    format!("branch.{}.merge", branch_name)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub branch_name: String,
    pub tip: Oid,
    // Local branch this one tracks (git branch --track <name> <upstream>)
    pub upstream: Option<String>,
}

impl Branch {
    pub fn get_branch(git_chain: &GitChain, branch_name: &str) -> Result<Branch> {
        if !git_chain.git_local_branch_exists(branch_name)? {
            return Err(Error::not_found(format!(
                "Branch does not exist: {}",
                branch_name.bold()
            )));
        }

        let tip = git_chain.get_branch_commit_oid(branch_name)?;
        let upstream = Branch::get_local_upstream(git_chain, branch_name)?;

        Ok(Branch {
            branch_name: branch_name.to_string(),
            tip,
            upstream,
        })
    }

    /// Upstream branch name when it is another local branch. Branches
    /// tracking a remote have no chain predecessor.
    fn get_local_upstream(git_chain: &GitChain, branch_name: &str) -> Result<Option<String>> {
        let remote = git_chain.get_git_config(&remote_key(branch_name))?;
        let merge = git_chain.get_git_config(&merge_key(branch_name))?;

        match (remote.as_deref(), merge) {
            (Some("."), Some(merge)) => Ok(Some(
                merge
                    .strip_prefix("refs/heads/")
                    .unwrap_or(&merge)
                    .to_string(),
            )),
            _ => Ok(None),
        }
    }
}
