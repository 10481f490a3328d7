use std::process::{self, Command};

use colored::*;
use git2::{
    BranchType, Config, ConfigLevel, ErrorClass, ErrorCode, ObjectType, Oid, Repository,
};
use log::{debug, trace};
use regex::Regex;

use super::GitChain;
use crate::error::{Error, Result};
use crate::executable_name;

impl GitChain {
    pub fn init() -> Result<Self> {
        let name_of_current_executable = executable_name();

        let repo = match Repository::discover(".") {
            Ok(repo) => repo,
            Err(ref e)
                if e.class() == ErrorClass::Repository && e.code() == ErrorCode::NotFound =>
            {
                eprintln!(
                    "{} Not a git repository (or any of the parent directories)",
                    "error:".red().bold()
                );
                eprintln!(
                    "\n{} This command must be run inside a git repository.",
                    "hint:".yellow().bold()
                );
                eprintln!(
                    "{} Run {} to create a new git repository.",
                    "hint:".yellow().bold(),
                    "git init".bold()
                );
                process::exit(2);
            }
            Err(e) => return Err(e.into()),
        };

        if repo.is_bare() {
            return Err(Error::Usage(format!(
                "Cannot run {} on bare git repository.",
                name_of_current_executable
            )));
        }

        let git_chain = GitChain {
            repo,
            executable_name: name_of_current_executable,
        };
        Ok(git_chain)
    }

    pub fn get_current_branch_name(&self) -> Result<String> {
        if self.repo.head_detached()? {
            return Err(Error::DetachedHead);
        }

        let head = match self.repo.head() {
            Ok(head) => Some(head),
            Err(ref e)
                if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound =>
            {
                None
            }
            Err(e) => return Err(e.into()),
        };

        let head = head.as_ref().and_then(|h| h.shorthand());

        match head {
            Some(branch_name) => Ok(branch_name.to_string()),
            None => Err(Error::not_found("Unable to get current branch name.")),
        }
    }

    pub fn get_local_git_config(&self) -> Result<Config> {
        Ok(self.repo.config()?.open_level(ConfigLevel::Local)?)
    }

    pub fn get_git_config(&self, key: &str) -> Result<Option<String>> {
        let local_config = self.get_local_git_config()?;
        match local_config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(ref e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_git_configs_matching_key(&self, regexp: &Regex) -> Result<Vec<(String, String)>> {
        let local_config = self.get_local_git_config()?;
        let mut entries = vec![];

        local_config.entries(None)?.for_each(|entry| {
            if let (Some(key), Some(value)) = (entry.name(), entry.value()) {
                if regexp.is_match(key) {
                    entries.push((key.to_string(), value.to_string()));
                }
            }
        })?;

        Ok(entries)
    }

    /// Points the working tree at `branch_name` after its ref moved underneath
    /// it. Only called for a clean working directory.
    pub fn checkout_branch(&self, branch_name: &str) -> Result<()> {
        let (object, reference) = self
            .repo
            .revparse_ext(&format!("refs/heads/{}", branch_name))?;

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_tree(&object, Some(&mut checkout))?;

        match reference.as_ref().and_then(|r| r.name()) {
            Some(ref_name) => self.repo.set_head(ref_name)?,
            None => self.repo.set_head_detached(object.id())?,
        }

        Ok(())
    }

    pub fn git_local_branch_exists(&self, branch_name: &str) -> Result<bool> {
        match self.repo.find_branch(branch_name, BranchType::Local) {
            Ok(_branch) => Ok(true),
            Err(ref e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn git_remote_branch_exists(&self, remote: &str, branch_name: &str) -> Result<bool> {
        let remote_branch = format!("{}/{}", remote, branch_name);
        match self.repo.find_branch(&remote_branch, BranchType::Remote) {
            Ok(_branch) => Ok(true),
            Err(ref e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn remote_exists(&self, remote: &str) -> Result<bool> {
        match self.repo.find_remote(remote) {
            Ok(_remote) => Ok(true),
            Err(ref e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(ref e) if e.class() == ErrorClass::Config => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_branch_commit_oid(&self, branch_name: &str) -> Result<Oid> {
        let branch = match self.repo.find_branch(branch_name, BranchType::Local) {
            Ok(branch) => branch,
            Err(ref e) if e.code() == ErrorCode::NotFound => {
                return Err(Error::not_found(format!(
                    "Branch does not exist: {}",
                    branch_name.bold()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let commit = branch.get().peel_to_commit()?;
        Ok(commit.id())
    }

    pub fn dirty_working_directory(&self) -> Result<bool> {
        // perform equivalent to git diff-index HEAD
        let obj = self.repo.revparse_single("HEAD")?;
        let tree = obj.peel(ObjectType::Tree)?;

        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(tree.as_tree(), None)?;

        let diff_stats = diff.stats()?;
        let has_changes = diff_stats.files_changed() > 0
            || diff_stats.insertions() > 0
            || diff_stats.deletions() > 0;

        Ok(has_changes)
    }

    /// Runs a git subcommand in the repository's working directory and
    /// returns its trimmed stdout.
    pub fn run_git(&self, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.join(" "));
        debug!("{}", command);

        let mut git = Command::new("git");
        if let Some(workdir) = self.repo.workdir() {
            git.current_dir(workdir);
        }
        let output = git.args(args).output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        trace!("-> result: {}", output.status.code().unwrap_or(-1));
        if !stdout.is_empty() {
            trace!("-> stdout:\n{}", stdout.trim_end());
        }
        if !stderr.is_empty() {
            trace!("-> stderr:\n{}", stderr.trim_end());
        }

        if !output.status.success() {
            return Err(Error::git_command_failed(
                command,
                output.status.code().unwrap_or(1),
                stdout,
                stderr,
            ));
        }

        Ok(stdout.trim().to_string())
    }
}
