use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("Branch {0} appears more than once in the chain")]
    CycleDetected(String),

    #[error("HEAD is detached. Check out a branch or pass -@ <head>")]
    DetachedHead,

    #[error("Chain contains a merge commit: {0}\nMerge commits cannot be relocated.")]
    MergeCommit(String),

    #[error("Branch {0} is checked out and has uncommitted changes.\nPlease commit or stash them before relocating the chain.")]
    DirtyWorkingDirectory(String),

    #[error("Unable to replay {commit} onto {onto}\nConflicting files:\n{files}")]
    Conflict {
        commit: String,
        onto: String,
        files: String,
    },

    #[error("Git command failed: {command}\nStatus: {status}\nStdout: {stdout}\nStderr: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
    },

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    pub fn conflict(commit: String, onto: String, files: Vec<String>) -> Self {
        let files = if files.is_empty() {
            "  (unknown)".to_string()
        } else {
            files
                .iter()
                .map(|f| format!("  {}", f))
                .collect::<Vec<_>>()
                .join("\n")
        };
        Error::Conflict {
            commit,
            onto,
            files,
        }
    }

    pub fn git_command_failed(command: String, status: i32, stdout: String, stderr: String) -> Self {
        Error::CommandFailed {
            command,
            status,
            stdout,
            stderr,
        }
    }

    /// Resolution errors exit with 2 and never leave a ref changed.
    /// Anything that can happen once mutation has begun exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound(_)
            | Error::CycleDetected(_)
            | Error::DetachedHead
            | Error::MergeCommit(_)
            | Error::DirtyWorkingDirectory(_)
            | Error::Usage(_) => 2,
            Error::Conflict { .. }
            | Error::CommandFailed { .. }
            | Error::Git(_)
            | Error::Io(_)
            | Error::Json(_) => 1,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }
}
