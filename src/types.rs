use git2::Oid;
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum Verbosity {
    // Only errors
    Quiet,

    // Ref updates and the final summary
    Normal,

    // Plan details
    Verbose,

    // Every git command
    Debug,

    // Git command output
    Trace,
}

impl Verbosity {
    pub fn from_flags(verbose_count: u64, quiet: bool) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match verbose_count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            2 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }

    pub fn log_level(self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Error,
            Verbosity::Normal => log::LevelFilter::Warn,
            Verbosity::Verbose => log::LevelFilter::Info,
            Verbosity::Debug => log::LevelFilter::Debug,
            Verbosity::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum StrategyKind {
    // Branches pointing into the linear history between the old base and head
    Ancestry,

    // Branches linked through branch.<name>.merge upstream config
    Tracking,
}

impl StrategyKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ancestry" => Some(StrategyKind::Ancestry),
            "tracking" => Some(StrategyKind::Tracking),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelocateOptions {
    pub dry_run: bool,
    pub push_remote: Option<String>,
    pub force: bool,
    pub verbosity: Verbosity,
}

impl Default for RelocateOptions {
    fn default() -> Self {
        RelocateOptions {
            dry_run: false,
            push_remote: None,
            force: false,
            verbosity: Verbosity::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub id: Oid,
    pub parents: Vec<Oid>,
    pub summary: String,
}

/// The pre-amend base commit together with the branches built on top of it,
/// nearest to the base first.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChain {
    pub old_base: Oid,
    pub branches: Vec<String>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PushOutcome {
    Pushed,

    // No <remote>/<branch> exists and the push was not forced
    RemoteMissing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchOutcome {
    pub branch: String,
    #[serde(serialize_with = "serialize_oid")]
    pub old_tip: Oid,
    #[serde(serialize_with = "serialize_oid")]
    pub new_tip: Oid,
    pub local_updated: bool,
    pub remote_updated: bool,
}

impl BranchOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.old_tip == self.new_tip
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelocationStatus {
    Completed,
    PartiallyCompleted {
        at: String,
        reason: String,
        remaining: Vec<String>,
        // The halted branch's old tip, its old base and the base it was being moved onto
        #[serde(serialize_with = "serialize_oid")]
        old_tip: Oid,
        #[serde(serialize_with = "serialize_oid")]
        since: Oid,
        #[serde(serialize_with = "serialize_oid")]
        onto: Oid,
    },
    DryRun,

    // A dry run that stopped where a real run would halt
    WouldHalt {
        at: String,
        reason: String,
        remaining: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelocationReport {
    pub outcomes: Vec<BranchOutcome>,
    #[serde(flatten)]
    pub status: RelocationStatus,
}

impl RelocationReport {
    pub fn empty() -> Self {
        RelocationReport {
            outcomes: vec![],
            status: RelocationStatus::Completed,
        }
    }

    pub fn updated_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_unchanged()).count()
    }

    pub fn exit_code(&self) -> i32 {
        match self.status {
            RelocationStatus::PartiallyCompleted { .. } | RelocationStatus::WouldHalt { .. } => 1,
            RelocationStatus::Completed | RelocationStatus::DryRun => 0,
        }
    }
}

fn serialize_oid<S>(oid: &Oid, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&oid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(0, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(2, false), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(7, false), Verbosity::Trace);
    }

    #[test]
    fn partial_report_serializes_status_inline() {
        let report = RelocationReport {
            outcomes: vec![],
            status: RelocationStatus::PartiallyCompleted {
                at: "c".to_string(),
                reason: "conflict".to_string(),
                remaining: vec!["c".to_string(), "d".to_string()],
                old_tip: Oid::zero(),
                since: Oid::zero(),
                onto: Oid::zero(),
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "partially_completed");
        assert_eq!(json["at"], "c");
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn dry_run_halt_is_its_own_status() {
        let report = RelocationReport {
            outcomes: vec![],
            status: RelocationStatus::WouldHalt {
                at: "c".to_string(),
                reason: "conflict".to_string(),
                remaining: vec!["c".to_string()],
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "would_halt");
        assert_eq!(json["remaining"][0], "c");
        assert_eq!(report.exit_code(), 1);
    }
}
