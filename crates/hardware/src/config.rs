//! Configuration for the ROB/BOQ core.
//!
//! This module defines the configuration structures used to parameterize the
//! reorder buffer and branch-outcome queue. It provides:
//! 1. **Defaults:** Baseline sizes used when a field is omitted.
//! 2. **Structures:** Hierarchical config for threads, ROB, issue mode and branch hints.
//! 3. **Enums:** SMT ROB sharing policy.
//! 4. **Loading:** JSON parsing from strings and files, plus range validation.
//!
//! Every field also accepts its camel-case CPU parameter name (`numROBEntries`,
//! `squashWidth`, ...), so existing parameter dumps load unchanged.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::constants::{
    DEFAULT_ROB_ENTRIES, DEFAULT_SMT_ROB_THRESHOLD, DEFAULT_SQUASH_WIDTH, MAX_THREADS,
};
use crate::common::error::ConfigError;

mod defaults {
    use super::{DEFAULT_ROB_ENTRIES, DEFAULT_SMT_ROB_THRESHOLD, DEFAULT_SQUASH_WIDTH};

    pub const NUM_THREADS: usize = 1;
    pub const ROB_ENTRIES: usize = DEFAULT_ROB_ENTRIES;
    pub const SQUASH_WIDTH: usize = DEFAULT_SQUASH_WIDTH;
    pub const SMT_THRESHOLD: usize = DEFAULT_SMT_ROB_THRESHOLD;
}

/// How ROB entries are shared between SMT threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SmtRobPolicy {
    /// Every thread may occupy the full ROB.
    #[default]
    Dynamic,
    /// The ROB is split evenly between active threads.
    Partitioned,
    /// Every thread is capped at `smt_threshold`, or the full ROB when alone.
    Threshold,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use o3rob_core::config::{Config, SmtRobPolicy};
///
/// let json = r#"{
///     "general": { "num_threads": 2 },
///     "rob": {
///         "num_entries": 64,
///         "squash_width": 4,
///         "smt_policy": "Partitioned"
///     },
///     "issue": { "in_program_order": true },
///     "branch_hints": { "enabled": true, "outcome_file": "outcomes.txt" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.rob.num_entries, 64);
/// assert_eq!(config.rob.smt_policy, SmtRobPolicy::Partitioned);
/// assert!(config.issue.in_program_order);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Thread count and other global settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Reorder buffer sizing and squash bandwidth
    #[serde(default)]
    pub rob: RobConfig,
    /// Issue-mode settings
    #[serde(default)]
    pub issue: IssueConfig,
    /// Branch-outcome hint settings
    #[serde(default)]
    pub branch_hints: BranchHintConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks every field against its legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threads = self.general.num_threads;
        if threads == 0 || threads > MAX_THREADS {
            return Err(ConfigError::Invalid {
                field: "num_threads",
                reason: format!("{threads} is outside 1..={MAX_THREADS}"),
            });
        }
        if self.rob.num_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "num_entries",
                reason: "ROB must have at least one entry".into(),
            });
        }
        if self.rob.squash_width == 0 {
            return Err(ConfigError::Invalid {
                field: "squash_width",
                reason: "squash width must be at least one".into(),
            });
        }
        if self.rob.smt_policy == SmtRobPolicy::Threshold
            && self.rob.smt_threshold > self.rob.num_entries
        {
            return Err(ConfigError::Invalid {
                field: "smt_threshold",
                reason: format!(
                    "{} exceeds ROB capacity {}",
                    self.rob.smt_threshold, self.rob.num_entries
                ),
            });
        }
        Ok(())
    }
}

/// Global settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Number of hardware threads sharing the ROB
    #[serde(default = "GeneralConfig::default_num_threads", alias = "numThreads")]
    pub num_threads: usize,
}

impl GeneralConfig {
    fn default_num_threads() -> usize {
        defaults::NUM_THREADS
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            num_threads: defaults::NUM_THREADS,
        }
    }
}

/// Reorder buffer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RobConfig {
    /// Total ROB capacity shared by all threads
    #[serde(default = "RobConfig::default_num_entries", alias = "numROBEntries")]
    pub num_entries: usize,

    /// Maximum instructions unwound per squash step
    #[serde(default = "RobConfig::default_squash_width", alias = "squashWidth")]
    pub squash_width: usize,

    /// SMT sharing policy
    #[serde(default, alias = "smtROBPolicy")]
    pub smt_policy: SmtRobPolicy,

    /// Per-thread cap for the `Threshold` policy
    #[serde(default = "RobConfig::default_smt_threshold", alias = "smtROBThreshold")]
    pub smt_threshold: usize,
}

impl RobConfig {
    fn default_num_entries() -> usize {
        defaults::ROB_ENTRIES
    }

    fn default_squash_width() -> usize {
        defaults::SQUASH_WIDTH
    }

    fn default_smt_threshold() -> usize {
        defaults::SMT_THRESHOLD
    }
}

impl Default for RobConfig {
    fn default() -> Self {
        Self {
            num_entries: defaults::ROB_ENTRIES,
            squash_width: defaults::SQUASH_WIDTH,
            smt_policy: SmtRobPolicy::default(),
            smt_threshold: defaults::SMT_THRESHOLD,
        }
    }
}

/// Issue-mode configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueConfig {
    /// Track a program-order schedule list alongside the ROB
    #[serde(default, alias = "issueInProgramOrder")]
    pub in_program_order: bool,
}

/// Branch-outcome hint configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchHintConfig {
    /// Feed fetch from the BOQ and rewind it on squash
    #[serde(default, alias = "utilizeBranchHints")]
    pub enabled: bool,

    /// File the BOQ is populated from (read by the driver, not by this crate)
    #[serde(default, alias = "branchOutcomeFile")]
    pub outcome_file: Option<PathBuf>,
}
