//! SMT capacity policies for the ROB.
//!
//! A [`CapacityPolicy`] decides how many ROB entries each hardware thread may
//! occupy. The per-thread caps live in [`ThreadCaps`] and are recomputed by
//! the policy whenever the driver changes the active-thread set.

use tracing::debug;

use crate::common::{MAX_THREADS, ThreadId};
use crate::config::{RobConfig, SmtRobPolicy};

/// Runtime capacity policy, carrying only the fields each variant needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Every thread may use the whole ROB.
    Dynamic,
    /// The ROB is divided evenly between active threads.
    Partitioned,
    /// Threads are capped at `threshold`, or the whole ROB when alone.
    Threshold {
        /// Per-thread cap while more than one thread is active.
        threshold: usize,
    },
}

/// Per-thread entry caps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadCaps {
    max_entries: [usize; MAX_THREADS],
    unassigned: usize,
}

impl ThreadCaps {
    /// Cap for `tid`; zero for threads that were never configured.
    pub fn get(&self, tid: ThreadId) -> usize {
        self.max_entries.get(tid.index()).copied().unwrap_or(0)
    }

    /// Entries left over by integer division under `Partitioned`.
    pub const fn unassigned(&self) -> usize {
        self.unassigned
    }

    /// Sum of every thread's cap.
    pub fn total(&self) -> usize {
        self.max_entries.iter().sum()
    }
}

impl CapacityPolicy {
    /// Builds the runtime policy from the ROB configuration.
    pub const fn from_config(config: &RobConfig) -> Self {
        match config.smt_policy {
            SmtRobPolicy::Dynamic => Self::Dynamic,
            SmtRobPolicy::Partitioned => Self::Partitioned,
            SmtRobPolicy::Threshold => Self::Threshold {
                threshold: config.smt_threshold,
            },
        }
    }

    /// Caps at construction, when all `num_threads` threads are assumed active.
    ///
    /// Threads at or beyond `num_threads` get a zero cap.
    pub fn initial_caps(self, num_entries: usize, num_threads: usize) -> ThreadCaps {
        let num_threads = num_threads.clamp(1, MAX_THREADS);
        let (per_thread, unassigned) = match self {
            Self::Dynamic => (num_entries, 0),
            Self::Partitioned => (
                num_entries / num_threads,
                num_entries % num_threads,
            ),
            Self::Threshold { threshold } => (threshold, 0),
        };

        let mut max_entries = [0; MAX_THREADS];
        for cap in max_entries.iter_mut().take(num_threads) {
            *cap = per_thread;
        }
        debug!(policy = ?self, per_thread, unassigned, "ROB sharing policy set");
        ThreadCaps {
            max_entries,
            unassigned,
        }
    }

    /// Recomputes caps after the active-thread set changed.
    ///
    /// `Partitioned` gives every active thread an equal share and zeroes the
    /// rest, so the caps plus [`ThreadCaps::unassigned`] always add up to
    /// `num_entries`. `Threshold` promotes a lone active thread to the full ROB
    /// and demotes threads back to the threshold once others become active.
    /// `Dynamic` never changes.
    pub fn recompute(self, caps: &mut ThreadCaps, num_entries: usize, active: &[ThreadId]) {
        let active_count = active.len();
        if active_count == 0 {
            return;
        }

        match self {
            Self::Dynamic => {}
            Self::Partitioned => {
                let share = num_entries / active_count;
                caps.max_entries = [0; MAX_THREADS];
                let mut assigned = 0;
                for tid in active {
                    if let Some(cap) = caps.max_entries.get_mut(tid.index()) {
                        *cap = share;
                        assigned += share;
                    }
                }
                caps.unassigned = num_entries - assigned;
            }
            Self::Threshold { threshold } => {
                let cap = if active_count == 1 {
                    num_entries
                } else {
                    threshold
                };
                for tid in active {
                    if let Some(slot) = caps.max_entries.get_mut(tid.index()) {
                        *slot = cap;
                    }
                }
            }
        }
        debug!(policy = ?self, active = active_count, "ROB entries reset");
    }

    /// Per-thread share `Partitioned` would assign to `num_threads` threads.
    ///
    /// Zero for the other policies, which do not partition.
    pub const fn entry_amount(self, num_entries: usize, num_threads: usize) -> usize {
        match self {
            Self::Partitioned if num_threads > 0 => num_entries / num_threads,
            _ => 0,
        }
    }
}
