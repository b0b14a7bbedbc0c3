//! ROB statistics collection.
//!
//! This module tracks activity counters for the reorder buffer. It provides:
//! 1. **Access counts:** Logical ROB reads and writes.
//! 2. **Lifecycle counts:** Instructions inserted, retired and squashed.
//! 3. **Squash cost:** Number of bounded squash steps and BOQ rewinds.
//!
//! Counters never influence behavior. Formatting beyond a one-line summary is
//! left to whoever consumes the serialized values.

use std::fmt;

use serde::Serialize;

/// Activity counters for one ROB instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RobStats {
    /// Number of ROB reads (head readiness checks).
    pub reads: u64,
    /// Number of ROB writes (insert, retire attempt, squash step).
    pub writes: u64,

    /// Instructions inserted.
    pub inserted: u64,
    /// Instructions retired from the head.
    pub retired: u64,
    /// Instructions removed by squash.
    pub squashed: u64,
    /// `do_squash` invocations that unwound at least one instruction or finished a session.
    pub squash_steps: u64,
    /// BOQ cursor rewinds caused by squashed control instructions.
    pub boq_rewinds: u64,
}

impl RobStats {
    /// Clears every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for RobStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rob.reads={} rob.writes={} inserted={} retired={} squashed={} squash_steps={} boq_rewinds={}",
            self.reads,
            self.writes,
            self.inserted,
            self.retired,
            self.squashed,
            self.squash_steps,
            self.boq_rewinds
        )
    }
}
