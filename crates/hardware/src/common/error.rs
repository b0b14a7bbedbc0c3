//! Error definitions for the ROB, BOQ and configuration layer.
//!
//! This module defines the error handling for the core. It provides:
//! 1. **ROB Errors:** Capacity, retirement and squash invariant violations.
//! 2. **BOQ Errors:** Empty-queue reads, exhausted reads and cursor movement past either end.
//! 3. **Configuration Errors:** Parse, I/O and validation failures.
//!
//! ROB and BOQ errors indicate a driver bug (the driver broke a documented
//! precondition). They are returned instead of aborting so that a driver can
//! report the offending cycle before tearing the simulation down.

use thiserror::Error;

use super::ids::{SeqNum, ThreadId};

/// Branch-Outcome Queue errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BoqError {
    /// The thread's queue holds no entries.
    #[error("{0} branch outcome queue is empty")]
    Empty(ThreadId),

    /// The read cursor is already at the first entry.
    #[error("{0} branch outcome queue head cannot move before the first entry")]
    Underflow(ThreadId),

    /// The read cursor already sits one past the most recent entry.
    #[error("{0} branch outcome queue head cannot move past the last entry")]
    Overflow(ThreadId),

    /// Every recorded outcome has been consumed; nothing is under the cursor.
    #[error("{0} branch outcome queue has no unconsumed entry")]
    Exhausted(ThreadId),

    /// Thread id outside the range the queue was built for.
    #[error("{0} is not a valid branch outcome queue thread")]
    InvalidThread(ThreadId),
}

/// Reorder Buffer errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RobError {
    /// Insert attempted while every ROB entry is occupied.
    #[error("ROB is full ({capacity} entries)")]
    Full {
        /// Total ROB capacity.
        capacity: usize,
    },

    /// Retire attempted on a thread with no instructions.
    #[error("{0} has no instructions in the ROB")]
    Empty(ThreadId),

    /// Retire attempted before the head instruction could commit.
    #[error("{tid} head instruction {sn} is not ready to commit")]
    HeadNotReady {
        /// Thread whose head was retired.
        tid: ThreadId,
        /// Sequence number of the head instruction.
        sn: SeqNum,
    },

    /// Instruction inserted out of program order.
    #[error("{tid} instruction {sn} is not younger than ROB tail {tail}")]
    OutOfOrder {
        /// Thread of the inserted instruction.
        tid: ThreadId,
        /// Sequence number of the inserted instruction.
        sn: SeqNum,
        /// Sequence number of the thread's current tail.
        tail: SeqNum,
    },

    /// Thread id at or beyond the configured thread count.
    #[error("{0} is not a configured ROB thread")]
    InvalidThread(ThreadId),

    /// The squash frontier no longer names an instruction in the thread's list.
    #[error("{tid} squash cursor {frontier} is not in the ROB")]
    InvalidSquashCursor {
        /// Thread being squashed.
        tid: ThreadId,
        /// Frontier sequence number that could not be found.
        frontier: SeqNum,
    },

    /// Schedule-list access while the list is empty or in-order issue is off.
    #[error("{0} program-order schedule list is empty")]
    ScheduleEmpty(ThreadId),

    /// Drain check found instructions or an unfinished squash.
    #[error("ROB not drained: {insts} instructions in flight, {squashing} threads squashing")]
    NotDrained {
        /// Instructions still held.
        insts: usize,
        /// Threads still in the middle of a squash.
        squashing: usize,
    },

    /// A BOQ operation failed while rewinding a squashed control instruction.
    #[error("branch hint rewind failed: {0}")]
    Boq(#[from] BoqError),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for [`crate::config::Config`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A field holds a value outside its legal range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable constraint that was violated.
        reason: String,
    },
}
