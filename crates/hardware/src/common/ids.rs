//! Instruction sequence numbers and hardware thread identifiers.
//!
//! This module defines strong types for the two identifiers every in-flight
//! instruction carries. It provides the following:
//! 1. **Program Order:** `SeqNum` orders instructions within a thread and is the squash threshold.
//! 2. **Thread Identity:** `ThreadId` names an SMT hardware context and indexes per-thread state.
//! 3. **Log Formatting:** `Display` impls matching the `[sn:N]` / `[tid:N]` log convention.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-thread monotonic instruction sequence number.
///
/// Sequence numbers are assigned at fetch in program order. A larger number is
/// always younger than a smaller one within the same thread.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SeqNum(pub u64);

impl SeqNum {
    /// Creates a new sequence number from a raw value.
    #[inline(always)]
    pub const fn new(sn: u64) -> Self {
        Self(sn)
    }

    /// Returns the raw sequence number value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[sn:{}]", self.0)
    }
}

/// Identifier of a simulated hardware thread (SMT context).
///
/// These are not host threads: every per-thread structure is accessed from the
/// single simulation loop.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ThreadId(pub u8);

impl ThreadId {
    /// Creates a new thread id.
    #[inline(always)]
    pub const fn new(tid: u8) -> Self {
        Self(tid)
    }

    /// Returns the thread id as an index into per-thread arrays.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tid:{}]", self.0)
    }
}
