//! Branch-Outcome Queue (BOQ).
//!
//! The BOQ holds precomputed branch outcomes that fetch uses as direction and
//! target hints. It provides:
//! 1. **Insertion:** Outcomes are appended per thread. Each appended outcome has already been
//!    handed to fetch, so the cursor moves one past it.
//! 2. **Reads:** The cursor names the next unconsumed entry; fetch reads it after a rewind.
//! 3. **Rewind:** Squash steps the cursor back once per unwound control instruction,
//!    so the hint is supplied again when the instruction is re-fetched.
//!
//! Entries are never removed; only the cursor moves. The cursor ranges over
//! `0..=len`: it never precedes the first entry and never exceeds one past the
//! last. After `k` inserts, `k` rewinds bring it back to the first entry.

use tracing::{debug, trace};

use crate::common::{BoqError, MAX_THREADS, MicroPc, PcState, ThreadId};

/// One recorded branch outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoqEntry {
    /// Address of the branch.
    pub pc: u64,
    /// Fall-through address of the branch.
    pub next_pc: u64,
    /// Address control transferred to.
    pub branch_target_pc: u64,
    /// Address following the branch target.
    pub branch_target_next_pc: u64,
    /// Micro-op index at the target.
    pub target_micro_pc: MicroPc,
    /// Micro-op index following the target.
    pub target_micro_next_pc: MicroPc,
    /// True if the branch was taken.
    pub direction: bool,
}

#[derive(Debug, Default)]
struct ThreadQueue {
    entries: Vec<BoqEntry>,
    /// Next unconsumed entry; `entries.len()` when everything was consumed.
    head: usize,
}

/// Per-thread branch-outcome queues.
#[derive(Debug)]
pub struct Boq {
    queues: Vec<ThreadQueue>,
}

impl Default for Boq {
    fn default() -> Self {
        Self::new()
    }
}

impl Boq {
    /// Creates an empty BOQ with a queue for every possible thread.
    pub fn new() -> Self {
        let mut queues = Vec::with_capacity(MAX_THREADS);
        queues.resize_with(MAX_THREADS, ThreadQueue::default);
        Self { queues }
    }

    fn queue(&self, tid: ThreadId) -> Result<&ThreadQueue, BoqError> {
        self.queues
            .get(tid.index())
            .ok_or(BoqError::InvalidThread(tid))
    }

    fn queue_mut(&mut self, tid: ThreadId) -> Result<&mut ThreadQueue, BoqError> {
        self.queues
            .get_mut(tid.index())
            .ok_or(BoqError::InvalidThread(tid))
    }

    /// Appends a branch outcome and moves the cursor one past it.
    ///
    /// # Arguments
    ///
    /// * `pc` - PC state of the branch itself (pc and fall-through).
    /// * `next_pc` - PC state the branch resolved to (target and its successor).
    /// * `target_upc` / `target_nupc` - Micro-op components of the target.
    /// * `direction` - Whether the branch was taken.
    pub fn insert_branch_outcome(
        &mut self,
        tid: ThreadId,
        pc: &PcState,
        next_pc: &PcState,
        target_upc: MicroPc,
        target_nupc: MicroPc,
        direction: bool,
    ) -> Result<(), BoqError> {
        let entry = BoqEntry {
            pc: pc.pc,
            next_pc: pc.npc,
            branch_target_pc: next_pc.pc,
            branch_target_next_pc: next_pc.npc,
            target_micro_pc: target_upc,
            target_micro_next_pc: target_nupc,
            direction,
        };
        debug!(
            %tid,
            pc = format_args!("{:#x}", entry.pc),
            target = format_args!("{:#x}", entry.branch_target_pc),
            direction,
            "adding branch outcome to BOQ"
        );

        let queue = self.queue_mut(tid)?;
        queue.entries.push(entry);
        queue.head = queue.entries.len();
        trace!(%tid, len = queue.entries.len(), "BOQ size");
        Ok(())
    }

    /// Returns the entry under the cursor.
    ///
    /// Fails with [`BoqError::Empty`] if nothing was ever recorded and with
    /// [`BoqError::Exhausted`] if the cursor sits one past the last entry.
    pub fn read_entry(&self, tid: ThreadId) -> Result<&BoqEntry, BoqError> {
        let queue = self.queue(tid)?;
        if queue.entries.is_empty() {
            return Err(BoqError::Empty(tid));
        }
        queue
            .entries
            .get(queue.head)
            .ok_or(BoqError::Exhausted(tid))
    }

    /// Steps the cursor one entry toward the oldest outcome.
    ///
    /// Fails without moving the cursor if the queue is empty or the cursor
    /// already rests on the first entry.
    pub fn decrement_head(&mut self, tid: ThreadId) -> Result<(), BoqError> {
        let queue = self.queue_mut(tid)?;
        if queue.entries.is_empty() {
            return Err(BoqError::Empty(tid));
        }
        if queue.head == 0 {
            return Err(BoqError::Underflow(tid));
        }
        queue.head -= 1;
        trace!(%tid, head = queue.head, "BOQ head decremented");
        Ok(())
    }

    /// Steps the cursor one entry toward the newest outcome, consuming the
    /// entry it leaves.
    pub fn advance_head(&mut self, tid: ThreadId) -> Result<(), BoqError> {
        let queue = self.queue_mut(tid)?;
        if queue.entries.is_empty() {
            return Err(BoqError::Empty(tid));
        }
        if queue.head >= queue.entries.len() {
            return Err(BoqError::Overflow(tid));
        }
        queue.head += 1;
        trace!(%tid, head = queue.head, "BOQ head advanced");
        Ok(())
    }

    /// Number of outcomes recorded for the thread.
    pub fn len(&self, tid: ThreadId) -> usize {
        self.queue(tid).map_or(0, |q| q.entries.len())
    }

    /// True if no outcome has been recorded for the thread.
    pub fn is_empty(&self, tid: ThreadId) -> bool {
        self.len(tid) == 0
    }

    /// Index of the cursor within the thread's queue, `None` while it is empty.
    pub fn head_index(&self, tid: ThreadId) -> Option<usize> {
        self.queue(tid)
            .ok()
            .filter(|q| !q.entries.is_empty())
            .map(|q| q.head)
    }
}
