//! Program-order schedule list.
//!
//! When in-order issue is enabled the ROB keeps, per thread, a shadow list of
//! `(address, sequence number)` pairs mirroring its own occupancy. Issue logic
//! reads the head of this list to learn which instruction must go next.
//!
//! Entries are sorted by sequence number, so squash removal is a range drain
//! keyed on sequence numbers rather than a walk with a stored position.

use std::collections::VecDeque;
use std::ops::RangeInclusive;

use crate::common::{MAX_THREADS, SeqNum, ThreadId};

/// One instruction in program order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Address of the instruction.
    pub inst_addr: u64,
    /// Sequence number of the instruction.
    pub seq_num: SeqNum,
}

/// Per-thread program-order lists.
#[derive(Debug)]
pub struct ScheduleList {
    lists: Vec<VecDeque<ScheduleEntry>>,
}

impl Default for ScheduleList {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleList {
    /// Creates empty lists for every possible thread.
    pub fn new() -> Self {
        let mut lists = Vec::with_capacity(MAX_THREADS);
        lists.resize_with(MAX_THREADS, VecDeque::new);
        Self { lists }
    }

    /// Appends an entry; callers insert in program order.
    pub fn push(&mut self, tid: ThreadId, entry: ScheduleEntry) {
        if let Some(list) = self.lists.get_mut(tid.index()) {
            list.push_back(entry);
        }
    }

    /// Oldest entry of the thread.
    pub fn front(&self, tid: ThreadId) -> Option<&ScheduleEntry> {
        self.lists.get(tid.index()).and_then(VecDeque::front)
    }

    /// Removes and returns the oldest entry of the thread.
    pub fn pop_front(&mut self, tid: ThreadId) -> Option<ScheduleEntry> {
        self.lists.get_mut(tid.index()).and_then(VecDeque::pop_front)
    }

    /// Number of entries held for the thread.
    pub fn len(&self, tid: ThreadId) -> usize {
        self.lists.get(tid.index()).map_or(0, VecDeque::len)
    }

    /// True if the thread's list is empty.
    pub fn is_empty(&self, tid: ThreadId) -> bool {
        self.len(tid) == 0
    }

    /// Iterates the thread's entries oldest first.
    pub fn iter(&self, tid: ThreadId) -> impl Iterator<Item = &ScheduleEntry> {
        self.lists.get(tid.index()).into_iter().flatten()
    }

    /// Removes every entry whose sequence number lies in `range`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_range(&mut self, tid: ThreadId, range: RangeInclusive<SeqNum>) -> usize {
        let Some(list) = self.lists.get_mut(tid.index()) else {
            return 0;
        };
        if range.is_empty() {
            return 0;
        }
        let lo = list.partition_point(|e| e.seq_num < *range.start());
        let hi = list.partition_point(|e| e.seq_num <= *range.end());
        list.drain(lo..hi).count()
    }

    /// True if any entry's sequence number lies in `range`.
    pub fn contains_range(&self, tid: ThreadId, range: RangeInclusive<SeqNum>) -> bool {
        let Some(list) = self.lists.get(tid.index()) else {
            return false;
        };
        let lo = list.partition_point(|e| e.seq_num < *range.start());
        list.get(lo).is_some_and(|e| e.seq_num <= *range.end())
    }

    /// Empties every thread's list.
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}
