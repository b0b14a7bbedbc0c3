//! Reorder Buffer (ROB) for SMT out-of-order commit.
//!
//! The ROB tracks in-flight instructions per hardware thread from dispatch
//! through commit. It provides:
//! 1. **Insertion:** Appends dispatched instructions to their thread's list in program order.
//! 2. **Capacity Policy:** Caps per-thread occupancy according to the SMT sharing policy.
//! 3. **In-order Retirement:** Removes the head of a thread once it is ready to commit.
//! 4. **Squash:** Unwinds instructions younger than a threshold, a bounded number per call,
//!    rewinding the branch-outcome queue for every squashed control instruction.
//! 5. **Global Head/Tail:** Merges the per-thread lists into the oldest and youngest
//!    instruction across the active threads.
//!
//! Instructions are held as shared [`DynInstPtr`] handles; the ROB keeps one
//! clone per occupied slot and drops it on retirement or squash.

/// SMT capacity policies.
pub mod policy;

/// Program-order schedule list for in-order issue.
pub mod schedule;

/// Resumable squash state machine.
pub mod squash;

use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};

pub use self::policy::{CapacityPolicy, ThreadCaps};
pub use self::schedule::{ScheduleEntry, ScheduleList};
pub use self::squash::{SquashSession, SquashState, SquashStep};

use super::boq::Boq;
use super::dyn_inst::{DynInst, DynInstPtr};
use super::traits::RobDriver;
use crate::common::{ConfigError, RobError, SeqNum, ThreadId};
use crate::config::Config;
use crate::stats::RobStats;

/// Reorder Buffer shared by up to `num_threads` hardware threads.
#[derive(Debug)]
pub struct Rob<I> {
    policy: CapacityPolicy,
    caps: ThreadCaps,
    /// Total capacity across all threads.
    num_entries: usize,
    /// Instructions unwound per squash step.
    squash_width: usize,
    num_threads: usize,
    /// Instructions currently held, summed over threads.
    num_insts: usize,
    /// Per-thread lists, oldest at the front.
    insts: Vec<VecDeque<DynInstPtr<I>>>,
    squash_states: Vec<SquashState>,
    /// Present only when in-order issue is enabled.
    schedule: Option<ScheduleList>,
    /// Present only when branch hints are enabled.
    boq: Option<Boq>,
    stats: RobStats,
}

impl<I: DynInst> Rob<I> {
    /// Builds a ROB from a configuration, validating it first.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let num_threads = config.general.num_threads;
        let num_entries = config.rob.num_entries;
        let policy = CapacityPolicy::from_config(&config.rob);
        let caps = policy.initial_caps(num_entries, num_threads);

        let mut insts = Vec::with_capacity(num_threads);
        insts.resize_with(num_threads, VecDeque::new);

        debug!(
            num_entries,
            num_threads,
            squash_width = config.rob.squash_width,
            in_program_order = config.issue.in_program_order,
            branch_hints = config.branch_hints.enabled,
            "ROB created"
        );

        Ok(Self {
            policy,
            caps,
            num_entries,
            squash_width: config.rob.squash_width,
            num_threads,
            num_insts: 0,
            insts,
            squash_states: vec![SquashState::Idle; num_threads],
            schedule: config.issue.in_program_order.then(ScheduleList::new),
            boq: config.branch_hints.enabled.then(Boq::new),
            stats: RobStats::default(),
        })
    }

    pub(crate) fn thread_index(&self, tid: ThreadId) -> Result<usize, RobError> {
        let idx = tid.index();
        if idx < self.num_threads {
            Ok(idx)
        } else {
            Err(RobError::InvalidThread(tid))
        }
    }

    /// Position of the instruction with sequence number `sn` in list `idx`.
    pub(crate) fn position_of(&self, idx: usize, sn: SeqNum) -> Option<usize> {
        let list = self.insts.get(idx)?;
        let pos = list.partition_point(|inst| inst.seq_num() < sn);
        (list.get(pos)?.seq_num() == sn).then_some(pos)
    }

    fn thread_list(&self, tid: ThreadId) -> Option<&VecDeque<DynInstPtr<I>>> {
        self.insts.get(tid.index())
    }

    /// Total ROB capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.num_entries
    }

    /// Number of configured hardware threads.
    #[inline]
    pub const fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Instructions unwound per `do_squash` call.
    #[inline]
    pub const fn squash_width(&self) -> usize {
        self.squash_width
    }

    /// The SMT capacity policy in force.
    #[inline]
    pub const fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    /// Maximum entries `tid` may currently occupy.
    pub fn max_entries(&self, tid: ThreadId) -> usize {
        self.caps.get(tid)
    }

    /// Entries not assigned to any thread by the `Partitioned` policy.
    pub const fn unassigned_entries(&self) -> usize {
        self.caps.unassigned()
    }

    /// Recomputes per-thread caps for a new active-thread set.
    pub fn reset_entries(&mut self, active: &[ThreadId]) {
        self.policy
            .recompute(&mut self.caps, self.num_entries, active);
    }

    /// Entries per thread if the ROB were partitioned `num_threads` ways.
    pub const fn entry_amount(&self, num_threads: usize) -> usize {
        self.policy.entry_amount(self.num_entries, num_threads)
    }

    /// Instructions held across every thread.
    pub fn count_insts(&self) -> usize {
        self.insts.iter().map(VecDeque::len).sum()
    }

    /// Instructions held by `tid`.
    pub fn count_insts_for(&self, tid: ThreadId) -> usize {
        self.thread_list(tid).map_or(0, VecDeque::len)
    }

    /// Occupancy counter maintained on insert, retire and squash.
    #[inline]
    pub const fn num_insts_in_rob(&self) -> usize {
        self.num_insts
    }

    /// True if no thread holds an instruction.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.num_insts == 0
    }

    /// True if `tid` holds no instruction.
    pub fn is_empty_for(&self, tid: ThreadId) -> bool {
        self.count_insts_for(tid) == 0
    }

    /// True if every entry is occupied.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.num_insts >= self.num_entries
    }

    /// Free entries in the whole ROB.
    #[inline]
    pub const fn num_free_entries(&self) -> usize {
        self.num_entries - self.num_insts
    }

    /// Free entries `tid` may still claim under its cap.
    pub fn num_free_entries_for(&self, tid: ThreadId) -> usize {
        self.max_entries(tid)
            .saturating_sub(self.count_insts_for(tid))
    }

    /// Inserts a dispatched instruction at the tail of its thread's list.
    ///
    /// The driver is expected to check [`Self::num_free_entries`] first; a
    /// full ROB is reported as [`RobError::Full`].
    pub fn insert(&mut self, inst: DynInstPtr<I>) -> Result<(), RobError> {
        let tid = inst.thread_id();
        let idx = self.thread_index(tid)?;

        if self.is_full() {
            return Err(RobError::Full {
                capacity: self.num_entries,
            });
        }
        let sn = inst.seq_num();
        if let Some(tail) = self.insts[idx].back().map(|t| t.seq_num()) {
            if sn <= tail {
                return Err(RobError::OutOfOrder { tid, sn, tail });
            }
        }

        self.stats.writes += 1;
        self.stats.inserted += 1;
        debug!(%tid, sn = %sn, pc = %inst.pc_state(), "adding inst to the ROB");

        if let Some(schedule) = self.schedule.as_mut() {
            schedule.push(
                tid,
                ScheduleEntry {
                    inst_addr: inst.pc_state().inst_addr(),
                    seq_num: sn,
                },
            );
        }

        inst.set_in_rob();
        self.insts[idx].push_back(inst);
        self.num_insts += 1;

        trace!(%tid, count = self.insts[idx].len(), "thread now has instructions");
        Ok(())
    }

    /// Retires the head instruction of `tid` and hands it to the driver.
    ///
    /// When in-order issue is enabled the mirrored schedule entry is popped in
    /// the same call, provided it has not already been retired through
    /// [`Self::retire_head_schedule`].
    pub fn retire_head<D: RobDriver<I>>(
        &mut self,
        tid: ThreadId,
        driver: &mut D,
    ) -> Result<DynInstPtr<I>, RobError> {
        let idx = self.thread_index(tid)?;
        // Every retire attempt is a ROB access, including refused ones.
        self.stats.writes += 1;

        let head = self.insts[idx].front().ok_or(RobError::Empty(tid))?;
        if !head.ready_to_commit() {
            return Err(RobError::HeadNotReady {
                tid,
                sn: head.seq_num(),
            });
        }
        let head = self.insts[idx].pop_front().ok_or(RobError::Empty(tid))?;
        let sn = head.seq_num();

        debug!(%tid, sn = %sn, pc = %head.pc_state(), "retiring head instruction");

        self.num_insts -= 1;
        self.stats.retired += 1;

        if let Some(schedule) = self.schedule.as_mut() {
            if schedule.front(tid).is_some_and(|e| e.seq_num == sn) {
                let _ = schedule.pop_front(tid);
            }
        }

        head.clear_in_rob();
        head.set_committed();

        driver.remove_front_inst(Rc::clone(&head));
        Ok(head)
    }

    /// True if the head of `tid` may commit.
    pub fn is_head_ready(&mut self, tid: ThreadId) -> bool {
        self.stats.reads += 1;
        self.thread_list(tid)
            .and_then(VecDeque::front)
            .is_some_and(|inst| inst.ready_to_commit())
    }

    /// True if any active thread has a head ready to commit.
    pub fn can_commit(&mut self, active: &[ThreadId]) -> bool {
        active.iter().any(|&tid| self.is_head_ready(tid))
    }

    /// Oldest instruction of `tid`.
    pub fn read_head_inst(&self, tid: ThreadId) -> Option<&DynInstPtr<I>> {
        self.thread_list(tid).and_then(VecDeque::front)
    }

    /// Youngest instruction of `tid`.
    pub fn read_tail_inst(&self, tid: ThreadId) -> Option<&DynInstPtr<I>> {
        self.thread_list(tid).and_then(VecDeque::back)
    }

    /// Iterates the instructions of `tid`, oldest first.
    pub fn thread_insts(&self, tid: ThreadId) -> impl Iterator<Item = &DynInstPtr<I>> {
        self.thread_list(tid).into_iter().flatten()
    }

    /// Finds the instruction of `tid` with sequence number `sn`.
    pub fn find_inst(&self, tid: ThreadId, sn: SeqNum) -> Option<&DynInstPtr<I>> {
        self.thread_list(tid)?
            .iter()
            .find(|inst| inst.seq_num() == sn)
    }

    /// Oldest instruction across the active threads.
    pub fn global_head(&self, active: &[ThreadId]) -> Option<&DynInstPtr<I>> {
        active
            .iter()
            .filter_map(|&tid| self.read_head_inst(tid))
            .min_by_key(|inst| inst.seq_num())
    }

    /// Youngest instruction across the active threads.
    pub fn global_tail(&self, active: &[ThreadId]) -> Option<&DynInstPtr<I>> {
        active
            .iter()
            .filter_map(|&tid| self.read_tail_inst(tid))
            .max_by_key(|inst| inst.seq_num())
    }

    /// Oldest schedule-list entry of `tid`.
    pub fn read_head_schedule(&self, tid: ThreadId) -> Result<ScheduleEntry, RobError> {
        let entry = self
            .schedule
            .as_ref()
            .and_then(|s| s.front(tid))
            .copied()
            .ok_or(RobError::ScheduleEmpty(tid))?;
        trace!(
            %tid,
            sn = %entry.seq_num,
            pc = format_args!("{:#x}", entry.inst_addr),
            "instruction that must be issued next"
        );
        Ok(entry)
    }

    /// Pops the oldest schedule-list entry of `tid`.
    pub fn retire_head_schedule(&mut self, tid: ThreadId) -> Result<ScheduleEntry, RobError> {
        let entry = self
            .schedule
            .as_mut()
            .and_then(|s| s.pop_front(tid))
            .ok_or(RobError::ScheduleEmpty(tid))?;
        debug!(%tid, sn = %entry.seq_num, "retiring head of schedule list");
        Ok(entry)
    }

    /// Schedule-list entries of `tid`, or zero when in-order issue is off.
    pub fn schedule_len(&self, tid: ThreadId) -> usize {
        self.schedule.as_ref().map_or(0, |s| s.len(tid))
    }

    /// The schedule list, when in-order issue is enabled.
    pub const fn schedule(&self) -> Option<&ScheduleList> {
        self.schedule.as_ref()
    }

    /// The branch-outcome queue, when branch hints are enabled.
    pub const fn boq(&self) -> Option<&Boq> {
        self.boq.as_ref()
    }

    /// Mutable branch-outcome queue, for fetch to record outcomes.
    pub fn boq_mut(&mut self) -> Option<&mut Boq> {
        self.boq.as_mut()
    }

    /// Activity counters.
    pub const fn stats(&self) -> &RobStats {
        &self.stats
    }

    /// Verifies the ROB is empty and idle before a drain completes.
    pub fn drain_sanity_check(&self) -> Result<(), RobError> {
        let insts = self.count_insts();
        let squashing = self
            .squash_states
            .iter()
            .filter(|s| matches!(s, SquashState::Squashing(_)))
            .count();
        if insts == 0 && self.num_insts == 0 && squashing == 0 {
            Ok(())
        } else {
            Err(RobError::NotDrained { insts, squashing })
        }
    }

    /// Drops every instruction and squash session.
    ///
    /// Per-thread caps and the BOQ are left untouched.
    pub fn reset_state(&mut self) {
        for list in &mut self.insts {
            for inst in list.drain(..) {
                inst.clear_in_rob();
            }
        }
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.clear();
        }
        self.squash_states.fill(SquashState::Idle);
        self.num_insts = 0;
    }

    /// Resets state when this CPU model takes over from another one.
    pub fn take_over_from(&mut self) {
        debug!("ROB taking over, resetting state");
        self.reset_state();
    }
}
