//! Resumable squash processing.
//!
//! A squash is not atomic. `squash` opens a session for a thread and runs one
//! bounded step; the driver keeps calling `do_squash` on later cycles until it
//! reports [`SquashStep::Done`]. Each step unwinds at most `squash_width`
//! instructions, youngest first, unless the thread is exiting.
//!
//! The unwind point is kept as a *frontier* sequence number rather than a
//! position. Every step re-derives the position in the ROB list (and the range
//! in the schedule list) from the frontier, so inserts or retirements between
//! steps cannot leave a stale cursor behind.

use std::ops::RangeInclusive;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::Rob;
use crate::common::{RobError, SeqNum, ThreadId};
use crate::core::pipeline::dyn_inst::{DynInst, DynInstPtr};
use crate::core::pipeline::traits::RobDriver;

/// Per-thread squash state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SquashState {
    /// Not squashing. Also the state a finished squash returns to.
    #[default]
    Idle,
    /// A squash session is in progress.
    Squashing(SquashSession),
}

/// Bookkeeping for one in-progress squash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SquashSession {
    /// Instructions with a sequence number above this are squashed.
    pub threshold: SeqNum,
    /// Sequence number of the next instruction to examine.
    pub frontier: SeqNum,
    /// Youngest instruction when the session started.
    pub session_tail: SeqNum,
    /// True once the schedule list holds nothing left to squash.
    pub schedule_done: bool,
}

impl SquashSession {
    fn schedule_range(&self) -> RangeInclusive<SeqNum> {
        match self.threshold.val().checked_add(1) {
            Some(lo) => SeqNum::new(lo)..=self.session_tail,
            None => SeqNum::new(1)..=SeqNum::new(0),
        }
    }
}

/// Outcome of one squash step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SquashStep {
    /// More instructions remain above the threshold; call `do_squash` again.
    Continue,
    /// The thread is clean and back to [`SquashState::Idle`].
    Done,
}

/// Completed step, or the first BOQ error the step ran into.
fn step_result(step: SquashStep, boq_error: Option<RobError>) -> Result<SquashStep, RobError> {
    boq_error.map_or(Ok(step), Err)
}

impl<I: DynInst> Rob<I> {
    /// Starts squashing every instruction of `tid` younger than `squash_num`.
    ///
    /// Does nothing if the thread holds no instructions. Calling this while a
    /// squash is already in progress restarts the session at the current tail
    /// with the new threshold. Runs the first bounded step immediately.
    pub fn squash<D: RobDriver<I>>(
        &mut self,
        squash_num: SeqNum,
        tid: ThreadId,
        driver: &D,
    ) -> Result<SquashStep, RobError> {
        let idx = self.thread_index(tid)?;

        let Some(tail) = self.insts[idx].back().map(|inst| inst.seq_num()) else {
            debug!(%tid, sn = %squash_num, "does not need to squash due to being empty");
            self.squash_states[idx] = SquashState::Idle;
            return Ok(SquashStep::Done);
        };

        debug!(%tid, sn = %squash_num, tail = %tail, "starting to squash within the ROB");
        let mut session = SquashSession {
            threshold: squash_num,
            frontier: tail,
            session_tail: tail,
            schedule_done: true,
        };
        session.schedule_done = !self.schedule_has_pending(tid, &session);
        self.squash_states[idx] = SquashState::Squashing(session);

        self.do_squash(tid, driver)
    }

    /// Runs one bounded squash step for `tid`.
    ///
    /// A no-op returning [`SquashStep::Done`] when the thread is not squashing,
    /// so repeated calls after completion are harmless. Fails with
    /// [`RobError::InvalidSquashCursor`] if the frontier instruction left the
    /// ROB behind the squash's back, which abandons the session.
    ///
    /// A branch hint that cannot be rewound is reported as [`RobError::Boq`]
    /// only after the step has finished unwinding. The ROB side is never left
    /// half-done: the session stays open or closes exactly as it would have
    /// without the error, and [`Self::is_done_squashing`] tells which.
    pub fn do_squash<D: RobDriver<I>>(
        &mut self,
        tid: ThreadId,
        driver: &D,
    ) -> Result<SquashStep, RobError> {
        let idx = self.thread_index(tid)?;
        let SquashState::Squashing(mut session) = self.squash_states[idx] else {
            return Ok(SquashStep::Done);
        };

        self.stats.writes += 1;
        self.stats.squash_steps += 1;
        trace!(%tid, threshold = %session.threshold, "squashing instructions until threshold");

        let Some(mut pos) = self.position_of(idx, session.frontier) else {
            warn!(%tid, frontier = %session.frontier, "squash cursor no longer in the ROB");
            self.squash_states[idx] = SquashState::Idle;
            return Err(RobError::InvalidSquashCursor {
                tid,
                frontier: session.frontier,
            });
        };

        if session.frontier <= session.threshold {
            return Ok(self.finish_squash(tid, &session));
        }

        // An exiting thread drains completely regardless of squash width.
        let budget = if driver.is_thread_exiting(tid) {
            self.num_entries
        } else {
            self.squash_width
        };

        let mut boq_error = None;
        for _ in 0..budget {
            let inst = Rc::clone(&self.insts[idx][pos]);
            let sn = inst.seq_num();
            if sn <= session.threshold {
                break;
            }

            trace!(%tid, sn = %sn, pc = %inst.pc_state(), "squashing instruction");
            inst.set_squashed();

            if let Err(err) = self.rewind_branch_hint(tid, &inst) {
                warn!(%tid, sn = %sn, %err, "BOQ out of step with squashed branch");
                if boq_error.is_none() {
                    boq_error = Some(err);
                }
            }

            if let Some(schedule) = self.schedule.as_mut() {
                let removed = schedule.remove_range(tid, sn..=session.session_tail);
                if removed > 0 {
                    trace!(%tid, sn = %sn, removed, "squashed schedule list entries");
                }
            }

            // Squashed instructions may still drain through later stages.
            inst.set_can_commit();
            self.remove_squashed(idx, pos);

            if pos == 0 {
                debug!(%tid, "reached head of instruction list while squashing");
                session.frontier = session.threshold;
                let step = self.finish_squash(tid, &session);
                return step_result(step, boq_error);
            }
            pos -= 1;
            session.frontier = self.insts[idx][pos].seq_num();
        }

        if session.frontier <= session.threshold {
            let step = self.finish_squash(tid, &session);
            return step_result(step, boq_error);
        }

        session.schedule_done = !self.schedule_has_pending(tid, &session);
        self.squash_states[idx] = SquashState::Squashing(session);
        step_result(SquashStep::Continue, boq_error)
    }

    /// True while `tid` has no squash in progress.
    pub fn is_done_squashing(&self, tid: ThreadId) -> bool {
        self.squash_state(tid) == SquashState::Idle
    }

    /// True once the schedule list of `tid` has nothing left to squash.
    pub fn is_schedule_done_squashing(&self, tid: ThreadId) -> bool {
        match self.squash_state(tid) {
            SquashState::Idle => true,
            SquashState::Squashing(session) => session.schedule_done,
        }
    }

    /// Current squash state of `tid`; `Idle` for unknown threads.
    pub fn squash_state(&self, tid: ThreadId) -> SquashState {
        self.squash_states
            .get(tid.index())
            .copied()
            .unwrap_or_default()
    }

    /// Steps the BOQ back over a squashed control instruction and re-reads
    /// the entry fetch will now receive.
    fn rewind_branch_hint(&mut self, tid: ThreadId, inst: &DynInstPtr<I>) -> Result<(), RobError> {
        if !inst.is_control() {
            return Ok(());
        }
        let Some(boq) = self.boq.as_mut() else {
            return Ok(());
        };

        boq.decrement_head(tid)?;
        let entry = boq.read_entry(tid)?;
        trace!(
            %tid,
            pc = format_args!("{:#x}", entry.pc),
            target = format_args!("{:#x}", entry.branch_target_pc),
            direction = entry.direction,
            "BOQ head rewound"
        );
        self.stats.boq_rewinds += 1;
        Ok(())
    }

    fn remove_squashed(&mut self, idx: usize, pos: usize) {
        if let Some(inst) = self.insts[idx].remove(pos) {
            inst.clear_in_rob();
            self.num_insts -= 1;
            self.stats.squashed += 1;
        }
    }

    fn schedule_has_pending(&self, tid: ThreadId, session: &SquashSession) -> bool {
        self.schedule
            .as_ref()
            .is_some_and(|s| s.contains_range(tid, session.schedule_range()))
    }

    fn finish_squash(&mut self, tid: ThreadId, session: &SquashSession) -> SquashStep {
        // The schedule list may reach its stopping point on a different step
        // than the ROB list; sweep whatever it still holds above the threshold.
        if let Some(schedule) = self.schedule.as_mut() {
            let removed = schedule.remove_range(tid, session.schedule_range());
            if removed > 0 {
                trace!(%tid, removed, "swept schedule list entries at squash end");
            }
        }
        debug!(%tid, "done squashing instructions");
        self.squash_states[tid.index()] = SquashState::Idle;
        SquashStep::Done
    }
}
