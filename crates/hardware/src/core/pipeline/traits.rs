//! Driver-facing interfaces of the ROB.
//!
//! The ROB is driven by the surrounding pipeline (commit, IEW, the CPU
//! object). It only calls back into that driver for two things, captured by
//! [`RobDriver`].

use super::dyn_inst::DynInstPtr;
use crate::common::ThreadId;

/// Callbacks the ROB makes into the CPU model that owns it.
pub trait RobDriver<I> {
    /// Hands a retired instruction back to the CPU.
    ///
    /// Called once per successful `retire_head`, after the ROB has dropped its
    /// own slot for the instruction.
    fn remove_front_inst(&mut self, inst: DynInstPtr<I>);

    /// Returns true while `tid` is being torn down.
    ///
    /// An exiting thread is squashed without the per-cycle squash width limit.
    fn is_thread_exiting(&self, tid: ThreadId) -> bool;
}
