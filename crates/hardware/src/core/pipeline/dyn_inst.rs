//! Dynamic instruction handles.
//!
//! The ROB never looks inside an instruction. It only needs the capability set
//! described by [`DynInst`]: identity (thread, sequence number, PC), whether the
//! instruction is a control instruction, whether it may commit, and a handful of
//! status mutators. Handles are shared between the driver's pipeline structures
//! and the ROB through [`DynInstPtr`], so every mutator takes `&self`.
//!
//! [`Instruction`] is a ready-made implementation backed by `Cell` flags.

use std::cell::Cell;
use std::rc::Rc;

use crate::common::{PcState, SeqNum, ThreadId};

/// Shared handle to an in-flight instruction.
pub type DynInstPtr<I> = Rc<I>;

/// Capabilities the ROB requires from an in-flight instruction.
pub trait DynInst {
    /// Program-order sequence number within the owning thread.
    fn seq_num(&self) -> SeqNum;

    /// Owning hardware thread.
    fn thread_id(&self) -> ThreadId;

    /// Current and next PC of the instruction.
    fn pc_state(&self) -> PcState;

    /// True for branches, jumps, calls and returns.
    fn is_control(&self) -> bool;

    /// Resolved target of a control instruction.
    fn branch_target(&self) -> PcState;

    /// True once the instruction may leave the ROB head.
    fn ready_to_commit(&self) -> bool;

    /// Marks the instruction as squashed.
    fn set_squashed(&self);

    /// True once the instruction has been squashed.
    fn is_squashed(&self) -> bool;

    /// Allows the instruction to drain through commit.
    fn set_can_commit(&self);

    /// Records that the instruction occupies a ROB slot.
    fn set_in_rob(&self);

    /// Records that the instruction left the ROB.
    fn clear_in_rob(&self);

    /// True while the instruction occupies a ROB slot.
    fn is_in_rob(&self) -> bool;

    /// Marks the instruction as architecturally committed.
    fn set_committed(&self);

    /// True once the instruction has been committed.
    fn is_committed(&self) -> bool;
}

/// Plain instruction handle with interior-mutable status flags.
#[derive(Debug, PartialEq)]
pub struct Instruction {
    tid: ThreadId,
    seq: SeqNum,
    pc: PcState,
    target: Option<PcState>,
    can_commit: Cell<bool>,
    squashed: Cell<bool>,
    in_rob: Cell<bool>,
    committed: Cell<bool>,
}

impl Instruction {
    /// Creates a non-control instruction.
    pub fn new(tid: ThreadId, seq: SeqNum, pc: PcState) -> Self {
        Self {
            tid,
            seq,
            pc,
            target: None,
            can_commit: Cell::new(false),
            squashed: Cell::new(false),
            in_rob: Cell::new(false),
            committed: Cell::new(false),
        }
    }

    /// Creates a control instruction with a resolved target.
    pub fn control(tid: ThreadId, seq: SeqNum, pc: PcState, target: PcState) -> Self {
        Self {
            target: Some(target),
            ..Self::new(tid, seq, pc)
        }
    }

    /// Wraps the instruction in a shared handle.
    pub fn into_ptr(self) -> DynInstPtr<Self> {
        Rc::new(self)
    }

    /// Marks execution complete so the instruction can commit.
    ///
    /// This is what the driver's writeback stage would call.
    pub fn complete(&self) {
        self.can_commit.set(true);
    }
}

impl DynInst for Instruction {
    fn seq_num(&self) -> SeqNum {
        self.seq
    }

    fn thread_id(&self) -> ThreadId {
        self.tid
    }

    fn pc_state(&self) -> PcState {
        self.pc
    }

    fn is_control(&self) -> bool {
        self.target.is_some()
    }

    // Non-control instructions fall through.
    fn branch_target(&self) -> PcState {
        self.target
            .unwrap_or_else(|| PcState::new(self.pc.npc, self.pc.npc.wrapping_add(4)))
    }

    fn ready_to_commit(&self) -> bool {
        self.can_commit.get()
    }

    fn set_squashed(&self) {
        self.squashed.set(true);
    }

    fn is_squashed(&self) -> bool {
        self.squashed.get()
    }

    fn set_can_commit(&self) {
        self.can_commit.set(true);
    }

    fn set_in_rob(&self) {
        self.in_rob.set(true);
    }

    fn clear_in_rob(&self) {
        self.in_rob.set(false);
    }

    fn is_in_rob(&self) -> bool {
        self.in_rob.get()
    }

    fn set_committed(&self) {
        self.committed.set(true);
    }

    fn is_committed(&self) -> bool {
        self.committed.get()
    }
}
