//! Out-of-order backend bookkeeping structures.
//!
//! This module contains the structures that track instructions between
//! dispatch and commit. It includes the following components:
//! 1. **Dynamic Instructions:** The shared instruction handle the ROB operates on.
//! 2. **Reorder Buffer:** Per-thread in-order retirement, capacity policy and squash.
//! 3. **Branch-Outcome Queue:** Precomputed branch hints, rewound on squash.
//! 4. **Traits:** Callbacks the ROB makes into the CPU model that drives it.

/// Branch-Outcome Queue.
pub mod boq;

/// Dynamic instruction handle trait and default implementation.
pub mod dyn_inst;

/// Reorder Buffer, capacity policies, schedule list and squash state machine.
pub mod rob;

/// Driver callback traits.
pub mod traits;

pub use self::boq::{Boq, BoqEntry};
pub use self::dyn_inst::{DynInst, DynInstPtr, Instruction};
pub use self::rob::{Rob, SquashState, SquashStep};
pub use self::traits::RobDriver;
