//! Program-counter state carried by in-flight instructions.
//!
//! A `PcState` holds both the current and the next program counter, together
//! with the micro-op PC components used by micro-coded instructions. Branch
//! outcomes and branch targets are both expressed as `PcState` values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Micro-op program counter within a macro instruction.
pub type MicroPc = u16;

/// Current and next program counter of an instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PcState {
    /// Address of the instruction.
    pub pc: u64,
    /// Address of the next instruction in program order.
    pub npc: u64,
    /// Micro-op index of the instruction.
    pub upc: MicroPc,
    /// Micro-op index of the next instruction.
    pub nupc: MicroPc,
}

impl PcState {
    /// Creates a PC state with zeroed micro-op components.
    pub const fn new(pc: u64, npc: u64) -> Self {
        Self {
            pc,
            npc,
            upc: 0,
            nupc: 0,
        }
    }

    /// Creates a PC state for a fixed-width instruction at `pc`, falling
    /// through to `pc + size`.
    pub const fn sequential(pc: u64, size: u64) -> Self {
        Self::new(pc, pc.wrapping_add(size))
    }

    /// Returns a copy with the given micro-op components.
    #[must_use]
    pub const fn with_micro(mut self, upc: MicroPc, nupc: MicroPc) -> Self {
        self.upc = upc;
        self.nupc = nupc;
        self
    }

    /// Address of the instruction itself.
    #[inline(always)]
    pub const fn inst_addr(&self) -> u64 {
        self.pc
    }
}

impl fmt::Display for PcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:#x}=>{:#x}).({}=>{})", self.pc, self.npc, self.upc, self.nupc)
    }
}
