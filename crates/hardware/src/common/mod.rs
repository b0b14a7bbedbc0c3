//! Common types used throughout the ROB/BOQ core.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Identifiers:** Strong types for sequence numbers and hardware thread ids.
//! 2. **PC State:** Current/next program counter with micro-op components.
//! 3. **Constants:** Thread limits and default sizes.
//! 4. **Error Handling:** ROB, BOQ and configuration error types.

/// Global constants (thread limits, default sizes).
pub mod constants;

/// Error types for ROB, BOQ and configuration.
pub mod error;

/// Sequence number and thread id types.
pub mod ids;

/// Program-counter state.
pub mod pc;

pub use constants::MAX_THREADS;
pub use error::{BoqError, ConfigError, RobError};
pub use ids::{SeqNum, ThreadId};
pub use pc::{MicroPc, PcState};
