//! Global constants shared by the ROB and BOQ.

/// Maximum number of hardware threads any per-thread structure is sized for.
pub const MAX_THREADS: usize = 8;

/// Default total ROB capacity.
pub const DEFAULT_ROB_ENTRIES: usize = 192;

/// Default number of instructions unwound per `do_squash` call.
pub const DEFAULT_SQUASH_WIDTH: usize = 8;

/// Default per-thread cap under the `Threshold` SMT policy.
pub const DEFAULT_SMT_ROB_THRESHOLD: usize = 100;
