//! Reorder buffer and branch-outcome queue core for an SMT out-of-order CPU simulator.
//!
//! This crate implements the instruction-lifecycle bookkeeping of an
//! out-of-order backend:
//! 1. **ROB:** Per-thread in-order retirement with SMT capacity policies.
//! 2. **Squash:** Bounded, resumable rollback of instructions younger than a threshold.
//! 3. **BOQ:** Precomputed branch outcomes, rewound in lockstep with squash.
//! 4. **Schedule List:** Program-order shadow list for in-order issue mode.
//! 5. **Configuration and Statistics:** JSON configuration and activity counters.
//!
//! The surrounding pipeline stages are supplied by the caller through the
//! [`RobDriver`](crate::core::pipeline::RobDriver) trait.

/// Common types (sequence numbers, thread ids, PC state, errors, constants).
pub mod common;
/// Configuration (defaults, SMT policy enum, JSON loading).
pub mod config;
/// Pipeline bookkeeping (ROB, BOQ, instruction handles, driver traits).
pub mod core;
/// ROB activity counters.
pub mod stats;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Reorder buffer; construct with `Rob::new(&config)`.
pub use crate::core::pipeline::Rob;
/// Branch-outcome queue.
pub use crate::core::pipeline::Boq;
