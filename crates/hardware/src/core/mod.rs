//! CPU core structures.
//!
//! The core module hosts the pipeline bookkeeping that sits between dispatch
//! and commit. The stages themselves belong to the driving CPU model.

/// Reorder buffer, branch-outcome queue and instruction handles.
pub mod pipeline;

pub use self::pipeline::{Boq, Rob};
