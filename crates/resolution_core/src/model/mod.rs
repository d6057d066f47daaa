//! Resolution domain model.
//!
//! # Responsibility
//! - Define the entities persisted by the storage layer.
//! - Provide pure constructors and completion derivations.
//!
//! # Invariants
//! - Milestones and journal entries are owned by exactly one resolution.
//! - Completion status is derived from milestones, never stored.
//! - No function in this module performs I/O.

pub mod id;
pub mod resolution;
