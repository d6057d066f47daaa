//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate load/mutate/save cycles for UI and FFI callers.
//! - Keep callers decoupled from the storage key and document layout.
//!
//! # Invariants
//! - Services hold no cached collection; each call works on a freshly
//!   loaded, request-scoped copy.

pub mod resolution_service;
