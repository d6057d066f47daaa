//! Flutter-facing bindings for the resolution tracker core.

pub mod api;
