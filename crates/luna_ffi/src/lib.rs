//! Flutter-facing bindings for the Luna core.

pub mod api;
