//! Use-case layer above `ops`.
//!
//! # Responsibility
//! - Hold per-session UI state (selection, view mode, dirty flag) next to
//!   the workspace it describes.
//! - Keep FFI and CLI callers away from raw operation sequencing.

pub mod session_service;
