//! Database models for RuralGest
//!
//! The domain models live in the shared crate so the WASM front-end uses
//! the same types; the backend re-exports them flat.

pub use shared::models::*;
