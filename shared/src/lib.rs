//! Shared types and domain logic for RuralGest
//!
//! This crate contains the types and pure rules shared between the backend,
//! the browser front-end (via WASM), and other components of the system:
//! the request lifecycle, role-based visibility, and lookup resolution.

pub mod lifecycle;
pub mod models;
pub mod resolver;
pub mod validation;
pub mod visibility;

pub use lifecycle::*;
pub use models::*;
pub use resolver::*;
pub use validation::*;
pub use visibility::*;
