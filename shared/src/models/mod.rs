//! Domain models for RuralGest

mod catalog;
mod notification;
mod request;
mod user;

pub use catalog::*;
pub use notification::*;
pub use request::*;
pub use user::*;
