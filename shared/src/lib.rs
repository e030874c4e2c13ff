//! Shared types and rule engine for the Espresso Advisor
//!
//! This crate contains the shot data model, the target resolver and the
//! adjustment rule engine. It is shared between the backend, the browser
//! (via WASM), and other components of the system.

pub mod engine;
pub mod models;
pub mod types;
pub mod validation;

pub use engine::*;
pub use models::*;
pub use types::*;
pub use validation::*;
