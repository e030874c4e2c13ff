//! HTTP handlers for the Espresso Advisor

mod health;
mod shots;

pub use health::*;
pub use shots::*;
