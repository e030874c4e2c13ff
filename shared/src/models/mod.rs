//! Domain models for the Espresso Advisor

mod bean;
mod history;
mod recommendation;
mod shot;
mod target;

pub use bean::*;
pub use history::*;
pub use recommendation::*;
pub use shot::*;
pub use target::*;
