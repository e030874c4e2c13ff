//! Business logic services for the Espresso Advisor

pub mod advisor;

pub use advisor::ShotAdvisorService;
