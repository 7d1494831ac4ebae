//! Domain model types for the CVRP.
//!
//! Provides the core abstractions: locations with demands and service
//! durations, the validated instance with its neighbor lists, and exported
//! routes and solutions.

mod customer;
mod instance;
mod route;
mod solution;

pub use customer::Customer;
pub use instance::Instance;
pub use route::{Route, Visit};
pub use solution::{Solution, Violation};
