//! Penalized cost evaluation.
//!
//! - [`Penalties`]: capacity and duration penalty weights
//! - [`RouteMetrics`] / [`route_cost`]: penalized cost of a single route
//! - [`RouteEvaluator`]: builds timed routes and lists violations

mod evaluator;
mod penalties;

pub use evaluator::{route_cost, RouteEvaluator, RouteMetrics};
pub use penalties::Penalties;
