//! Hybrid genetic search components.
//!
//! - [`Individual`]: Giant tour, route partition and cached evaluation
//! - [`split`]: Prins (2004) split DP, plus [`split_with_routes`] for a
//!   fixed route count
//! - [`order_crossover`]: Ordered crossover (OX) on giant tours
//! - [`Population`]: Feasible/infeasible sub-populations with biased
//!   fitness and penalty adaptation
//! - [`Genetic`]: The generational driver

mod crossover;
mod genetic;
mod individual;
mod population;
pub mod split;

pub use crossover::order_crossover;
pub use genetic::{Genetic, HgsResult, Phase};
pub use individual::{Evaluation, Individual};
pub use population::{Population, CLONE_PENALTY};
pub use split::{split, split_with_routes, SplitResult};
