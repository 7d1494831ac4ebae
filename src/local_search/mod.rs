//! Granular local search for penalized CVRP solutions.
//!
//! Neighborhoods, each restricted to a client's `nb_granular` nearest
//! neighbors:
//!
//! - relocate / Or-opt: chains of 1–3 clients moved next to a neighbor
//! - swap: exchange of two clients
//! - 2-opt (intra-route) and 2-opt* (tail exchange between two routes)
//! - SWAP*: exchange with best reinsertion between overlapping routes
//!
//! [`LocalSearch`] is the entry point.

mod engine;
mod exchange;
mod relocate;
mod route_state;
mod swap_star;
mod two_opt;

pub use engine::LocalSearch;
