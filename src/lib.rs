//! # u-hgs
//!
//! Hybrid Genetic Search for the capacitated vehicle routing problem
//! (CVRP), with optional route duration limits and a bounded fleet.
//!
//! ## Modules
//!
//! - [`models`]: Domain model types (Customer, Instance, Route, Solution)
//! - [`distance`]: Distance matrix
//! - [`evaluation`]: Penalty weights, penalized route cost and route timing
//! - [`constructive`]: Seeding heuristics (Clarke-Wright, Nearest Neighbor, random)
//! - [`local_search`]: Granular local search (relocate, swap, 2-opt, 2-opt*, SWAP*)
//! - [`ga`]: Split, crossover, population management and the genetic driver
//! - [`config`]: Solver parameters
//! - [`error`]: Error type for invalid parameters and instance data
//!
//! ## Example
//!
//! ```
//! use u_hgs::config::HgsConfig;
//! use u_hgs::ga::Genetic;
//! use u_hgs::models::{Customer, Instance};
//!
//! let customers = vec![
//!     Customer::depot(0.0, 0.0),
//!     Customer::new(1, 2.0, 0.0, 4, 0.0),
//!     Customer::new(2, 2.0, 2.0, 4, 0.0),
//!     Customer::new(3, -2.0, 0.0, 4, 0.0),
//!     Customer::new(4, -2.0, -2.0, 4, 0.0),
//! ];
//! let instance = Instance::euclidean(customers, 8).expect("valid instance");
//! let config = HgsConfig::default()
//!     .with_mu(5)
//!     .with_nb_iter(50)
//!     .with_time_limit(0.0);
//!
//! let result = Genetic::new(&instance, config).expect("valid config").run();
//! let best = result.best.expect("feasible solution");
//! let solution = best.to_solution(&instance);
//! assert!(solution.verify(&instance).is_ok());
//! assert_eq!(solution.num_routes(), 2);
//! ```

pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod local_search;
pub mod models;

pub use error::Error;
