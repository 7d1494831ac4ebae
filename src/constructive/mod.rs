//! Seeding heuristics for the initial population.
//!
//! - [`clarke_wright_savings`]: Clarke-Wright savings (1964), optionally
//!   with noisy savings, O(n² log n)
//! - [`nearest_neighbor`]: Greedy nearest neighbor, optionally with random
//!   route starts, O(n²)
//! - [`random_tour`]: Uniform random permutation, O(n)
//!
//! [`seed_tour`] dispatches on a [`SeedHeuristic`] and flattens the result
//! into a giant tour for Split.

mod clarke_wright;
mod nearest_neighbor;
mod random;

use rand::Rng;

pub use crate::config::{SeedHeuristic, SeedingStrategy};
pub use clarke_wright::clarke_wright_savings;
pub use nearest_neighbor::nearest_neighbor;
pub use random::random_tour;

use crate::models::Instance;

/// Relative perturbation of savings in randomized Clarke-Wright seeds.
pub const SAVINGS_NOISE: f64 = 0.1;

/// Builds a giant tour with `heuristic`.
///
/// When `randomized` is false, savings and nearest neighbor run their
/// deterministic form; otherwise the savings are perturbed by
/// [`SAVINGS_NOISE`] and nearest-neighbor routes start at random clients.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::constructive::{seed_tour, SeedHeuristic};
/// use rand::SeedableRng;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 2.0, 0.0, 1, 0.0),
///     Customer::new(2, 1.0, 0.0, 1, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 5).expect("valid");
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
///
/// let tour = seed_tour(SeedHeuristic::NearestNeighbor, &instance, false, &mut rng);
/// assert_eq!(tour, vec![2, 1]);
/// ```
pub fn seed_tour<R: Rng>(
    heuristic: SeedHeuristic,
    instance: &Instance,
    randomized: bool,
    rng: &mut R,
) -> Vec<usize> {
    match heuristic {
        SeedHeuristic::Savings => {
            let noise = if randomized { SAVINGS_NOISE } else { 0.0 };
            clarke_wright_savings(instance, noise, rng).concat()
        }
        SeedHeuristic::NearestNeighbor => nearest_neighbor(instance, randomized, rng).concat(),
        SeedHeuristic::Random => random_tour(instance, rng),
    }
}
