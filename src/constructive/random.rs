//! Uniform random giant tour.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Instance;

/// Returns a uniformly shuffled permutation of the clients `1..=n`.
pub fn random_tour<R: Rng>(instance: &Instance, rng: &mut R) -> Vec<usize> {
    let mut tour: Vec<usize> = (1..=instance.nb_clients()).collect();
    tour.shuffle(rng);
    tour
}
