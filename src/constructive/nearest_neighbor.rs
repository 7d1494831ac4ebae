//! Nearest-neighbor constructive heuristic.
//!
//! Builds routes greedily: starting from the depot, always visit the nearest
//! unvisited client that still fits the vehicle and, when the instance has
//! one, the duration limit (counting the trip back to the depot). When
//! nothing fits, close the route and start a new one.
//!
//! With `random_starts`, the first client of every route is drawn uniformly
//! among the unvisited ones instead of being the one nearest to the depot.
//!
//! # Complexity
//!
//! O(n²) where n = number of clients.

use rand::Rng;

use crate::models::Instance;

/// Builds routes with the nearest-neighbor heuristic.
///
/// Capacity and the duration limit are respected, except that a client
/// that cannot fit even alone still gets its own route. The fleet size is
/// not enforced here; Split handles that once the routes are concatenated
/// into a giant tour.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::constructive::nearest_neighbor;
/// use rand::SeedableRng;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 10, 0.0),
///     Customer::new(2, 2.0, 0.0, 10, 0.0),
///     Customer::new(3, 3.0, 0.0, 10, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 20).expect("valid");
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
///
/// let routes = nearest_neighbor(&instance, false, &mut rng);
/// assert_eq!(routes, vec![vec![1, 2], vec![3]]);
/// ```
pub fn nearest_neighbor<R: Rng>(
    instance: &Instance,
    random_starts: bool,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let n = instance.nb_clients();
    // Kept sorted so that distance ties go to the lower id.
    let mut unvisited: Vec<usize> = (1..=n).collect();
    let mut routes = Vec::new();

    while !unvisited.is_empty() {
        let first = if random_starts {
            unvisited.remove(rng.random_range(0..unvisited.len()))
        } else {
            take_nearest(instance, &mut unvisited, 0, |c| {
                fits_duration(instance, 0.0, 0, c)
            })
            .unwrap_or_else(|| unvisited.remove(0))
        };

        let mut route = vec![first];
        let mut load = instance.demand(first);
        let mut elapsed = instance.distance(0, first) + instance.service_duration(first);
        let mut current = first;
        while let Some(next) = take_nearest(instance, &mut unvisited, current, |c| {
            load + instance.demand(c) <= instance.capacity()
                && fits_duration(instance, elapsed, current, c)
        }) {
            load += instance.demand(next);
            elapsed += instance.distance(current, next) + instance.service_duration(next);
            route.push(next);
            current = next;
        }
        routes.push(route);
    }
    routes
}

/// Whether visiting `client` right after `current`, with `elapsed` time
/// already spent on the route, still allows returning to the depot within
/// the duration limit.
fn fits_duration(instance: &Instance, elapsed: f64, current: usize, client: usize) -> bool {
    let total = elapsed
        + instance.distance(current, client)
        + instance.service_duration(client)
        + instance.distance(client, 0);
    instance.duration_excess(total) <= 0.0
}

/// Removes and returns the unvisited client nearest to `from` among those
/// accepted by `fits`.
fn take_nearest<F>(
    instance: &Instance,
    unvisited: &mut Vec<usize>,
    from: usize,
    fits: F,
) -> Option<usize>
where
    F: Fn(usize) -> bool,
{
    let nearest = instance
        .distances()
        .nearest_neighbor(from, unvisited.iter().copied().filter(|&c| fits(c)))?;
    let k = unvisited.binary_search(&nearest).ok()?;
    Some(unvisited.remove(k))
}
