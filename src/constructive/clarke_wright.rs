//! Clarke-Wright savings algorithm.
//!
//! # Algorithm
//!
//! The savings algorithm (Clarke & Wright, 1964) starts with each client
//! on its own route (depot → client → depot). It then merges routes by
//! computing the "savings" of combining the end of one route with the start
//! of another:
//!
//! ```text
//! s(i, j) = d(0, i) + d(0, j) - d(i, j)
//! ```
//!
//! Routes are merged in decreasing order of savings, subject to the vehicle
//! capacity and, when the instance has one, the route duration limit.
//!
//! With `noise > 0`, every saving is multiplied by `1 + noise · U(-1, 1)`
//! before sorting, which yields a different merge order on every call.
//!
//! # Complexity
//!
//! O(n² log n) where n = number of clients (dominated by sorting savings).
//!
//! # Reference
//!
//! Clarke, G. & Wright, J.W. (1964). "Scheduling of Vehicles from a Central
//! Depot to a Number of Delivery Points", *Operations Research* 12(4), 568-581.

use rand::Rng;

use crate::evaluation::RouteMetrics;
use crate::models::Instance;

/// A savings value for merging two clients' routes.
#[derive(Debug)]
struct Saving {
    i: usize,
    j: usize,
    value: f64,
}

/// Builds routes with the Clarke-Wright savings algorithm.
///
/// `noise` is the relative perturbation applied to each saving; `0.0`
/// gives the deterministic heuristic and draws nothing from `rng`.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::constructive::clarke_wright_savings;
/// use rand::SeedableRng;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 10, 0.0),
///     Customer::new(2, 2.0, 0.0, 10, 0.0),
///     Customer::new(3, 3.0, 0.0, 10, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 30).expect("valid");
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
///
/// let routes = clarke_wright_savings(&instance, 0.0, &mut rng);
/// assert_eq!(routes, vec![vec![1, 2, 3]]);
/// ```
pub fn clarke_wright_savings<R: Rng>(
    instance: &Instance,
    noise: f64,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let n = instance.nb_clients();
    if n == 0 {
        return Vec::new();
    }

    let mut savings = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 1..=n {
        for j in (i + 1)..=n {
            let mut s = instance.distance(0, i) + instance.distance(0, j) - instance.distance(i, j);
            if noise > 0.0 {
                s *= 1.0 + noise * rng.random_range(-1.0..1.0);
            }
            if s > 0.0 {
                savings.push(Saving { i, j, value: s });
            }
        }
    }
    savings.sort_by(|a, b| b.value.total_cmp(&a.value));

    // route_of[c] = route index; route r starts as [r]
    let mut route_of: Vec<usize> = (0..=n).collect();
    let mut route_load: Vec<i32> = (0..=n).map(|c| instance.demand(c)).collect();
    let mut route_members: Vec<Vec<usize>> = (0..=n).map(|c| vec![c]).collect();
    route_members[0].clear();

    for saving in &savings {
        let ri = route_of[saving.i];
        let rj = route_of[saving.j];
        if ri == rj {
            continue;
        }

        let combined_load = route_load[ri] + route_load[rj];
        if combined_load > instance.capacity() {
            continue;
        }

        let i_at_end = route_members[ri].last() == Some(&saving.i);
        let j_at_start = route_members[rj].first() == Some(&saving.j);
        let i_at_start = route_members[ri].first() == Some(&saving.i);
        let j_at_end = route_members[rj].last() == Some(&saving.j);

        let (merge_from, merge_into, reverse_from, reverse_into) = if i_at_end && j_at_start {
            (rj, ri, false, false)
        } else if j_at_end && i_at_start {
            (ri, rj, false, false)
        } else if i_at_end && j_at_end {
            (rj, ri, true, false)
        } else if i_at_start && j_at_start {
            (rj, ri, false, true)
        } else {
            continue;
        };

        let mut merged = route_members[merge_into].clone();
        if reverse_into {
            merged.reverse();
        }
        let mut from_members = route_members[merge_from].clone();
        if reverse_from {
            from_members.reverse();
        }
        merged.extend(from_members);

        if instance.duration_limit().is_some()
            && RouteMetrics::of(instance, &merged).duration_excess(instance) > 0.0
        {
            continue;
        }

        for &c in &merged {
            route_of[c] = merge_into;
        }
        route_members[merge_into] = merged;
        route_members[merge_from].clear();
        route_load[merge_into] = combined_load;
        route_load[merge_from] = 0;
    }

    route_members.retain(|r| !r.is_empty());
    route_members
}
