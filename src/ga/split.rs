//! Split algorithm for partitioning a giant tour into routes.
//!
//! # Algorithm
//!
//! Given a giant tour (permutation of clients), finds the partition into
//! contiguous sub-routes minimizing the total penalized cost
//! `distance + pc·capacityExcess + pd·durationExcess`. The visiting order
//! is never changed; only the cut points are chosen.
//!
//! Modeled as a shortest-path problem on an auxiliary DAG where node `i`
//! is the boundary after the i-th client and arc `(j, i)` serves
//! `tour[j..i]` in one route. Overloaded routes are allowed and priced by
//! the penalties, so every order has a partition.
//!
//! When the number of routes must be controlled (fleet size, or a target
//! route count after crossover) the DP gets one layer per route.
//!
//! # Complexity
//!
//! O(n²) for [`split`], O(k·n²) for [`split_with_routes`]. Every route start
//! is extended to the end of the tour: overloaded routes are only priced,
//! and explicit matrices need not satisfy the triangle inequality, so no
//! load bound can cut the scan without losing optimality. The layered DP
//! only skips boundaries that cannot leave one client per remaining route.
//!
//! # Reference
//!
//! Prins, C. (2004). "A simple and effective evolutionary algorithm for the
//! vehicle routing problem", *Computers & Operations Research* 31(12), 1985-2002.
//!
//! Vidal, T. (2022). "Hybrid genetic search for the CVRP: Open-source
//! implementation and SWAP* neighborhood", *Computers & Operations Research* 140.

use crate::evaluation::{route_cost, Penalties};
use crate::models::Instance;

/// Result of the split algorithm.
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// Routes as sequences of client IDs (never empty).
    pub routes: Vec<Vec<usize>>,
    /// Total penalized cost of all routes.
    pub cost: f64,
}

impl SplitResult {
    fn empty() -> Self {
        Self {
            routes: Vec::new(),
            cost: 0.0,
        }
    }
}

/// Calls `visit(i, cost)` for every end boundary `i` in `start+1..=end`
/// with the penalized cost of the route serving `tour[start..i]`.
fn for_each_route_from<F>(
    tour: &[usize],
    instance: &Instance,
    penalties: &Penalties,
    start: usize,
    end: usize,
    mut visit: F,
) where
    F: FnMut(usize, f64),
{
    let mut load = 0;
    let mut service = 0.0;
    let mut open_distance = 0.0;
    let mut prev = 0;
    for (offset, &cid) in tour[start..end].iter().enumerate() {
        open_distance += instance.distance(prev, cid);
        load += instance.demand(cid);
        service += instance.service_duration(cid);
        prev = cid;
        let distance = open_distance + instance.distance(cid, 0);
        visit(
            start + offset + 1,
            route_cost(instance, penalties, distance, load, service),
        );
    }
}

/// Rebuilds routes from the end boundary; `pred(layer, end)` gives the start
/// of the route ending at `end`.
fn backtrack(
    tour: &[usize],
    pred: impl Fn(usize, usize) -> usize,
    mut layers: usize,
) -> Vec<Vec<usize>> {
    let mut routes = Vec::with_capacity(layers);
    let mut end = tour.len();
    while end > 0 {
        let start = pred(layers, end);
        routes.push(tour[start..end].to_vec());
        end = start;
        layers = layers.saturating_sub(1);
    }
    routes.reverse();
    routes
}

/// Splits a giant tour into optimal sub-routes using dynamic programming.
///
/// The number of routes is unconstrained unless the optimum needs more
/// vehicles than the instance fleet; in that case the best partition with
/// at most `fleet_size` routes is returned.
///
/// # Arguments
///
/// * `tour`: Client IDs in giant-tour order (depot excluded)
/// * `instance`: Problem data
/// * `penalties`: Weights pricing capacity and duration excess
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::evaluation::Penalties;
/// use u_hgs::ga::split;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 10, 0.0),
///     Customer::new(2, 2.0, 0.0, 10, 0.0),
///     Customer::new(3, 3.0, 0.0, 10, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 30).expect("valid");
/// let penalties = Penalties::new(100.0, 1.0).expect("valid");
///
/// let result = split(&[1, 2, 3], &instance, &penalties);
/// assert_eq!(result.routes.len(), 1); // all fit in one route
/// assert!((result.cost - 6.0).abs() < 1e-10);
/// ```
pub fn split(tour: &[usize], instance: &Instance, penalties: &Penalties) -> SplitResult {
    let n = tour.len();
    if n == 0 {
        return SplitResult::empty();
    }

    // cost[i] = minimum cost to serve tour[0..i]
    // pred[i] = start of the last route ending at i
    let mut cost = vec![f64::INFINITY; n + 1];
    let mut pred = vec![0usize; n + 1];
    let mut count = vec![0usize; n + 1];
    cost[0] = 0.0;

    for j in 0..n {
        let base = cost[j];
        let base_count = count[j];
        for_each_route_from(tour, instance, penalties, j, n, |i, rc| {
            if base + rc < cost[i] {
                cost[i] = base + rc;
                pred[i] = j;
                count[i] = base_count + 1;
            }
        });
    }

    if count[n] > instance.fleet_size() {
        return layered_split(tour, instance, penalties, instance.fleet_size(), false);
    }

    SplitResult {
        routes: backtrack(tour, |_, end| pred[end], count[n]),
        cost: cost[n],
    }
}

/// Splits a giant tour into exactly `nb_routes` non-empty routes.
///
/// `nb_routes` is clamped to `[1, min(n, fleet_size)]`. Used after
/// crossover to keep the offspring's route count equal to one parent's.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::evaluation::Penalties;
/// use u_hgs::ga::split_with_routes;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 10, 0.0),
///     Customer::new(2, 2.0, 0.0, 10, 0.0),
///     Customer::new(3, 3.0, 0.0, 10, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 30).expect("valid");
/// let penalties = Penalties::new(100.0, 1.0).expect("valid");
///
/// let result = split_with_routes(&[1, 2, 3], &instance, &penalties, 2);
/// assert_eq!(result.routes, vec![vec![1], vec![2, 3]]);
/// assert!((result.cost - 8.0).abs() < 1e-10);
/// ```
pub fn split_with_routes(
    tour: &[usize],
    instance: &Instance,
    penalties: &Penalties,
    nb_routes: usize,
) -> SplitResult {
    let n = tour.len();
    if n == 0 {
        return SplitResult::empty();
    }
    let k = nb_routes.clamp(1, n.min(instance.fleet_size()).max(1));
    layered_split(tour, instance, penalties, k, true)
}

/// Layered DP: `cost[k][i]` = best cost of serving `tour[0..i]` with `k`
/// routes. Uses exactly `max_routes` routes when `exact`, at most otherwise.
fn layered_split(
    tour: &[usize],
    instance: &Instance,
    penalties: &Penalties,
    max_routes: usize,
    exact: bool,
) -> SplitResult {
    let n = tour.len();
    let k_max = max_routes.clamp(1, n);
    let mut cost = vec![vec![f64::INFINITY; n + 1]; k_max + 1];
    let mut pred = vec![vec![0usize; n + 1]; k_max + 1];
    cost[0][0] = 0.0;

    for k in 1..=k_max {
        // Leave at least one client for each of the remaining routes.
        let last_end = if exact { n - (k_max - k) } else { n };
        for j in (k - 1)..last_end {
            let base = cost[k - 1][j];
            if !base.is_finite() {
                continue;
            }
            let (row_cost, row_pred) = (&mut cost[k], &mut pred[k]);
            for_each_route_from(tour, instance, penalties, j, last_end, |i, rc| {
                if base + rc < row_cost[i] {
                    row_cost[i] = base + rc;
                    row_pred[i] = j;
                }
            });
        }
    }

    let best_k = if exact {
        k_max
    } else {
        (1..=k_max)
            .min_by(|&a, &b| cost[a][n].total_cmp(&cost[b][n]))
            .unwrap_or(k_max)
    };

    SplitResult {
        routes: backtrack(tour, |k, end| pred[k][end], best_k),
        cost: cost[best_k][n],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::RouteMetrics;
    use crate::models::Customer;
    use proptest::prelude::*;

    fn line_instance(capacity: i32) -> Instance {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, 2.0, 0.0, 10, 0.0),
            Customer::new(3, 3.0, 0.0, 10, 0.0),
        ];
        Instance::euclidean(customers, capacity).expect("valid")
    }

    fn high() -> Penalties {
        Penalties::new(1000.0, 1000.0).expect("valid")
    }

    /// Minimum over all 2^(n-1) cut sets of the fixed order.
    fn brute_force(
        tour: &[usize],
        instance: &Instance,
        penalties: &Penalties,
        exact_routes: Option<usize>,
    ) -> f64 {
        let n = tour.len();
        let mut best = f64::INFINITY;
        for mask in 0u32..(1 << (n - 1)) {
            if let Some(k) = exact_routes {
                if mask.count_ones() as usize + 1 != k {
                    continue;
                }
            }
            let mut total = 0.0;
            let mut start = 0;
            for pos in 1..=n {
                if pos == n || mask & (1 << (pos - 1)) != 0 {
                    total += RouteMetrics::of(instance, &tour[start..pos])
                        .penalized_cost(instance, penalties);
                    start = pos;
                }
            }
            best = best.min(total);
        }
        best
    }

    #[test]
    fn test_split_single_route() {
        let inst = line_instance(30);
        let result = split(&[1, 2, 3], &inst, &high());
        assert_eq!(result.routes, vec![vec![1, 2, 3]]);
        // 0→1→2→3→0 = 1+1+1+3 = 6
        assert!((result.cost - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_split_forced_two_routes() {
        let inst = line_instance(20);
        let result = split(&[1, 2, 3], &inst, &high());
        // Optimal split: [1]+[2,3] = 2+6 = 8
        assert_eq!(result.routes, vec![vec![1], vec![2, 3]]);
        assert!((result.cost - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_split_each_alone() {
        let inst = line_instance(10);
        let result = split(&[1, 2, 3], &inst, &high());
        assert_eq!(result.routes.len(), 3);
        // 2+4+6 = 12
        assert!((result.cost - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_split_low_penalty_accepts_overload() {
        let inst = line_instance(20);
        let cheap = Penalties::new(0.1, 1.0).expect("valid");
        let result = split(&[1, 2, 3], &inst, &cheap);
        // One overloaded route: 6 + 0.1 * 10 = 7 < 8
        assert_eq!(result.routes.len(), 1);
        assert!((result.cost - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_split_empty_and_single() {
        let inst = line_instance(30);
        let empty = split(&[], &inst, &high());
        assert!(empty.routes.is_empty());
        assert_eq!(empty.cost, 0.0);
        let single = split(&[2], &inst, &high());
        assert_eq!(single.routes, vec![vec![2]]);
        assert!((single.cost - 4.0).abs() < 1e-10);
        let empty_k = split_with_routes(&[], &inst, &high(), 3);
        assert!(empty_k.routes.is_empty());
    }

    #[test]
    fn test_split_respects_fleet_size() {
        let inst = line_instance(10).with_fleet_size(2);
        let result = split(&[1, 2, 3], &inst, &high());
        assert_eq!(result.routes.len(), 2);
        let expected = brute_force(&[1, 2, 3], &inst, &high(), Some(2));
        assert!((result.cost - expected).abs() < 1e-9);
    }

    #[test]
    fn test_split_with_routes_clamped() {
        let inst = line_instance(30);
        let zero = split_with_routes(&[1, 2, 3], &inst, &high(), 0);
        assert_eq!(zero.routes.len(), 1);
        let many = split_with_routes(&[1, 2, 3], &inst, &high(), 10);
        assert_eq!(many.routes.len(), 3);
    }

    #[test]
    fn test_split_four_clients_capacity_two() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 2.0, 1.0, 1, 0.0),
            Customer::new(2, 3.0, -2.0, 1, 0.0),
            Customer::new(3, -1.0, 4.0, 1, 0.0),
            Customer::new(4, -3.0, -1.0, 1, 0.0),
        ];
        let inst = Instance::euclidean(customers, 2).expect("valid");
        for tour in [[1, 2, 3, 4], [4, 3, 2, 1], [1, 3, 2, 4], [2, 4, 1, 3]] {
            let result = split(&tour, &inst, &high());
            let expected = brute_force(&tour, &inst, &high(), None);
            assert!((result.cost - expected).abs() < 1e-9);
            let flat: Vec<usize> = result.routes.concat();
            assert_eq!(flat, tour.to_vec());
        }
    }

    proptest! {
        #[test]
        fn prop_split_matches_brute_force(
            coords in prop::collection::vec((-20.0f64..20.0, -20.0f64..20.0, 1i32..8), 1..8),
            capacity in 5i32..20,
            penalty in 0.5f64..50.0,
            k in 1usize..8,
        ) {
            let mut customers = vec![Customer::depot(0.0, 0.0)];
            for (i, &(x, y, d)) in coords.iter().enumerate() {
                customers.push(Customer::new(i + 1, x, y, d, 0.0));
            }
            let n = coords.len();
            let inst = Instance::euclidean(customers, capacity)
                .expect("valid")
                .with_fleet_size(n);
            let penalties = Penalties::new(penalty, 1.0).expect("valid");
            let tour: Vec<usize> = (1..=n).rev().collect();

            let free = split(&tour, &inst, &penalties);
            prop_assert!((free.cost - brute_force(&tour, &inst, &penalties, None)).abs() < 1e-6);
            prop_assert_eq!(free.routes.concat(), tour.clone());

            let k = k.min(n);
            let fixed = split_with_routes(&tour, &inst, &penalties, k);
            prop_assert_eq!(fixed.routes.len(), k);
            prop_assert!(fixed.routes.iter().all(|r| !r.is_empty()));
            prop_assert!((fixed.cost - brute_force(&tour, &inst, &penalties, Some(k))).abs() < 1e-6);
        }
    }
}
