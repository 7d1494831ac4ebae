//! Granular local search engine.
//!
//! # Algorithm
//!
//! Loads an individual's routes (plus empty routes up to the fleet size),
//! then sweeps over all clients in a random order. For each client `u` and
//! each of its `nb_granular` nearest neighbors `v` it evaluates, in order,
//! relocation of the chain starting at `u` next to `v`, the exchange of `u`
//! and `v`, and 2-opt / 2-opt* between them; the first improving move is
//! applied. Each sweep also tries moving `u` into an empty route, and
//! optionally runs SWAP* over every pair of routes whose polar sectors
//! overlap. Sweeps repeat until one applies nothing.
//!
//! Every move is priced in O(1) from cached prefix sums under the penalized
//! objective, so capacity and duration excess are allowed but paid for.
//!
//! # Reference
//!
//! Vidal, T. (2022). "Hybrid genetic search for the CVRP: Open-source
//! implementation and SWAP* neighborhood", *Computers & Operations Research* 140.
//!
//! Toth, P. & Vigo, D. (2003). "The granular tabu search and its application
//! to the vehicle-routing problem", *INFORMS Journal on Computing* 15(4).

use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::HgsConfig;
use crate::evaluation::{route_cost, Penalties};
use crate::ga::Individual;
use crate::models::{Customer, Instance};

use super::route_state::RouteState;

/// A move is applied only when it lowers the penalized cost by more than this.
pub(super) const IMPROVEMENT_EPSILON: f64 = 1e-6;

/// Local search operator over a fixed instance.
///
/// Reusable across calls; the client order buffer is kept between runs.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::evaluation::Penalties;
/// use u_hgs::config::HgsConfig;
/// use u_hgs::ga::Individual;
/// use u_hgs::local_search::LocalSearch;
/// use rand::SeedableRng;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 1, 0.0),
///     Customer::new(2, 1.0, 1.0, 1, 0.0),
///     Customer::new(3, 0.0, 1.0, 1, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 10).expect("valid");
/// let penalties = Penalties::initial(&instance);
/// let mut ls = LocalSearch::new(&instance, &HgsConfig::default());
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
///
/// // A crossing tour 0-1-3-2-0
/// let start = Individual::try_from_routes(vec![vec![1, 3, 2]], &instance, &penalties)
///     .expect("every client once");
/// let improved = ls.run(&start, &penalties, &mut rng);
/// assert!(improved.penalized_cost() < start.penalized_cost());
/// assert!((improved.distance() - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct LocalSearch<'a> {
    instance: &'a Instance,
    nb_granular: usize,
    use_swap_star: bool,
    order: Vec<usize>,
}

impl<'a> LocalSearch<'a> {
    /// Creates a local search for `instance` using the granular size and
    /// SWAP* switch from `config`.
    pub fn new(instance: &'a Instance, config: &HgsConfig) -> Self {
        Self {
            instance,
            nb_granular: config.nb_granular,
            use_swap_star: config.use_swap_star,
            order: Vec::with_capacity(instance.nb_clients()),
        }
    }

    /// The instance this search works on.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Improves `individual` until no move applies under `penalties`.
    ///
    /// Returns a freshly evaluated individual whose penalized cost is never
    /// above the input's. Routes come out ordered by the polar angle of
    /// their barycenter around the depot.
    pub fn run<R: Rng>(
        &mut self,
        individual: &Individual,
        penalties: &Penalties,
        rng: &mut R,
    ) -> Individual {
        let n = self.instance.nb_clients();
        self.order.clear();
        self.order.extend(1..=n);
        self.order.shuffle(rng);
        if n == 0 {
            return Individual::from_routes(Vec::new(), self.instance, penalties);
        }

        let mut search = Search::new(self.instance, *penalties, individual.routes());
        search.descend(&self.order, self.nb_granular, self.use_swap_star);
        trace!(
            "local search applied {} moves: {:.2} -> {:.2}",
            search.moves,
            individual.penalized_cost(),
            search.total_cost()
        );
        Individual::from_routes(search.export(), self.instance, penalties)
    }
}

/// Mutable search state: routes plus the location of every client.
pub(super) struct Search<'a> {
    pub(super) instance: &'a Instance,
    pub(super) penalties: Penalties,
    pub(super) routes: Vec<RouteState>,
    pub(super) route_of: Vec<usize>,
    pub(super) pos_of: Vec<usize>,
    pub(super) moves: usize,
}

impl<'a> Search<'a> {
    pub(super) fn new(instance: &'a Instance, penalties: Penalties, routes: &[Vec<usize>]) -> Self {
        let nb_routes = routes.len().max(instance.fleet_size());
        let mut states: Vec<RouteState> = routes.iter().cloned().map(RouteState::new).collect();
        states.resize_with(nb_routes, RouteState::default);

        let n = instance.nb_clients();
        let mut search = Self {
            instance,
            penalties,
            routes: states,
            route_of: vec![0; n + 1],
            pos_of: vec![0; n + 1],
            moves: 0,
        };
        for r in 0..nb_routes {
            search.refresh_route(r);
        }
        search
    }

    /// Recomputes route `r` after its client list changed.
    pub(super) fn refresh_route(&mut self, r: usize) {
        self.routes[r].refresh(self.instance, &self.penalties);
        for (k, &c) in self.routes[r].clients.iter().enumerate() {
            self.route_of[c] = r;
            self.pos_of[c] = k + 1;
        }
    }

    /// Penalized cost of a route with the given totals.
    #[inline]
    pub(super) fn cost(&self, distance: f64, load: i32, service: f64) -> f64 {
        route_cost(self.instance, &self.penalties, distance, load, service)
    }

    #[inline]
    pub(super) fn d(&self, from: usize, to: usize) -> f64 {
        self.instance.distance(from, to)
    }

    pub(super) fn total_cost(&self) -> f64 {
        self.routes.iter().map(|r| r.cost).sum()
    }

    fn descend(&mut self, order: &[usize], nb_granular: usize, use_swap_star: bool) {
        let instance = self.instance;
        let mut improved = true;
        while improved {
            improved = false;
            for &u in order {
                for &v in instance.neighbors(u).iter().take(nb_granular) {
                    if self.relocate(u, v) || self.swap(u, v) || self.two_opt(u, v) {
                        self.moves += 1;
                        improved = true;
                    }
                }
                if self.relocate_to_empty(u) {
                    self.moves += 1;
                    improved = true;
                }
            }
            if use_swap_star && self.swap_star_pass() {
                improved = true;
            }
        }
    }

    /// Non-empty routes sorted by the polar angle of their barycenter.
    fn export(self) -> Vec<Vec<usize>> {
        let instance = self.instance;
        let depot = instance.depot();
        let mut keyed: Vec<(f64, Vec<usize>)> = self
            .routes
            .into_iter()
            .filter(|r| !r.is_empty())
            .map(|r| {
                let len = r.len() as f64;
                let (sx, sy) = r.clients.iter().fold((0.0, 0.0), |(sx, sy), &c| {
                    let cust = instance.customer(c);
                    (sx + cust.x(), sy + cust.y())
                });
                let angle = Customer::depot(sx / len, sy / len).polar_angle(depot);
                (angle, r.clients)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, r)| r).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use u_numflow::random::create_rng;

    fn ring_instance(n: usize, demand: i32, capacity: i32) -> Instance {
        let mut customers = vec![Customer::depot(0.0, 0.0)];
        for i in 1..=n {
            let angle = i as f64 * std::f64::consts::TAU / n as f64;
            customers.push(Customer::new(
                i,
                10.0 * angle.cos(),
                10.0 * angle.sin(),
                demand,
                0.0,
            ));
        }
        Instance::euclidean(customers, capacity).expect("valid")
    }

    fn is_permutation(ind: &Individual, n: usize) -> bool {
        let mut sorted = ind.chromosome().to_vec();
        sorted.sort_unstable();
        sorted == (1..=n).collect::<Vec<_>>()
    }

    #[test]
    fn test_empty_instance() {
        let inst = Instance::euclidean(vec![Customer::depot(0.0, 0.0)], 10).expect("valid");
        let p = Penalties::initial(&inst);
        let mut ls = LocalSearch::new(&inst, &HgsConfig::default());
        let mut rng = create_rng(1);
        let out = ls.run(&Individual::from_routes(vec![], &inst, &p), &p, &mut rng);
        assert_eq!(out.nb_routes(), 0);
        assert_eq!(out.penalized_cost(), 0.0);
    }

    #[test]
    fn test_single_client() {
        let inst = ring_instance(1, 1, 10);
        let p = Penalties::initial(&inst);
        let mut ls = LocalSearch::new(&inst, &HgsConfig::default());
        let mut rng = create_rng(1);
        let start = Individual::from_routes(vec![vec![1]], &inst, &p);
        let out = ls.run(&start, &p, &mut rng);
        assert_eq!(out.routes(), &[vec![1]]);
    }

    #[test]
    fn test_repairs_overload() {
        // Capacity 3 with 6 unit-demand clients in one route: high penalties
        // must split it into feasible routes.
        let inst = ring_instance(6, 1, 3);
        let p = Penalties::new(1000.0, 1.0).expect("valid");
        let mut ls = LocalSearch::new(&inst, &HgsConfig::default());
        let mut rng = create_rng(5);
        let start = Individual::from_routes(vec![(1..=6).collect()], &inst, &p);
        assert!(!start.is_feasible());
        let out = ls.run(&start, &p, &mut rng);
        assert!(out.is_feasible());
        assert!(out.nb_routes() >= 2);
        assert!(is_permutation(&out, 6));
    }

    #[test]
    fn test_merges_routes_when_capacity_allows() {
        let inst = ring_instance(4, 1, 10);
        let p = Penalties::initial(&inst);
        let mut ls = LocalSearch::new(&inst, &HgsConfig::default());
        let mut rng = create_rng(9);
        let start = Individual::from_routes(vec![vec![1], vec![2], vec![3], vec![4]], &inst, &p);
        let out = ls.run(&start, &p, &mut rng);
        assert_eq!(out.nb_routes(), 1);
        assert!(out.distance() < start.distance());
    }

    #[test]
    fn test_routes_sorted_by_polar_angle() {
        let inst = ring_instance(8, 1, 2);
        let p = Penalties::new(1000.0, 1.0).expect("valid");
        let mut ls = LocalSearch::new(&inst, &HgsConfig::default());
        let mut rng = create_rng(3);
        let start = Individual::from_tour(&[5, 1, 7, 3, 2, 8, 4, 6], &inst, &p);
        let out = ls.run(&start, &p, &mut rng);
        let angles: Vec<f64> = out
            .routes()
            .iter()
            .map(|r| {
                let (sx, sy) = r.iter().fold((0.0, 0.0), |(x, y), &c| {
                    (x + inst.customer(c).x(), y + inst.customer(c).y())
                });
                let len = r.len() as f64;
                Customer::depot(sx / len, sy / len).polar_angle(inst.depot())
            })
            .collect();
        assert!(angles.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_duration_limit_is_priced() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 10.0, 0.0, 1, 5.0),
            Customer::new(2, 10.0, 1.0, 1, 5.0),
        ];
        let inst = Instance::euclidean(customers, 10)
            .expect("valid")
            .with_duration_limit(26.0)
            .expect("valid");
        let p = Penalties::new(1.0, 1000.0).expect("valid");
        let mut ls = LocalSearch::new(&inst, &HgsConfig::default());
        let mut rng = create_rng(2);
        // Together: ~21.05 travel + 10 service > 26
        let start = Individual::from_routes(vec![vec![1, 2]], &inst, &p);
        assert!(!start.is_feasible());
        let out = ls.run(&start, &p, &mut rng);
        assert!(out.is_feasible());
        assert_eq!(out.nb_routes(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]
        #[test]
        fn prop_local_search_never_worsens(
            coords in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0, 1i32..10), 2..25),
            capacity in 10i32..40,
            penalty in 0.5f64..100.0,
            swap_star in any::<bool>(),
            seed in 0u64..500,
        ) {
            let mut customers = vec![Customer::depot(0.0, 0.0)];
            for (i, &(x, y, d)) in coords.iter().enumerate() {
                customers.push(Customer::new(i + 1, x, y, d, 0.0));
            }
            let n = coords.len();
            let inst = Instance::euclidean(customers, capacity).expect("valid");
            let p = Penalties::new(penalty, 1.0).expect("valid");
            let config = HgsConfig::default().with_nb_granular(5).with_swap_star(swap_star);
            let mut ls = LocalSearch::new(&inst, &config);
            let mut rng = create_rng(seed);

            let mut tour: Vec<usize> = (1..=n).collect();
            tour.shuffle(&mut rng);
            let start = Individual::from_tour(&tour, &inst, &p);
            let out = ls.run(&start, &p, &mut rng);
            prop_assert!(out.penalized_cost() <= start.penalized_cost() + 1e-9);
            prop_assert!(is_permutation(&out, n));
            prop_assert!(out.nb_routes() <= inst.fleet_size().max(start.nb_routes()));
        }
    }
}
