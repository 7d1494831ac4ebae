//! Individuals: a giant tour with its route partition and evaluation.
//!
//! An [`Individual`] is only ever built from a route partition, and every
//! cached field (chromosome, successor/predecessor arrays, evaluation) is
//! derived from it at construction. The only mutation is
//! [`rescore`](Individual::rescore), which reprices the cached excesses
//! under new penalty weights.

use crate::error::Error;
use crate::evaluation::{Penalties, RouteEvaluator, RouteMetrics};
use crate::models::{Instance, Solution};

use super::split::{split, split_with_routes};

/// Tolerance under which an excess counts as zero.
const FEASIBILITY_EPSILON: f64 = 1e-5;

/// Cost breakdown of an individual.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluation {
    /// Total travel distance.
    pub distance: f64,
    /// Summed load excess over all routes.
    pub capacity_excess: f64,
    /// Summed duration excess over all routes.
    pub duration_excess: f64,
    /// `distance + pc·capacityExcess + pd·durationExcess`.
    pub penalized_cost: f64,
    /// Both excesses are zero.
    pub is_feasible: bool,
    /// Number of non-empty routes.
    pub nb_routes: usize,
}

/// A solution candidate.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::evaluation::Penalties;
/// use u_hgs::ga::Individual;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 10, 0.0),
///     Customer::new(2, 2.0, 0.0, 10, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 10).expect("valid");
/// let penalties = Penalties::new(5.0, 1.0).expect("valid");
///
/// let ind = Individual::try_from_routes(vec![vec![1, 2]], &instance, &penalties)
///     .expect("every client once");
/// assert_eq!(ind.chromosome(), &[1, 2]);
/// assert!(!ind.is_feasible());
/// // 4 + 5 * 10
/// assert!((ind.penalized_cost() - 54.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct Individual {
    chromosome: Vec<usize>,
    routes: Vec<Vec<usize>>,
    successors: Vec<usize>,
    predecessors: Vec<usize>,
    evaluation: Evaluation,
}

impl Individual {
    /// Builds an individual from routes after checking that they visit every
    /// client of `instance` exactly once. Empty routes are dropped.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRoutes`] for the first client that is out of range,
    /// visited twice or missing.
    pub fn try_from_routes(
        routes: Vec<Vec<usize>>,
        instance: &Instance,
        penalties: &Penalties,
    ) -> Result<Self, Error> {
        let n = instance.nb_clients();
        let mut seen = vec![false; n + 1];
        for &c in routes.iter().flatten() {
            if c == 0 || c > n {
                return Err(Error::InvalidRoutes {
                    client: c,
                    reason: "is not a client of the instance",
                });
            }
            if std::mem::replace(&mut seen[c], true) {
                return Err(Error::InvalidRoutes {
                    client: c,
                    reason: "is visited twice",
                });
            }
        }
        if let Some(client) = (1..=n).find(|&c| !seen[c]) {
            return Err(Error::InvalidRoutes {
                client,
                reason: "is not visited",
            });
        }
        Ok(Self::from_routes(routes, instance, penalties))
    }

    /// Builds an individual from routes; empty routes are dropped.
    ///
    /// The chromosome is the concatenation of the routes, which must be a
    /// permutation of the clients.
    pub(crate) fn from_routes(
        routes: Vec<Vec<usize>>,
        instance: &Instance,
        penalties: &Penalties,
    ) -> Self {
        let routes: Vec<Vec<usize>> = routes.into_iter().filter(|r| !r.is_empty()).collect();
        let n = instance.nb_clients();
        let mut chromosome = Vec::with_capacity(n);
        let mut successors = vec![0; n + 1];
        let mut predecessors = vec![0; n + 1];
        let mut evaluation = Evaluation {
            nb_routes: routes.len(),
            ..Evaluation::default()
        };

        for route in &routes {
            let m = RouteMetrics::of(instance, route);
            evaluation.distance += m.distance;
            evaluation.capacity_excess += m.capacity_excess(instance);
            evaluation.duration_excess += m.duration_excess(instance);
            for (k, &c) in route.iter().enumerate() {
                predecessors[c] = if k == 0 { 0 } else { route[k - 1] };
                successors[c] = route.get(k + 1).copied().unwrap_or(0);
            }
            chromosome.extend_from_slice(route);
        }
        debug_assert!(is_client_permutation(&chromosome, n));

        let mut ind = Self {
            chromosome,
            routes,
            successors,
            predecessors,
            evaluation,
        };
        ind.rescore(penalties);
        ind
    }

    /// Splits a giant tour optimally and builds the individual.
    pub(crate) fn from_tour(tour: &[usize], instance: &Instance, penalties: &Penalties) -> Self {
        Self::from_routes(split(tour, instance, penalties).routes, instance, penalties)
    }

    /// Splits a giant tour into exactly `nb_routes` routes (clamped) and
    /// builds the individual.
    pub(crate) fn from_tour_with_routes(
        tour: &[usize],
        instance: &Instance,
        penalties: &Penalties,
        nb_routes: usize,
    ) -> Self {
        let routes = split_with_routes(tour, instance, penalties, nb_routes).routes;
        Self::from_routes(routes, instance, penalties)
    }

    /// Recomputes the penalized cost from the cached distance and excesses.
    pub fn rescore(&mut self, penalties: &Penalties) {
        let e = &mut self.evaluation;
        e.penalized_cost = penalties.penalized(e.distance, e.capacity_excess, e.duration_excess);
        e.is_feasible =
            e.capacity_excess < FEASIBILITY_EPSILON && e.duration_excess < FEASIBILITY_EPSILON;
    }

    /// The giant tour: a permutation of `1..=n`.
    pub fn chromosome(&self) -> &[usize] {
        &self.chromosome
    }

    /// Non-empty routes.
    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    /// The cost breakdown.
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// Penalized cost.
    pub fn penalized_cost(&self) -> f64 {
        self.evaluation.penalized_cost
    }

    /// Total travel distance.
    pub fn distance(&self) -> f64 {
        self.evaluation.distance
    }

    /// No capacity or duration excess.
    pub fn is_feasible(&self) -> bool {
        self.evaluation.is_feasible
    }

    /// Number of routes.
    pub fn nb_routes(&self) -> usize {
        self.evaluation.nb_routes
    }

    /// Broken-pairs distance to `other`, normalized by the number of clients.
    ///
    /// Counts, for each client, whether its successor link is absent from
    /// the other individual (in either direction), plus route starts that
    /// are interior in the other one. Averaged over both directions so the
    /// measure is symmetric. 0 for identical or mirrored route sets.
    pub fn broken_pairs_distance(&self, other: &Individual) -> f64 {
        let n = self.successors.len().saturating_sub(1);
        if n == 0 {
            return 0.0;
        }
        let broken = one_way_broken_pairs(self, other) + one_way_broken_pairs(other, self);
        broken as f64 / (2.0 * n as f64)
    }

    /// Exports timed routes for presentation or serialization.
    pub fn to_solution(&self, instance: &Instance) -> Solution {
        let evaluator = RouteEvaluator::new(instance);
        let mut solution = Solution::new();
        for (idx, route) in self.routes.iter().enumerate() {
            let (built, _) = evaluator.build_route(idx, route);
            solution.add_route(built);
        }
        solution.set_penalized_cost(self.evaluation.penalized_cost);
        solution
    }
}

fn one_way_broken_pairs(a: &Individual, b: &Individual) -> usize {
    let mut count = 0;
    for j in 1..a.successors.len() {
        if a.successors[j] != b.successors[j] && a.successors[j] != b.predecessors[j] {
            count += 1;
        }
        if a.predecessors[j] == 0 && b.predecessors[j] != 0 && b.successors[j] != 0 {
            count += 1;
        }
    }
    count
}

fn is_client_permutation(tour: &[usize], n: usize) -> bool {
    let mut sorted = tour.to_vec();
    sorted.sort_unstable();
    sorted.iter().copied().eq(1..=n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;

    fn square_instance() -> Instance {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 1.0, 3, 0.0),
            Customer::new(2, -1.0, 1.0, 3, 0.0),
            Customer::new(3, -1.0, -1.0, 3, 0.0),
            Customer::new(4, 1.0, -1.0, 3, 0.0),
        ];
        Instance::euclidean(customers, 6).expect("valid")
    }

    fn penalties() -> Penalties {
        Penalties::new(10.0, 1.0).expect("valid")
    }

    #[test]
    fn test_from_routes_drops_empty() {
        let inst = square_instance();
        let ind = Individual::from_routes(vec![vec![1, 2], vec![], vec![3, 4]], &inst, &penalties());
        assert_eq!(ind.nb_routes(), 2);
        assert_eq!(ind.chromosome(), &[1, 2, 3, 4]);
        assert!(ind.is_feasible());
        let expected = RouteMetrics::of(&inst, &[1, 2]).distance + RouteMetrics::of(&inst, &[3, 4]).distance;
        assert!((ind.distance() - expected).abs() < 1e-10);
        assert!((ind.penalized_cost() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_try_from_routes_checks_every_client() {
        let inst = square_instance();
        let p = penalties();
        let ok = Individual::try_from_routes(vec![vec![4, 1], vec![2, 3]], &inst, &p)
            .expect("every client once");
        assert_eq!(ok.chromosome(), &[4, 1, 2, 3]);

        let dup = Individual::try_from_routes(vec![vec![1, 2], vec![2, 3, 4]], &inst, &p);
        assert!(matches!(
            dup,
            Err(Error::InvalidRoutes { client: 2, reason: "is visited twice" })
        ));
        let missing = Individual::try_from_routes(vec![vec![1, 2], vec![4]], &inst, &p);
        assert!(matches!(
            missing,
            Err(Error::InvalidRoutes { client: 3, reason: "is not visited" })
        ));
        let depot = Individual::try_from_routes(vec![vec![1, 0, 2, 3, 4]], &inst, &p);
        assert!(matches!(depot, Err(Error::InvalidRoutes { client: 0, .. })));
        let outside = Individual::try_from_routes(vec![vec![1, 2, 3, 4, 9]], &inst, &p);
        assert!(matches!(outside, Err(Error::InvalidRoutes { client: 9, .. })));
    }

    #[test]
    fn test_rescore() {
        let inst = square_instance();
        let mut ind = Individual::from_routes(vec![vec![1, 2, 3, 4]], &inst, &penalties());
        assert!(!ind.is_feasible());
        assert!((ind.evaluation().capacity_excess - 6.0).abs() < 1e-10);
        let before = ind.penalized_cost();
        ind.rescore(&Penalties::new(20.0, 1.0).expect("valid"));
        assert!((ind.penalized_cost() - before - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_tour_splits() {
        let inst = square_instance();
        let ind = Individual::from_tour(&[1, 2, 3, 4], &inst, &penalties());
        assert_eq!(ind.nb_routes(), 2);
        assert!(ind.is_feasible());
        let ind = Individual::from_tour_with_routes(&[1, 2, 3, 4], &inst, &penalties(), 4);
        assert_eq!(ind.nb_routes(), 4);
    }

    #[test]
    fn test_broken_pairs_identical_and_reversed() {
        let inst = square_instance();
        let a = Individual::from_routes(vec![vec![1, 2], vec![3, 4]], &inst, &penalties());
        let b = Individual::from_routes(vec![vec![4, 3], vec![2, 1]], &inst, &penalties());
        assert_eq!(a.broken_pairs_distance(&a), 0.0);
        assert_eq!(a.broken_pairs_distance(&b), 0.0);
    }

    #[test]
    fn test_broken_pairs_symmetric() {
        let inst = square_instance();
        let a = Individual::from_routes(vec![vec![1, 2], vec![3, 4]], &inst, &penalties());
        let b = Individual::from_routes(vec![vec![1, 4], vec![2, 3]], &inst, &penalties());
        let c = Individual::from_routes(vec![vec![1, 2, 3, 4]], &inst, &penalties());
        let ab = a.broken_pairs_distance(&b);
        assert!(ab > 0.0 && ab <= 1.0);
        assert_eq!(ab, b.broken_pairs_distance(&a));
        assert_eq!(a.broken_pairs_distance(&c), c.broken_pairs_distance(&a));
    }

    #[test]
    fn test_to_solution() {
        let inst = square_instance();
        let ind = Individual::from_routes(vec![vec![1, 2], vec![3, 4]], &inst, &penalties());
        let sol = ind.to_solution(&inst);
        assert_eq!(sol.num_routes(), 2);
        assert!((sol.total_distance() - ind.distance()).abs() < 1e-10);
        assert!(sol.verify(&inst).is_ok());
    }
}
