//! Population management with biased fitness and adaptive penalties.
//!
//! # Algorithm
//!
//! Individuals live in two sub-populations keyed by feasibility, each sorted
//! by penalized cost. Every member caches its broken-pairs distance to all
//! others in the same sub-population. When a sub-population grows past
//! `mu + lambda`, the member with the worst biased fitness is removed
//! repeatedly until `mu` remain.
//!
//! Biased fitness, for cost position `p` and diversity position `q` both
//! normalized by `len − 1`:
//!
//! ```text
//! p                              for the nb_elite best-cost members
//! p + (1 − nb_elite / len) · q   otherwise
//! ```
//!
//! where diversity is the average distance to the `nb_close` closest
//! members (more distant ranks first). A member identical to a better-cost
//! one gets [`CLONE_PENALTY`] on top, so duplicates go first. The best-cost
//! member is never removed.
//!
//! Penalty weights are adapted from the share of feasible offspring over
//! the last `nb_iter_penalty_management` insertions.
//!
//! # Reference
//!
//! Vidal, T., Crainic, T.G., Gendreau, M., Lahrichi, N. & Rei, W. (2012).
//! "A hybrid genetic algorithm for multidepot and periodic vehicle routing
//! problems", *Operations Research* 60(3), 611-624.

use std::collections::{HashMap, VecDeque};

use log::{debug, info};
use rand::Rng;

use crate::config::{HgsConfig, SeedHeuristic};
use crate::constructive::seed_tour;
use crate::evaluation::Penalties;
use crate::local_search::LocalSearch;
use crate::models::Instance;

use super::Individual;

/// Extra biased fitness of a member identical to a better-cost one.
pub const CLONE_PENALTY: f64 = 2.0;

/// Broken-pairs distance under which two individuals are identical.
const CLONE_EPSILON: f64 = 1e-6;

/// Minimum cost gain for a new best solution.
const IMPROVEMENT_EPSILON: f64 = 1e-6;

/// Penalty multiplier of feasibility repair passes.
pub(crate) const REPAIR_PENALTY_FACTOR: f64 = 10.0;

#[derive(Debug, Clone)]
struct Member {
    id: u64,
    individual: Individual,
    biased_fitness: f64,
    /// `(distance, member id)`, closest first.
    proximity: Vec<(f64, u64)>,
}

impl Member {
    fn average_closest(&self, k: usize) -> f64 {
        let k = k.min(self.proximity.len());
        if k == 0 {
            return 0.0;
        }
        self.proximity[..k].iter().map(|&(d, _)| d).sum::<f64>() / k as f64
    }
}

/// Members of one feasibility class, sorted by penalized cost.
#[derive(Debug, Clone, Default)]
struct SubPopulation {
    members: Vec<Member>,
}

impl SubPopulation {
    fn len(&self) -> usize {
        self.members.len()
    }

    fn add(&mut self, id: u64, individual: Individual) {
        let mut proximity = Vec::with_capacity(self.members.len());
        for m in &mut self.members {
            let d = individual.broken_pairs_distance(&m.individual);
            let at = m.proximity.partition_point(|&(x, _)| x <= d);
            m.proximity.insert(at, (d, id));
            proximity.push((d, m.id));
        }
        proximity.sort_by(|a, b| a.0.total_cmp(&b.0));

        let cost = individual.penalized_cost();
        let at = self
            .members
            .partition_point(|m| m.individual.penalized_cost() <= cost);
        self.members.insert(
            at,
            Member {
                id,
                individual,
                biased_fitness: 0.0,
                proximity,
            },
        );
    }

    fn remove(&mut self, index: usize) -> Member {
        let removed = self.members.remove(index);
        for m in &mut self.members {
            m.proximity.retain(|&(_, id)| id != removed.id);
        }
        removed
    }

    fn sort_by_cost(&mut self) {
        self.members.sort_by(|a, b| {
            a.individual
                .penalized_cost()
                .total_cmp(&b.individual.penalized_cost())
        });
    }

    fn update_biased_fitness(&mut self, nb_elite: usize, nb_close: usize) {
        let len = self.members.len();
        if len == 0 {
            return;
        }
        if len == 1 {
            self.members[0].biased_fitness = 0.0;
            return;
        }

        let position: HashMap<u64, usize> = self
            .members
            .iter()
            .enumerate()
            .map(|(k, m)| (m.id, k))
            .collect();
        let mut by_diversity: Vec<(f64, usize)> = self
            .members
            .iter()
            .enumerate()
            .map(|(k, m)| (-m.average_closest(nb_close), k))
            .collect();
        by_diversity.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let denom = (len - 1) as f64;
        let diversity_weight = 1.0 - nb_elite as f64 / len as f64;
        for (q, &(_, k)) in by_diversity.iter().enumerate() {
            let p = k as f64 / denom;
            let member = &mut self.members[k];
            let mut fitness = if k < nb_elite {
                p
            } else {
                p + diversity_weight * q as f64 / denom
            };
            let is_clone = member
                .proximity
                .iter()
                .take_while(|&&(d, _)| d < CLONE_EPSILON)
                .any(|(_, id)| position.get(id).is_some_and(|&j| j < k));
            if is_clone {
                fitness += CLONE_PENALTY;
            }
            member.biased_fitness = fitness;
        }
    }

    /// Removes the member with the worst biased fitness, never the best-cost
    /// one.
    fn remove_worst(&mut self, nb_elite: usize, nb_close: usize) -> Option<Member> {
        self.update_biased_fitness(nb_elite, nb_close);
        let worst = self
            .members
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.biased_fitness.total_cmp(&b.1.biased_fitness))
            .map(|(k, _)| k)?;
        Some(self.remove(worst))
    }

    fn average_cost(&self, mu: usize) -> Option<f64> {
        let k = mu.min(self.len());
        if k == 0 {
            return None;
        }
        let sum: f64 = self.members[..k]
            .iter()
            .map(|m| m.individual.penalized_cost())
            .sum();
        Some(sum / k as f64)
    }

    fn average_diversity(&self, mu: usize, nb_close: usize) -> Option<f64> {
        let k = mu.min(self.len());
        if k == 0 {
            return None;
        }
        let sum: f64 = self.members[..k]
            .iter()
            .map(|m| m.average_closest(nb_close))
            .sum();
        Some(sum / k as f64)
    }
}

/// Feasible and infeasible individuals, the best solution found and the
/// current penalty weights.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::config::HgsConfig;
/// use u_hgs::ga::Population;
/// use u_hgs::local_search::LocalSearch;
/// use rand::SeedableRng;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 1, 0.0),
///     Customer::new(2, 0.0, 1.0, 1, 0.0),
///     Customer::new(3, -1.0, 0.0, 1, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 3).expect("valid");
/// let config = HgsConfig::default().with_mu(4);
/// let mut ls = LocalSearch::new(&instance, &config);
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
///
/// let mut population = Population::new(&instance, config);
/// population.generate(4, &mut ls, &mut rng);
/// assert!(population.len() >= 1);
/// assert!(population.best_found().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Population<'a> {
    instance: &'a Instance,
    config: HgsConfig,
    feasible: SubPopulation,
    infeasible: SubPopulation,
    best: Option<Individual>,
    penalties: Penalties,
    recent_feasibility: VecDeque<bool>,
    next_id: u64,
    pure_savings_used: bool,
    pure_nn_used: bool,
}

impl<'a> Population<'a> {
    /// Creates an empty population with initial penalties for `instance`.
    pub fn new(instance: &'a Instance, config: HgsConfig) -> Self {
        let window = config.nb_iter_penalty_management;
        Self {
            instance,
            config,
            feasible: SubPopulation::default(),
            infeasible: SubPopulation::default(),
            best: None,
            penalties: Penalties::initial(instance),
            recent_feasibility: VecDeque::with_capacity(window + 1),
            next_id: 0,
            pure_savings_used: false,
            pure_nn_used: false,
        }
    }

    /// Seeds `count` individuals.
    ///
    /// Each one is built by a heuristic drawn from the seeding strategy,
    /// split, improved by local search and inserted. Infeasible seeds get a
    /// repair pass at ten times the penalties with probability 1/2.
    pub fn generate<R: Rng>(&mut self, count: usize, ls: &mut LocalSearch<'_>, rng: &mut R) {
        for _ in 0..count {
            let heuristic = self.draw_heuristic(rng);
            let randomized = match heuristic {
                SeedHeuristic::Savings => std::mem::replace(&mut self.pure_savings_used, true),
                SeedHeuristic::NearestNeighbor => std::mem::replace(&mut self.pure_nn_used, true),
                SeedHeuristic::Random => true,
            };
            let tour = seed_tour(heuristic, self.instance, randomized, rng);
            let seed = Individual::from_tour(&tour, self.instance, &self.penalties);
            let improved = ls.run(&seed, &self.penalties, rng);
            self.insert(improved.clone(), true);
            if !improved.is_feasible() && rng.random_range(0..2) == 0 {
                let repaired = ls.run(
                    &improved,
                    &self.penalties.scaled(REPAIR_PENALTY_FACTOR),
                    rng,
                );
                if repaired.is_feasible() {
                    self.insert(repaired, false);
                }
            }
        }
        info!(
            "population seeded: {} feasible, {} infeasible",
            self.feasible.len(),
            self.infeasible.len()
        );
    }

    fn draw_heuristic<R: Rng>(&self, rng: &mut R) -> SeedHeuristic {
        let total = self.config.seeding.total_weight();
        if total == 0 {
            return SeedHeuristic::Random;
        }
        self.config.seeding.pick(rng.random_range(0..total))
    }

    /// Adds a copy of `individual` to the sub-population matching its
    /// feasibility.
    ///
    /// The individual is rescored under the current penalties first. With
    /// `record_feasibility`, its feasibility enters the window used by
    /// [`manage_penalties`](Self::manage_penalties). Returns `true` if it is
    /// a strictly better feasible solution than any seen so far.
    pub fn insert(&mut self, mut individual: Individual, record_feasibility: bool) -> bool {
        individual.rescore(&self.penalties);
        if record_feasibility {
            self.recent_feasibility.push_back(individual.is_feasible());
            while self.recent_feasibility.len() > self.config.nb_iter_penalty_management {
                self.recent_feasibility.pop_front();
            }
        }

        let is_new_best = individual.is_feasible()
            && self.best.as_ref().map_or(true, |b| {
                individual.penalized_cost() < b.penalized_cost() - IMPROVEMENT_EPSILON
            });
        if is_new_best {
            self.best = Some(individual.clone());
        }

        let (mu, lambda) = (self.config.mu, self.config.lambda);
        let (nb_elite, nb_close) = (self.config.nb_elite, self.config.nb_close);
        let id = self.next_id;
        self.next_id += 1;
        let sub = if individual.is_feasible() {
            &mut self.feasible
        } else {
            &mut self.infeasible
        };
        sub.add(id, individual);
        if sub.len() > mu + lambda {
            while sub.len() > mu {
                if sub.remove_worst(nb_elite, nb_close).is_none() {
                    break;
                }
            }
        }
        sub.update_biased_fitness(nb_elite, nb_close);
        is_new_best
    }

    /// Picks two members uniformly over both sub-populations and returns a
    /// copy of the one with the lower biased fitness.
    ///
    /// `None` when the population is empty.
    pub fn binary_tournament<R: Rng>(&self, rng: &mut R) -> Option<Individual> {
        let total = self.len();
        if total == 0 {
            return None;
        }
        let a = self.member_at(rng.random_range(0..total));
        let b = self.member_at(rng.random_range(0..total));
        let winner = if a.biased_fitness <= b.biased_fitness { a } else { b };
        Some(winner.individual.clone())
    }

    fn member_at(&self, index: usize) -> &Member {
        if index < self.feasible.len() {
            &self.feasible.members[index]
        } else {
            &self.infeasible.members[index - self.feasible.len()]
        }
    }

    /// Share of feasible individuals among the recently recorded ones.
    pub fn feasible_fraction(&self) -> Option<f64> {
        if self.recent_feasibility.is_empty() {
            return None;
        }
        let feasible = self.recent_feasibility.iter().filter(|&&f| f).count();
        Some(feasible as f64 / self.recent_feasibility.len() as f64)
    }

    /// Moves the penalties toward the target feasible share.
    ///
    /// Below the target both weights are multiplied by `penalty_increase`,
    /// above it by `penalty_decrease`, within `[Penalties::MIN,
    /// Penalties::MAX]`. Every member is then rescored and re-ranked.
    pub fn manage_penalties(&mut self) {
        let Some(fraction) = self.feasible_fraction() else {
            return;
        };
        let target = self.config.target_feasible;
        let factor = if fraction < target {
            self.config.penalty_increase
        } else if fraction > target {
            self.config.penalty_decrease
        } else {
            return;
        };

        let old = self.penalties;
        self.penalties = old.adjusted(factor);
        debug!(
            "penalties {:.3}/{:.3} -> {:.3}/{:.3} (feasible share {:.2})",
            old.capacity(),
            old.duration(),
            self.penalties.capacity(),
            self.penalties.duration(),
            fraction
        );

        let penalties = self.penalties;
        let (nb_elite, nb_close) = (self.config.nb_elite, self.config.nb_close);
        for sub in [&mut self.feasible, &mut self.infeasible] {
            for m in &mut sub.members {
                m.individual.rescore(&penalties);
            }
            sub.sort_by_cost();
            sub.update_biased_fitness(nb_elite, nb_close);
        }
    }

    /// Clears both sub-populations and seeds `mu` new individuals. The best
    /// solution found survives.
    pub fn restart<R: Rng>(&mut self, ls: &mut LocalSearch<'_>, rng: &mut R) {
        info!(
            "restart, best so far: {}",
            self.best
                .as_ref()
                .map_or("none".to_string(), |b| format!("{:.2}", b.penalized_cost()))
        );
        self.feasible = SubPopulation::default();
        self.infeasible = SubPopulation::default();
        self.generate(self.config.mu, ls, rng);
    }

    /// Best feasible individual ever inserted.
    pub fn best_found(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Current penalty weights.
    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    /// Total number of members.
    pub fn len(&self) -> usize {
        self.feasible.len() + self.infeasible.len()
    }

    /// `true` if both sub-populations are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of feasible members.
    pub fn nb_feasible(&self) -> usize {
        self.feasible.len()
    }

    /// Number of infeasible members.
    pub fn nb_infeasible(&self) -> usize {
        self.infeasible.len()
    }

    /// Logs population statistics.
    pub fn trace(&self, iteration: usize, stagnation: usize) {
        let (mu, nb_close) = (self.config.mu, self.config.nb_close);
        let fmt = |v: Option<f64>| v.map_or("-".to_string(), |x| format!("{x:.2}"));
        info!(
            "it {iteration} {stagnation} | feas {} {} {} | inf {} {} {} | div {} {} | feas share {} | pen {:.2} {:.2}",
            self.feasible.len(),
            fmt(self.feasible.members.first().map(|m| m.individual.penalized_cost())),
            fmt(self.feasible.average_cost(mu)),
            self.infeasible.len(),
            fmt(self.infeasible.members.first().map(|m| m.individual.penalized_cost())),
            fmt(self.infeasible.average_cost(mu)),
            fmt(self.feasible.average_diversity(mu, nb_close)),
            fmt(self.infeasible.average_diversity(mu, nb_close)),
            fmt(self.feasible_fraction()),
            self.penalties.capacity(),
            self.penalties.duration(),
        );
    }
}
