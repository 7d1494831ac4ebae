//! Hybrid genetic search driver.
//!
//! # Algorithm
//!
//! 1. Seed `mu` individuals (see [`Population::generate`]).
//! 2. Each generation: two binary tournaments, ordered crossover, Split into
//!    the first parent's route count, local search, insertion. An infeasible
//!    offspring is repaired with probability 1/2 by a second local search at
//!    ten times the penalties and inserted again if that made it feasible.
//! 3. Every `nb_iter_penalty_management` generations the penalties are
//!    adapted; after `max_iter_non_prod` generations without a new best the
//!    population restarts, unless less than five seconds remain.
//! 4. When the budget is spent, the best feasible solution gets one more
//!    local search at a hundred times the penalties.
//!
//! # Reference
//!
//! Vidal, T. (2022). "Hybrid genetic search for the CVRP: Open-source
//! implementation and SWAP* neighborhood", *Computers & Operations Research* 140.

use std::time::{Duration, Instant};

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HgsConfig;
use crate::error::Error;
use crate::evaluation::Penalties;
use crate::local_search::LocalSearch;
use crate::models::Instance;

use super::population::REPAIR_PENALTY_FACTOR;
use super::{order_crossover, Individual, Population};

/// Penalty multiplier of the final polishing pass.
const POLISH_PENALTY_FACTOR: f64 = 100.0;

/// Time that must remain for a restart or the polishing pass.
const TIME_MARGIN_SECS: f64 = 5.0;

/// Stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Seeding the population.
    Initializing,
    /// Generational loop.
    Evolving,
    /// Final intensification of the best solution.
    Polishing,
    /// Run finished.
    Done,
}

/// Outcome of [`Genetic::run`].
#[derive(Debug, Clone)]
pub struct HgsResult {
    /// Best feasible individual, if any was found.
    pub best: Option<Individual>,
    /// Generations performed, at most `nb_iter + 1`.
    pub iterations: usize,
    /// Population restarts performed.
    pub restarts: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Hybrid genetic search over one instance.
///
/// # Examples
///
/// ```
/// use u_hgs::models::{Customer, Instance};
/// use u_hgs::config::HgsConfig;
/// use u_hgs::ga::Genetic;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 1.0, 0.0, 1, 0.0),
///     Customer::new(2, 1.0, 1.0, 1, 0.0),
///     Customer::new(3, 0.0, 1.0, 1, 0.0),
/// ];
/// let instance = Instance::euclidean(customers, 10).expect("valid");
/// let config = HgsConfig::default()
///     .with_mu(4)
///     .with_nb_elite(2)
///     .with_nb_iter(20)
///     .with_time_limit(0.0);
///
/// let mut genetic = Genetic::new(&instance, config).expect("valid config");
/// let result = genetic.run();
/// let best = result.best.expect("feasible");
/// assert!((best.distance() - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Genetic<'a> {
    instance: &'a Instance,
    config: HgsConfig,
    phase: Phase,
}

impl<'a> Genetic<'a> {
    /// Creates a driver after validating `config`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for an out-of-range parameter.
    pub fn new(instance: &'a Instance, config: HgsConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            instance,
            config,
            phase: Phase::Initializing,
        })
    }

    /// Current stage.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The configuration in use.
    pub fn config(&self) -> &HgsConfig {
        &self.config
    }

    /// Runs the search until the generation cap or the time limit.
    pub fn run(&mut self) -> HgsResult {
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut ls = LocalSearch::new(self.instance, &self.config);
        let mut population = Population::new(self.instance, self.config.clone());

        self.phase = Phase::Initializing;
        info!(
            "hgs start: {} clients, capacity {}, fleet {}",
            self.instance.nb_clients(),
            self.instance.capacity(),
            self.instance.fleet_size()
        );
        population.generate(self.config.mu, &mut ls, &mut rng);

        self.phase = Phase::Evolving;
        let (iterations, restarts) = if self.instance.nb_clients() >= 2 {
            self.evolve(&mut population, &mut ls, &mut rng, start)
        } else {
            (0, 0)
        };

        self.phase = Phase::Polishing;
        if self.has_margin(start) {
            self.polish(&mut population, &mut ls, &mut rng);
        }

        self.phase = Phase::Done;
        let best = population.best_found().cloned();
        let elapsed = start.elapsed();
        match &best {
            Some(b) => info!(
                "hgs done: cost {:.2}, {} routes, {} iterations, {} restarts, {:.2}s",
                b.penalized_cost(),
                b.nb_routes(),
                iterations,
                restarts,
                elapsed.as_secs_f64()
            ),
            None => info!(
                "hgs done: no feasible solution after {} iterations, {:.2}s",
                iterations,
                elapsed.as_secs_f64()
            ),
        }
        HgsResult {
            best,
            iterations,
            restarts,
            elapsed,
        }
    }

    fn evolve<R: Rng>(
        &self,
        population: &mut Population<'_>,
        ls: &mut LocalSearch<'_>,
        rng: &mut R,
        start: Instant,
    ) -> (usize, usize) {
        let config = &self.config;
        let mut child = Vec::with_capacity(self.instance.nb_clients());
        let mut iteration = 0;
        let mut non_productive = 1;
        let mut restarts = 0;

        while iteration <= config.nb_iter && self.within_limit(start) {
            let (Some(parent1), Some(parent2)) = (
                population.binary_tournament(rng),
                population.binary_tournament(rng),
            ) else {
                break;
            };
            order_crossover(parent1.chromosome(), parent2.chromosome(), &mut child, rng);

            let penalties = *population.penalties();
            let offspring = Individual::from_tour_with_routes(
                &child,
                self.instance,
                &penalties,
                parent1.nb_routes(),
            );
            let offspring = ls.run(&offspring, &penalties, rng);
            let mut improved = population.insert(offspring.clone(), true);

            if !offspring.is_feasible() && rng.random_range(0..2) == 0 {
                improved |= self.repair(&offspring, &penalties, population, ls, rng);
            }

            if improved {
                non_productive = 1;
            } else {
                non_productive += 1;
            }

            if iteration % config.nb_iter_penalty_management == 0 {
                population.manage_penalties();
            }
            if iteration % config.nb_iter_traces == 0 {
                population.trace(iteration, non_productive);
            }
            if non_productive >= config.max_iter_non_prod && self.has_margin(start) {
                population.restart(ls, rng);
                non_productive = 1;
                restarts += 1;
            }
            iteration += 1;
        }
        (iteration, restarts)
    }

    /// Reruns local search on an infeasible offspring at ten times
    /// `penalties` and inserts the result if it became feasible.
    ///
    /// Returns `true` if the insertion produced a new best solution.
    fn repair<R: Rng>(
        &self,
        offspring: &Individual,
        penalties: &Penalties,
        population: &mut Population<'_>,
        ls: &mut LocalSearch<'_>,
        rng: &mut R,
    ) -> bool {
        let repaired = ls.run(offspring, &penalties.scaled(REPAIR_PENALTY_FACTOR), rng);
        repaired.is_feasible() && population.insert(repaired, false)
    }

    /// One local search on the best feasible solution at a hundred times the
    /// current penalties. Returns `false` when there is nothing to polish.
    fn polish<R: Rng>(
        &self,
        population: &mut Population<'_>,
        ls: &mut LocalSearch<'_>,
        rng: &mut R,
    ) -> bool {
        let Some(best) = population.best_found().cloned() else {
            return false;
        };
        let penalties = population.penalties().scaled(POLISH_PENALTY_FACTOR);
        let polished = ls.run(&best, &penalties, rng);
        if population.insert(polished, false) {
            info!("polishing improved the best solution");
        }
        true
    }

    fn within_limit(&self, start: Instant) -> bool {
        self.config.time_limit == 0.0 || start.elapsed().as_secs_f64() < self.config.time_limit
    }

    fn has_margin(&self, start: Instant) -> bool {
        self.config.time_limit == 0.0
            || start.elapsed().as_secs_f64() < self.config.time_limit - TIME_MARGIN_SECS
    }
}
