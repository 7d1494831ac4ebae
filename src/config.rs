//! Solver configuration.
//!
//! [`HgsConfig`] is the flat parameter record consumed by the genetic
//! driver, the population and the local search. Defaults are the values
//! tuned for the classical CVRP benchmark sets.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Seeding heuristic used to build initial individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedHeuristic {
    /// Clarke–Wright savings.
    Savings,
    /// Nearest neighbor from the depot.
    NearestNeighbor,
    /// Uniform random permutation.
    Random,
}

/// Weighted mix of seeding heuristics.
///
/// Each initial individual draws its heuristic with probability proportional
/// to the entry's weight.
///
/// # Examples
///
/// ```
/// use u_hgs::config::{SeedHeuristic, SeedingStrategy};
///
/// let only_random = SeedingStrategy::new(vec![(SeedHeuristic::Random, 1)]);
/// assert_eq!(only_random.total_weight(), 1);
/// assert_eq!(SeedingStrategy::default().total_weight(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedingStrategy {
    entries: Vec<(SeedHeuristic, u32)>,
}

impl SeedingStrategy {
    /// Creates a strategy from `(heuristic, weight)` entries.
    pub fn new(entries: Vec<(SeedHeuristic, u32)>) -> Self {
        Self { entries }
    }

    /// Returns the weighted entries.
    pub fn entries(&self) -> &[(SeedHeuristic, u32)] {
        &self.entries
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|&(_, w)| w).sum()
    }

    /// Maps a ticket in `0..total_weight()` to its heuristic.
    ///
    /// Tickets past the total fall back to [`SeedHeuristic::Random`].
    pub fn pick(&self, ticket: u32) -> SeedHeuristic {
        let mut acc = 0;
        for &(heuristic, weight) in &self.entries {
            acc += weight;
            if ticket < acc {
                return heuristic;
            }
        }
        SeedHeuristic::Random
    }
}

impl Default for SeedingStrategy {
    fn default() -> Self {
        Self::new(vec![
            (SeedHeuristic::Savings, 1),
            (SeedHeuristic::NearestNeighbor, 1),
            (SeedHeuristic::Random, 8),
        ])
    }
}

/// Parameters of the hybrid genetic search.
///
/// # Examples
///
/// ```
/// use u_hgs::config::HgsConfig;
///
/// let config = HgsConfig::default()
///     .with_seed(7)
///     .with_time_limit(0.0)
///     .with_nb_iter(1_000);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.mu, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HgsConfig {
    /// Number of nearest neighbors scanned per client by the local search.
    pub nb_granular: usize,
    /// Minimum sub-population size (after survivor selection).
    pub mu: usize,
    /// Growth allowed before survivor selection triggers.
    pub lambda: usize,
    /// Best-cost individuals exempt from the diversity term.
    pub nb_elite: usize,
    /// Closest members averaged into the diversity contribution.
    pub nb_close: usize,
    /// Offspring between two penalty updates; also the feasibility window.
    pub nb_iter_penalty_management: usize,
    /// Target share of feasible offspring.
    pub target_feasible: f64,
    /// Penalty multiplier when too many offspring are feasible.
    pub penalty_decrease: f64,
    /// Penalty multiplier when too few offspring are feasible.
    pub penalty_increase: f64,
    /// Random seed.
    pub seed: u64,
    /// Index of the last generation; generations run from 0 to `nb_iter`.
    pub nb_iter: usize,
    /// Generations between two traces.
    pub nb_iter_traces: usize,
    /// Wall-clock budget in seconds (0 = unbounded).
    pub time_limit: f64,
    /// Enables the SWAP* neighborhood.
    pub use_swap_star: bool,
    /// Generations without improvement before a restart.
    pub max_iter_non_prod: usize,
    /// Seeding heuristic mix for the initial population.
    pub seeding: SeedingStrategy,
}

impl Default for HgsConfig {
    fn default() -> Self {
        Self {
            nb_granular: 50,
            mu: 25,
            lambda: 80,
            nb_elite: 5,
            nb_close: 10,
            nb_iter_penalty_management: 50,
            target_feasible: 0.4,
            penalty_decrease: 0.5,
            penalty_increase: 1.5,
            seed: 0,
            nb_iter: 200_000,
            nb_iter_traces: 500,
            time_limit: 120.0,
            use_swap_star: true,
            max_iter_non_prod: 3000,
            seeding: SeedingStrategy::default(),
        }
    }
}

impl HgsConfig {
    /// Sets the granular neighborhood size.
    pub fn with_nb_granular(mut self, n: usize) -> Self {
        self.nb_granular = n;
        self
    }

    /// Sets the minimum sub-population size.
    pub fn with_mu(mut self, mu: usize) -> Self {
        self.mu = mu;
        self
    }

    /// Sets the generation size.
    pub fn with_lambda(mut self, lambda: usize) -> Self {
        self.lambda = lambda;
        self
    }

    /// Sets the number of elite individuals.
    pub fn with_nb_elite(mut self, n: usize) -> Self {
        self.nb_elite = n;
        self
    }

    /// Sets the number of close individuals used for diversity.
    pub fn with_nb_close(mut self, n: usize) -> Self {
        self.nb_close = n;
        self
    }

    /// Sets the penalty management interval.
    pub fn with_nb_iter_penalty_management(mut self, n: usize) -> Self {
        self.nb_iter_penalty_management = n;
        self
    }

    /// Sets the target feasible share.
    pub fn with_target_feasible(mut self, target: f64) -> Self {
        self.target_feasible = target;
        self
    }

    /// Sets the penalty decrease and increase multipliers.
    pub fn with_penalty_factors(mut self, decrease: f64, increase: f64) -> Self {
        self.penalty_decrease = decrease;
        self.penalty_increase = increase;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the generation cap.
    pub fn with_nb_iter(mut self, n: usize) -> Self {
        self.nb_iter = n;
        self
    }

    /// Sets the trace interval.
    pub fn with_nb_iter_traces(mut self, n: usize) -> Self {
        self.nb_iter_traces = n;
        self
    }

    /// Sets the time limit in seconds (0 = unbounded).
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = seconds;
        self
    }

    /// Enables or disables SWAP*.
    pub fn with_swap_star(mut self, enabled: bool) -> Self {
        self.use_swap_star = enabled;
        self
    }

    /// Sets the stagnation threshold that triggers a restart.
    pub fn with_max_iter_non_prod(mut self, n: usize) -> Self {
        self.max_iter_non_prod = n;
        self
    }

    /// Sets the seeding strategy.
    pub fn with_seeding(mut self, seeding: SeedingStrategy) -> Self {
        self.seeding = seeding;
        self
    }

    /// Checks every parameter range.
    pub fn validate(&self) -> Result<(), Error> {
        fn invalid(name: &'static str, reason: &str) -> Result<(), Error> {
            Err(Error::InvalidParameter {
                name,
                reason: reason.to_string(),
            })
        }

        if self.nb_granular == 0 {
            return invalid("nb_granular", "must be at least 1");
        }
        if self.mu == 0 {
            return invalid("mu", "must be at least 1");
        }
        if self.lambda == 0 {
            return invalid("lambda", "must be at least 1");
        }
        if self.nb_elite > self.mu {
            return invalid("nb_elite", "must not exceed mu");
        }
        if self.nb_close == 0 {
            return invalid("nb_close", "must be at least 1");
        }
        if self.nb_iter_penalty_management == 0 {
            return invalid("nb_iter_penalty_management", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.target_feasible) {
            return invalid("target_feasible", "must be in [0, 1]");
        }
        if !(self.penalty_decrease > 0.0 && self.penalty_decrease < 1.0) {
            return invalid("penalty_decrease", "must be in (0, 1)");
        }
        if !(self.penalty_increase > 1.0 && self.penalty_increase.is_finite()) {
            return invalid("penalty_increase", "must be finite and greater than 1");
        }
        if self.nb_iter_traces == 0 {
            return invalid("nb_iter_traces", "must be at least 1");
        }
        if !(self.time_limit >= 0.0 && self.time_limit.is_finite()) {
            return invalid("time_limit", "must be finite and non-negative");
        }
        if self.max_iter_non_prod == 0 {
            return invalid("max_iter_non_prod", "must be at least 1");
        }
        if self.seeding.total_weight() == 0 {
            return invalid("seeding", "needs at least one positive weight");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = HgsConfig::default();
        assert_eq!(c.nb_granular, 50);
        assert_eq!(c.mu, 25);
        assert_eq!(c.lambda, 80);
        assert_eq!(c.nb_elite, 5);
        assert_eq!(c.nb_close, 10);
        assert_eq!(c.nb_iter_penalty_management, 50);
        assert!((c.target_feasible - 0.4).abs() < 1e-12);
        assert!((c.penalty_decrease - 0.5).abs() < 1e-12);
        assert!((c.penalty_increase - 1.5).abs() < 1e-12);
        assert_eq!(c.nb_iter, 200_000);
        assert_eq!(c.nb_iter_traces, 500);
        assert!((c.time_limit - 120.0).abs() < 1e-12);
        assert!(c.use_swap_star);
        assert_eq!(c.max_iter_non_prod, 3000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let c = HgsConfig::default()
            .with_mu(10)
            .with_lambda(20)
            .with_nb_elite(2)
            .with_swap_star(false)
            .with_penalty_factors(0.8, 1.2);
        assert_eq!(c.mu, 10);
        assert_eq!(c.lambda, 20);
        assert_eq!(c.nb_elite, 2);
        assert!(!c.use_swap_star);
        assert!((c.penalty_increase - 1.2).abs() < 1e-12);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let c = HgsConfig::default().with_target_feasible(1.5);
        assert!(matches!(
            c.validate(),
            Err(Error::InvalidParameter {
                name: "target_feasible",
                ..
            })
        ));
        assert!(HgsConfig::default().with_mu(0).validate().is_err());
        assert!(HgsConfig::default()
            .with_penalty_factors(0.0, 1.5)
            .validate()
            .is_err());
        assert!(HgsConfig::default()
            .with_penalty_factors(0.5, 1.0)
            .validate()
            .is_err());
        assert!(HgsConfig::default().with_time_limit(-1.0).validate().is_err());
        assert!(HgsConfig::default().with_nb_elite(30).validate().is_err());
        let empty = SeedingStrategy::new(vec![(SeedHeuristic::Savings, 0)]);
        assert!(HgsConfig::default().with_seeding(empty).validate().is_err());
    }

    #[test]
    fn test_seeding_pick() {
        let s = SeedingStrategy::default();
        assert_eq!(s.pick(0), SeedHeuristic::Savings);
        assert_eq!(s.pick(1), SeedHeuristic::NearestNeighbor);
        for t in 2..10 {
            assert_eq!(s.pick(t), SeedHeuristic::Random);
        }
    }

    #[test]
    fn test_serde_partial_record() {
        let c: HgsConfig =
            serde_json::from_str(r#"{"mu": 12, "use_swap_star": false}"#).expect("valid");
        assert_eq!(c.mu, 12);
        assert!(!c.use_swap_star);
        assert_eq!(c.lambda, 80);
    }
}
