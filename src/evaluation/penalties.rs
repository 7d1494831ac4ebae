//! Penalty weights for capacity and duration excess.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::Instance;

/// Penalty weights applied to capacity and duration excess.
///
/// Both weights are strictly positive and finite. The population adapts
/// them with [`adjusted`](Self::adjusted), which keeps them inside
/// `[MIN, MAX]`; [`scaled`](Self::scaled) is used for temporary repair
/// passes and is not clamped.
///
/// # Examples
///
/// ```
/// use u_hgs::evaluation::Penalties;
///
/// let p = Penalties::new(10.0, 1.0).expect("valid");
/// assert_eq!(p.penalized(100.0, 2.0, 0.0), 120.0);
/// assert!(Penalties::new(0.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Penalties {
    capacity: f64,
    duration: f64,
}

impl Penalties {
    /// Lower bound kept by penalty adaptation.
    pub const MIN: f64 = 0.1;
    /// Upper bound kept by penalty adaptation.
    pub const MAX: f64 = 100_000.0;

    /// Creates penalty weights.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPenalty`] if a weight is zero, negative or not finite.
    pub fn new(capacity: f64, duration: f64) -> Result<Self, Error> {
        if !(capacity > 0.0 && capacity.is_finite()) {
            return Err(Error::InvalidPenalty {
                name: "capacity",
                value: capacity,
            });
        }
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(Error::InvalidPenalty {
                name: "duration",
                value: duration,
            });
        }
        Ok(Self { capacity, duration })
    }

    /// Starting weights for an instance.
    ///
    /// Capacity: `maxDistance / maxDemand` clamped to `[0.1, 1000]`.
    /// Duration: 1.
    pub fn initial(instance: &Instance) -> Self {
        let ratio = if instance.max_demand() > 0 {
            instance.distances().max_distance() / instance.max_demand() as f64
        } else {
            1000.0
        };
        Self {
            capacity: ratio.clamp(Self::MIN, 1000.0),
            duration: 1.0,
        }
    }

    /// Capacity penalty weight.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Duration penalty weight.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Both weights multiplied by `factor`, without clamping.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            capacity: self.capacity * factor,
            duration: self.duration * factor,
        }
    }

    /// Both weights multiplied by `factor` and clamped to `[MIN, MAX]`.
    pub fn adjusted(&self, factor: f64) -> Self {
        Self {
            capacity: (self.capacity * factor).clamp(Self::MIN, Self::MAX),
            duration: (self.duration * factor).clamp(Self::MIN, Self::MAX),
        }
    }

    /// `distance + capacity·capacityExcess + duration·durationExcess`.
    #[inline]
    pub fn penalized(&self, distance: f64, capacity_excess: f64, duration_excess: f64) -> f64 {
        distance + self.capacity * capacity_excess + self.duration * duration_excess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;

    #[test]
    fn test_new_rejects_invalid() {
        assert!(Penalties::new(1.0, 1.0).is_ok());
        assert_eq!(
            Penalties::new(-1.0, 1.0),
            Err(Error::InvalidPenalty {
                name: "capacity",
                value: -1.0
            })
        );
        assert!(Penalties::new(1.0, 0.0).is_err());
        assert!(Penalties::new(f64::INFINITY, 1.0).is_err());
        assert!(Penalties::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_initial_ratio() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 30.0, 40.0, 5, 0.0),
            Customer::new(2, 0.0, 10.0, 2, 0.0),
        ];
        let inst = Instance::euclidean(customers, 10).expect("valid");
        // max distance 50 (depot to 1), max demand 5
        let p = Penalties::initial(&inst);
        assert!((p.capacity() - 10.0).abs() < 1e-10);
        assert_eq!(p.duration(), 1.0);
    }

    #[test]
    fn test_initial_clamped() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 0.1, 0.0, 100, 0.0),
        ];
        let inst = Instance::euclidean(customers, 100).expect("valid");
        assert_eq!(Penalties::initial(&inst).capacity(), Penalties::MIN);
    }

    #[test]
    fn test_adjusted_bounds() {
        let p = Penalties::new(80_000.0, 0.15).expect("valid");
        let up = p.adjusted(1.5);
        assert_eq!(up.capacity(), Penalties::MAX);
        let down = p.adjusted(0.5);
        assert_eq!(down.duration(), Penalties::MIN);
        assert!((down.capacity() - 40_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_unclamped() {
        let p = Penalties::new(50_000.0, 1.0).expect("valid");
        assert_eq!(p.scaled(10.0).capacity(), 500_000.0);
    }
}
