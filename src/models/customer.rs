//! Customer (client or depot) type.

use serde::{Deserialize, Serialize};

/// A location in a routing instance: the depot or a client.
///
/// Location 0 is the depot. Clients have coordinates, a demand and a
/// service duration (time spent at the client, counted toward the route
/// duration when a duration limit is modeled).
///
/// # Examples
///
/// ```
/// use u_hgs::models::Customer;
///
/// let depot = Customer::depot(35.0, 35.0);
/// assert_eq!(depot.id(), 0);
/// assert_eq!(depot.demand(), 0);
///
/// let c = Customer::new(1, 41.0, 49.0, 10, 10.0);
/// assert_eq!(c.id(), 1);
/// assert_eq!(c.demand(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    service_duration: f64,
}

impl Customer {
    /// Creates a new client.
    pub fn new(id: usize, x: f64, y: f64, demand: i32, service_duration: f64) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration,
        }
    }

    /// Creates a depot at the given coordinates (id=0, demand=0).
    pub fn depot(x: f64, y: f64) -> Self {
        Self::new(0, x, y, 0, 0.0)
    }

    /// Location ID (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Demand to deliver at this client.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Service duration at this client.
    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    /// Euclidean distance to another location.
    pub fn distance_to(&self, other: &Customer) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Polar angle of this location around `origin`, in `[0, 2π)`.
    pub fn polar_angle(&self, origin: &Customer) -> f64 {
        let angle = (self.y - origin.y).atan2(self.x - origin.x);
        if angle < 0.0 {
            angle + std::f64::consts::TAU
        } else {
            angle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_new() {
        let c = Customer::new(1, 10.0, 20.0, 5, 3.0);
        assert_eq!(c.id(), 1);
        assert_eq!(c.x(), 10.0);
        assert_eq!(c.y(), 20.0);
        assert_eq!(c.demand(), 5);
        assert_eq!(c.service_duration(), 3.0);
    }

    #[test]
    fn test_customer_depot() {
        let d = Customer::depot(35.0, 35.0);
        assert_eq!(d.id(), 0);
        assert_eq!(d.demand(), 0);
        assert_eq!(d.service_duration(), 0.0);
    }

    #[test]
    fn test_customer_distance() {
        let a = Customer::new(0, 0.0, 0.0, 0, 0.0);
        let b = Customer::new(1, 3.0, 4.0, 0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-10);
    }

    #[test]
    fn test_polar_angle_range() {
        let origin = Customer::depot(0.0, 0.0);
        let east = Customer::new(1, 1.0, 0.0, 1, 0.0);
        let north = Customer::new(2, 0.0, 1.0, 1, 0.0);
        let south = Customer::new(3, 0.0, -1.0, 1, 0.0);
        assert!(east.polar_angle(&origin).abs() < 1e-10);
        assert!((north.polar_angle(&origin) - std::f64::consts::FRAC_PI_2).abs() < 1e-10);
        let s = south.polar_angle(&origin);
        assert!(s > std::f64::consts::PI && s < std::f64::consts::TAU);
    }
}
