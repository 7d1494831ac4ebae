//! Error type for invalid configuration and instance data.

use std::fmt;

/// Errors raised when a configuration record or an instance is rejected.
///
/// The solver never repairs bad input on its own: asymmetric or negative
/// distances, non-positive penalties and out-of-range parameters are
/// reported to the caller that built them.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A configuration parameter is out of its valid range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A penalty weight is zero, negative or not finite.
    InvalidPenalty {
        /// Which penalty (`"capacity"` or `"duration"`).
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The distance matrix does not match the number of locations.
    DimensionMismatch {
        /// Number of locations (depot + clients).
        expected: usize,
        /// Matrix size.
        actual: usize,
    },
    /// `d(from, to) != d(to, from)`.
    AsymmetricDistance {
        /// Row index.
        from: usize,
        /// Column index.
        to: usize,
    },
    /// A negative or non-finite distance entry.
    NegativeDistance {
        /// Row index.
        from: usize,
        /// Column index.
        to: usize,
        /// Offending value.
        value: f64,
    },
    /// Vehicle capacity must be strictly positive.
    InvalidCapacity(i32),
    /// A client has a negative demand.
    NegativeDemand {
        /// Client index.
        client: usize,
        /// Offending demand.
        demand: i32,
    },
    /// Routes handed to an individual do not visit every client exactly once.
    InvalidRoutes {
        /// Offending client index.
        client: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter `{name}`: {reason}")
            }
            Error::InvalidPenalty { name, value } => {
                write!(f, "{name} penalty must be positive and finite, got {value}")
            }
            Error::DimensionMismatch { expected, actual } => write!(
                f,
                "distance matrix has size {actual}, expected {expected} locations"
            ),
            Error::AsymmetricDistance { from, to } => {
                write!(f, "distance matrix is not symmetric at ({from}, {to})")
            }
            Error::NegativeDistance { from, to, value } => {
                write!(f, "invalid distance {value} at ({from}, {to})")
            }
            Error::InvalidCapacity(q) => write!(f, "vehicle capacity must be positive, got {q}"),
            Error::NegativeDemand { client, demand } => {
                write!(f, "client {client} has negative demand {demand}")
            }
            Error::InvalidRoutes { client, reason } => {
                write!(f, "invalid routes: client {client} {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = Error::InvalidPenalty {
            name: "capacity",
            value: 0.0,
        };
        assert_eq!(
            e.to_string(),
            "capacity penalty must be positive and finite, got 0"
        );
        let e = Error::AsymmetricDistance { from: 1, to: 2 };
        assert!(e.to_string().contains("(1, 2)"));
        let e = Error::InvalidRoutes {
            client: 3,
            reason: "is visited twice",
        };
        assert_eq!(e.to_string(), "invalid routes: client 3 is visited twice");
    }
}
