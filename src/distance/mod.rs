//! Distance matrices.
//!
//! Provides a dense, validated distance matrix for CVRP instances.

mod matrix;

pub use matrix::DistanceMatrix;
