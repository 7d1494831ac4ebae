//! Dense distance matrix.

use crate::error::Error;
use crate::models::Customer;

/// A dense n×n distance matrix stored in row-major order.
///
/// Built either from Euclidean coordinates or from an explicit grid supplied
/// by an instance loader. [`validate`](Self::validate) rejects grids the
/// solver cannot work with.
///
/// # Examples
///
/// ```
/// use u_hgs::models::Customer;
/// use u_hgs::distance::DistanceMatrix;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10, 5.0),
///     Customer::new(2, 6.0, 8.0, 20, 5.0),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// assert!(dm.validate(1e-9).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a Euclidean distance matrix from location coordinates.
    pub fn from_customers(customers: &[Customer]) -> Self {
        let n = customers.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = customers[i].distance_to(&customers[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Creates a distance matrix from an explicit row-major n×n grid.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `data.len() != size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Result<Self, Error> {
        if data.len() != size * size {
            return Err(Error::DimensionMismatch {
                expected: size * size,
                actual: data.len(),
            });
        }
        Ok(Self { data, size })
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Largest entry of the matrix (0 for an empty matrix).
    pub fn max_distance(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    fn first_asymmetry(&self, tol: f64) -> Option<(usize, usize)> {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Checks that every entry is finite and non-negative and that the
    /// matrix is symmetric within `tol`.
    ///
    /// # Errors
    ///
    /// [`Error::NegativeDistance`] for the first bad entry in row-major
    /// order, otherwise [`Error::AsymmetricDistance`] for the first
    /// asymmetric pair.
    pub fn validate(&self, tol: f64) -> Result<(), Error> {
        for from in 0..self.size {
            for to in 0..self.size {
                let value = self.get(from, to);
                if !value.is_finite() || value < 0.0 {
                    return Err(Error::NegativeDistance { from, to, value });
                }
            }
        }
        match self.first_asymmetry(tol) {
            Some((from, to)) => Err(Error::AsymmetricDistance { from, to }),
            None => Ok(()),
        }
    }

    /// Returns the nearest location to `from` among the given candidates.
    ///
    /// Ties go to the candidate listed first. Returns `None` if `candidates`
    /// is empty.
    pub fn nearest_neighbor<I>(&self, from: usize, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        candidates
            .into_iter()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_customers() -> Vec<Customer> {
        vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 3.0, 4.0, 10, 5.0),
            Customer::new(2, 0.0, 8.0, 20, 5.0),
        ]
    }

    #[test]
    fn test_from_customers() {
        let dm = DistanceMatrix::from_customers(&sample_customers());
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
        assert!((dm.get(0, 2) - 8.0).abs() < 1e-10);
        assert!((dm.get(0, 0)).abs() < 1e-10);
        assert!((dm.max_distance() - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert_eq!(
            DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0]).unwrap_err(),
            Error::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_validate_asymmetric() {
        let dm = DistanceMatrix::from_data(2, vec![0.0, 10.0, 15.0, 0.0]).expect("valid");
        assert_eq!(
            dm.validate(1e-9),
            Err(Error::AsymmetricDistance { from: 0, to: 1 })
        );
    }

    #[test]
    fn test_validate_negative_and_nan() {
        let dm = DistanceMatrix::from_data(2, vec![0.0, -1.0, -1.0, 0.0]).expect("valid");
        assert!(matches!(
            dm.validate(1e-9),
            Err(Error::NegativeDistance { from: 0, to: 1, .. })
        ));
        let dm = DistanceMatrix::from_data(2, vec![0.0, f64::NAN, f64::NAN, 0.0]).expect("valid");
        assert!(dm.validate(1e-9).is_err());
    }

    #[test]
    fn test_nearest_neighbor() {
        let dm = DistanceMatrix::from_customers(&sample_customers());
        assert_eq!(dm.nearest_neighbor(0, [1, 2]), Some(1));
        assert_eq!(dm.nearest_neighbor(0, [2, 1]), Some(1));
        assert_eq!(dm.nearest_neighbor(0, [2]), Some(2));
        assert_eq!(dm.nearest_neighbor(0, std::iter::empty()), None);
    }
}
