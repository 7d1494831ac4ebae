//! Ordered crossover (OX) on giant tours.
//!
//! # Algorithm
//!
//! 1. Draw `start` and `end` uniformly in `0..n`, redrawing `end` while it
//!    equals `start`.
//! 2. Copy parent 1's circular segment `start..=end` to the same positions.
//! 3. Fill the remaining positions, from `end + 1` onwards (circularly), with
//!    parent 2's clients read from position `end + 1` onwards, skipping
//!    clients already placed.
//!
//! # Complexity
//!
//! O(n)
//!
//! # Reference
//!
//! Oliver, I.M., Smith, D.J. & Holland, J.R.C. (1987). "A study of
//! permutation crossover operators on the traveling salesman problem".

use rand::Rng;

/// Ordered crossover of two giant tours into `child`.
///
/// `child` is overwritten and resized to the parents' length. Returns the
/// `(start, end)` cut points. With fewer than two clients there are no two
/// distinct cut points: parent 1 is copied and `(0, 0)` is returned.
///
/// # Panics
///
/// Panics if the parents have different lengths.
///
/// # Examples
///
/// ```
/// use u_hgs::ga::order_crossover;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let p1 = [1, 2, 3, 4, 5, 6];
/// let p2 = [6, 5, 4, 3, 2, 1];
/// let mut child = Vec::new();
/// order_crossover(&p1, &p2, &mut child, &mut rng);
///
/// let mut sorted = child.clone();
/// sorted.sort();
/// assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
/// ```
pub fn order_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    child: &mut Vec<usize>,
    rng: &mut R,
) -> (usize, usize) {
    assert_eq!(parent1.len(), parent2.len(), "parents differ in length");
    let n = parent1.len();
    child.clear();
    child.extend_from_slice(parent1);
    if n < 2 {
        return (0, 0);
    }

    let start = rng.random_range(0..n);
    let mut end = rng.random_range(0..n);
    while end == start {
        end = rng.random_range(0..n);
    }

    let max_id = parent1.iter().copied().max().unwrap_or(0);
    let mut placed = vec![false; max_id + 1];

    let segment_len = (end + n - start) % n + 1;
    for k in 0..segment_len {
        let pos = (start + k) % n;
        placed[parent1[pos]] = true;
    }

    let mut j = (end + 1) % n;
    for i in 1..=n {
        let c = parent2[(end + i) % n];
        if !placed[c] {
            placed[c] = true;
            child[j] = c;
            j = (j + 1) % n;
        }
    }

    (start, end)
}
