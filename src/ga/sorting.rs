//! Fast non-dominated sorting and crowding distance.
//!
//! The two ranking primitives of NSGA-II. Sorting partitions a scored pool
//! into fronts by non-domination rank in O(n²) dominance comparisons —
//! fine at the population sizes this crate targets (tens to low hundreds).
//! Crowding distance measures how isolated a member is within its front,
//! rewarding boundary and sparse regions of objective space.
//!
//! # Reference
//! Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic
//! Algorithm: NSGA-II", IEEE Trans. Evol. Comput. 6(2)

use crate::decode::ObjectiveVector;

/// Three-way dominance between two objective vectors.
#[derive(Debug, PartialEq, Eq)]
enum Dominance {
    Left,
    Right,
    Neither,
}

fn dominance_cmp(a: &ObjectiveVector, b: &ObjectiveVector) -> Dominance {
    if a.dominates(b) {
        Dominance::Left
    } else if b.dominates(a) {
        Dominance::Right
    } else {
        Dominance::Neither
    }
}

/// Partitions a scored pool into non-domination fronts.
///
/// `fronts[0]` holds the indices of members dominated by nobody; each
/// later front is dominated only by earlier ones. Every index appears in
/// exactly one front. Empty input yields no fronts.
pub fn fast_non_dominated_sort(objectives: &[ObjectiveVector]) -> Vec<Vec<usize>> {
    let n = objectives.len();
    if n == 0 {
        return Vec::new();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut front_0 = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance_cmp(&objectives[i], &objectives[j]) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
        if domination_count[i] == 0 {
            front_0.push(i);
        }
    }

    let mut fronts = vec![front_0];
    loop {
        let current = fronts.last().expect("fronts starts non-empty");
        let mut next = Vec::new();
        for &i in current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        fronts.push(next);
    }
    fronts
}

/// Crowding distance of one front's members.
///
/// Returns a dense vector indexed by pool position; entries outside
/// `front` stay zero. Fronts of at most two members are all infinite.
/// For larger fronts, each objective dimension contributes the gap
/// between a member's neighbors normalized by the dimension's range
/// within the front; boundary members get infinity, and zero-range
/// dimensions are skipped.
pub fn crowding_distance(objectives: &[ObjectiveVector], front: &[usize]) -> Vec<f64> {
    let mut distances = vec![0.0f64; objectives.len()];
    if front.len() <= 2 {
        for &i in front {
            distances[i] = f64::INFINITY;
        }
        return distances;
    }

    for dim in 0..ObjectiveVector::DIMENSIONS {
        let mut sorted = front.to_vec();
        sorted.sort_by(|&a, &b| {
            objectives[a]
                .get(dim)
                .partial_cmp(&objectives[b].get(dim))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        distances[sorted[0]] = f64::INFINITY;
        distances[sorted[front.len() - 1]] = f64::INFINITY;

        let min = objectives[sorted[0]].get(dim);
        let max = objectives[sorted[front.len() - 1]].get(dim);
        let range = max - min;
        if range == 0.0 {
            continue;
        }

        for w in sorted.windows(3) {
            let gap = objectives[w[2]].get(dim) - objectives[w[0]].get(dim);
            distances[w[1]] += gap / range;
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(makespan: f64, energy: f64) -> ObjectiveVector {
        ObjectiveVector { makespan, energy }
    }

    #[test]
    fn test_sort_empty_and_single() {
        assert!(fast_non_dominated_sort(&[]).is_empty());
        let fronts = fast_non_dominated_sort(&[obj(1.0, 2.0)]);
        assert_eq!(fronts, vec![vec![0]]);
    }

    #[test]
    fn test_sort_layered_fronts() {
        let objectives = vec![
            obj(1.0, 5.0), // front 0
            obj(3.0, 3.0), // front 0
            obj(5.0, 1.0), // front 0
            obj(4.0, 4.0), // dominated by (3,3) → front 1
            obj(6.0, 6.0), // dominated by (4,4) too → front 2
        ];
        let fronts = fast_non_dominated_sort(&objectives);
        assert_eq!(fronts.len(), 3);
        assert_eq!(fronts[0], vec![0, 1, 2]);
        assert_eq!(fronts[1], vec![3]);
        assert_eq!(fronts[2], vec![4]);
    }

    #[test]
    fn test_front_zero_is_sound() {
        // No member of front 0 may be dominated by anyone in the pool.
        let objectives = vec![
            obj(2.0, 8.0),
            obj(4.0, 4.0),
            obj(8.0, 2.0),
            obj(5.0, 5.0),
            obj(3.0, 9.0),
        ];
        let fronts = fast_non_dominated_sort(&objectives);
        for &i in &fronts[0] {
            for (j, other) in objectives.iter().enumerate() {
                if i != j {
                    assert!(!other.dominates(&objectives[i]));
                }
            }
        }
        // Fronts partition the pool.
        let total: usize = fronts.iter().map(|f| f.len()).sum();
        assert_eq!(total, objectives.len());
    }

    #[test]
    fn test_identical_vectors_share_a_front() {
        let objectives = vec![obj(2.0, 2.0); 3];
        let fronts = fast_non_dominated_sort(&objectives);
        assert_eq!(fronts.len(), 1);
        assert_eq!(fronts[0].len(), 3);
    }

    #[test]
    fn test_crowding_small_fronts_all_infinite() {
        let objectives = vec![obj(1.0, 5.0), obj(5.0, 1.0), obj(9.0, 9.0)];
        let d = crowding_distance(&objectives, &[0, 1]);
        assert!(d[0].is_infinite());
        assert!(d[1].is_infinite());
        assert_eq!(d[2], 0.0); // outside the front
    }

    #[test]
    fn test_crowding_boundaries_infinite_interior_finite() {
        let objectives = vec![
            obj(1.0, 5.0),
            obj(3.0, 3.0),
            obj(5.0, 1.0),
        ];
        let d = crowding_distance(&objectives, &[0, 1, 2]);
        assert!(d[0].is_infinite());
        assert!(d[2].is_infinite());
        assert!(d[1].is_finite());
        assert!(d[1] > 0.0);
    }

    #[test]
    fn test_crowding_evenly_spaced_interior_equal() {
        let objectives = vec![
            obj(0.0, 4.0),
            obj(1.0, 3.0),
            obj(2.0, 2.0),
            obj(3.0, 1.0),
            obj(4.0, 0.0),
        ];
        let d = crowding_distance(&objectives, &[0, 1, 2, 3, 4]);
        assert!(d[0].is_infinite());
        assert!(d[4].is_infinite());
        assert!((d[1] - d[2]).abs() < 1e-12);
        assert!((d[2] - d[3]).abs() < 1e-12);
    }

    #[test]
    fn test_crowding_zero_range_dimension_skipped() {
        let objectives = vec![
            obj(1.0, 5.0),
            obj(2.0, 5.0),
            obj(3.0, 5.0),
        ];
        let d = crowding_distance(&objectives, &[0, 1, 2]);
        assert!(d[0].is_infinite());
        assert!(d[2].is_infinite());
        assert!(d[1].is_finite());
    }
}
