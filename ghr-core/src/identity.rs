//! Runner identity scheme
//!
//! Every runner carries a small positive number. New runners take the lowest
//! free numbers so the namespace stays compact after churn; scale-down takes
//! the highest numbers so long-lived low-numbered runners survive.

use std::collections::HashSet;

/// Returns the next `count` free numbers, scanning upward from 1
///
/// The result is strictly increasing and disjoint from `occupied`. Gaps left
/// by removed runners are filled before the range grows.
pub fn next_numbers(occupied: &[u32], count: usize) -> Vec<u32> {
    let used: HashSet<u32> = occupied.iter().copied().collect();

    let mut result = Vec::with_capacity(count);
    let mut candidate = 1u32;
    while result.len() < count {
        if !used.contains(&candidate) {
            result.push(candidate);
        }
        candidate += 1;
    }
    result
}

/// Returns the `count` highest numbers in `occupied`, descending
///
/// Asking for more than are present returns all of them.
pub fn highest_numbers(occupied: &[u32], count: usize) -> Vec<u32> {
    let mut sorted = occupied.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.truncate(count);
    sorted
}

/// Container name for a runner number
pub fn runner_name(prefix: &str, number: u32) -> String {
    format!("{}-runner-{}", prefix, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_numbers() {
        let cases: Vec<(&str, Vec<u32>, usize, Vec<u32>)> = vec![
            ("empty, add 3", vec![], 3, vec![1, 2, 3]),
            ("1,2,5 exist, add 2", vec![1, 2, 5], 2, vec![3, 4]),
            ("1,2,3 exist, add 1", vec![1, 2, 3], 1, vec![4]),
            ("2,4 exist, add 3", vec![2, 4], 3, vec![1, 3, 5]),
            ("none, add 0", vec![], 0, vec![]),
        ];

        for (name, existing, count, want) in cases {
            assert_eq!(next_numbers(&existing, count), want, "{}", name);
        }
    }

    #[test]
    fn test_next_numbers_are_free_and_increasing() {
        let occupied = vec![9, 1, 4, 4, 2, 12];
        let got = next_numbers(&occupied, 6);

        assert_eq!(got.len(), 6);
        assert!(got.windows(2).all(|w| w[0] < w[1]));
        assert!(got.iter().all(|n| *n > 0 && !occupied.contains(n)));
        assert_eq!(got, vec![3, 5, 6, 7, 8, 10]);
    }

    #[test]
    fn test_highest_numbers() {
        let cases: Vec<(&str, Vec<u32>, usize, Vec<u32>)> = vec![
            ("5,3,1,2,4, take 2", vec![5, 3, 1, 2, 4], 2, vec![5, 4]),
            ("1,2,3, take 5", vec![1, 2, 3], 5, vec![3, 2, 1]),
            ("10,1, take 1", vec![10, 1], 1, vec![10]),
            ("empty, take 1", vec![], 1, vec![]),
            ("take 0", vec![1, 2], 0, vec![]),
        ];

        for (name, existing, count, want) in cases {
            assert_eq!(highest_numbers(&existing, count), want, "{}", name);
        }
    }

    #[test]
    fn test_number_functions_are_repeatable() {
        let occupied = vec![3, 1, 7];
        assert_eq!(next_numbers(&occupied, 4), next_numbers(&occupied, 4));
        assert_eq!(highest_numbers(&occupied, 2), highest_numbers(&occupied, 2));
    }

    #[test]
    fn test_runner_name() {
        assert_eq!(runner_name("ghr", 7), "ghr-runner-7");
        assert_eq!(runner_name("ci.build", 12), "ci.build-runner-12");
    }
}
