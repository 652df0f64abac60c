//! # Percentile Ranker
//!
//! Percentile position of each value within its population, 0–100, higher is
//! better.
//!
//! ## Convention
//!
//! For `n` non-NaN values, a value with `b` values strictly below it and `e`
//! values equal to it (itself included) ranks at
//!
//! ```text
//! 100 · (b + (e + 1) / 2) / n
//! ```
//!
//! i.e. the average 1-based position of its tied block divided by `n`. The
//! highest unique value gets 100, a sole member gets 100, and the lowest of
//! `n` distinct values gets `100 / n`. NaN values are excluded from the
//! population and rank as NaN.

use std::collections::BTreeMap;

/// Percentile rank of every value, aligned with the input.
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let mut ranks = vec![f64::NAN; values.len()];

    let mut ranked: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .collect();
    if ranked.is_empty() {
        return ranks;
    }
    // Stable sort keeps input order inside tied blocks, so the result does
    // not depend on the sort implementation.
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let n = ranked.len() as f64;
    let mut start = 0;
    while start < ranked.len() {
        let value = ranked[start].1;
        let end = ranked[start..]
            .iter()
            .position(|(_, v)| *v != value)
            .map_or(ranked.len(), |offset| start + offset);

        // positions start+1 ..= end (1-based)
        let average_position = (start + 1 + end) as f64 / 2.0;
        let percentile = 100.0 * average_position / n;
        for (index, _) in &ranked[start..end] {
            ranks[*index] = percentile;
        }
        start = end;
    }

    ranks
}

/// Partition row indexes by key, skipping rows without one.
///
/// Groups iterate in key order and keep input order inside each group.
pub fn partition<'a, I>(keys: I) -> BTreeMap<&'a str, Vec<usize>>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, key) in keys.into_iter().enumerate() {
        if let Some(key) = key {
            groups.entry(key).or_default().push(index);
        }
    }
    groups
}

/// Percentile ranks computed separately within each group.
///
/// `groups` maps to indexes into `values`; indexes in no group rank as NaN.
pub fn grouped_percentile_ranks(values: &[f64], groups: &BTreeMap<&str, Vec<usize>>) -> Vec<f64> {
    let mut ranks = vec![f64::NAN; values.len()];
    for members in groups.values() {
        let member_values: Vec<f64> = members.iter().map(|&i| values[i]).collect();
        for (&index, rank) in members.iter().zip(percentile_ranks(&member_values)) {
            ranks[index] = rank;
        }
    }
    ranks
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_values() {
        let ranks = percentile_ranks(&[30.0, 10.0, 20.0, 40.0]);
        assert_eq!(ranks, vec![75.0, 25.0, 50.0, 100.0]);
    }

    #[test]
    fn ties_share_the_average_position() {
        // sorted: 10, 20, 20, 40 -> positions 1, 2.5, 2.5, 4
        let ranks = percentile_ranks(&[20.0, 10.0, 40.0, 20.0]);
        assert_eq!(ranks, vec![62.5, 25.0, 100.0, 62.5]);
    }

    #[test]
    fn all_equal_values() {
        let ranks = percentile_ranks(&[5.0, 5.0, 5.0]);
        assert_eq!(ranks, vec![66.66666666666667; 3]);
    }

    #[test]
    fn sole_member_ranks_100() {
        assert_eq!(percentile_ranks(&[12.0]), vec![100.0]);
    }

    #[test]
    fn empty_population() {
        assert!(percentile_ranks(&[]).is_empty());
        let ranks = percentile_ranks(&[f64::NAN, f64::NAN]);
        assert!(ranks.iter().all(|r| r.is_nan()));
    }

    #[test]
    fn nan_is_excluded_from_population() {
        let ranks = percentile_ranks(&[10.0, f64::NAN, 20.0]);
        assert_eq!(ranks[0], 50.0);
        assert!(ranks[1].is_nan());
        assert_eq!(ranks[2], 100.0);
    }

    #[test]
    fn partition_skips_missing_keys() {
        let groups = partition([Some("b"), None, Some("a"), Some("b")]);
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(groups.get("b"), Some(&vec![0, 3]));
        assert_eq!(groups.get("a"), Some(&vec![2]));
    }

    #[test]
    fn grouped_ranks_are_group_relative() {
        let values = [10.0, 90.0, 20.0, 50.0, 70.0];
        let groups = partition([Some("x"), Some("y"), Some("x"), None, Some("y")]);
        let ranks = grouped_percentile_ranks(&values, &groups);
        assert_eq!(ranks[0], 50.0);
        assert_eq!(ranks[2], 100.0);
        assert_eq!(ranks[1], 100.0);
        assert_eq!(ranks[4], 50.0);
        assert!(ranks[3].is_nan());
    }
}
