//! # Composite Aggregator
//!
//! `0.30·Velocity + 0.25·Conversion + 0.20·Availability + 0.15·Penetration
//! + 0.10·Momentum`
//!
//! NaN policy: renormalization. NaN components are left out and the weights
//! of the remaining ones are rescaled to sum to 1, as long as the remaining
//! weight reaches `min_weight_coverage`. Below that, or with every component
//! NaN, the composite is NaN.
//!
//! The same function produces both tracks; only the population the component
//! scores were computed over differs.

use crate::components::{Component, ComponentScores, MAX_SCORE, MIN_SCORE};

/// Tolerance for comparing summed weights against the coverage floor.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Weighted composite of five component scores. See the module docs.
pub fn composite_score(scores: &ComponentScores, min_weight_coverage: f64) -> f64 {
    let mut weighted_sum = 0.0;
    let mut available_weight = 0.0;
    for (component, score) in scores.iter() {
        if !score.is_nan() {
            weighted_sum += component.weight() * score;
            available_weight += component.weight();
        }
    }

    if available_weight <= 0.0 || available_weight + WEIGHT_EPSILON < min_weight_coverage {
        return f64::NAN;
    }

    // A weighted mean of in-range scores is in range; this only absorbs rounding.
    (weighted_sum / available_weight).clamp(MIN_SCORE, MAX_SCORE)
}

/// Composite formula as displayed in the definitions table.
pub fn composite_formula() -> String {
    Component::ALL
        .iter()
        .map(|c| format!("{:.2} × {}", c.weight(), c.name().trim_end_matches(" Score")))
        .collect::<Vec<_>>()
        .join(" + ")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: [f64; 5]) -> ComponentScores {
        ComponentScores {
            velocity: values[0],
            conversion: values[1],
            availability: values[2],
            penetration: values[3],
            momentum: values[4],
        }
    }

    #[test]
    fn full_weighted_sum() {
        let composite = composite_score(&scores([100.0, 80.0, 60.0, 40.0, 20.0]), 0.5);
        // 30 + 20 + 12 + 6 + 2
        assert!((composite - 70.0).abs() < 1e-9);
    }

    #[test]
    fn uniform_scores_stay_uniform() {
        let composite = composite_score(&scores([55.0; 5]), 0.5);
        assert!((composite - 55.0).abs() < 1e-9);
    }

    #[test]
    fn nan_component_is_renormalized_away() {
        // momentum missing: (30 + 20 + 12 + 6) / 0.9
        let composite = composite_score(&scores([100.0, 80.0, 60.0, 40.0, f64::NAN]), 0.5);
        assert!((composite - 68.0 / 0.9).abs() < 1e-9);
    }

    #[test]
    fn insufficient_coverage_is_nan() {
        // only conversion + momentum: 0.35 < 0.5
        let composite = composite_score(&scores([f64::NAN, 80.0, f64::NAN, f64::NAN, 50.0]), 0.5);
        assert!(composite.is_nan());

        // exactly at the floor: velocity + availability = 0.5
        let composite = composite_score(&scores([60.0, f64::NAN, 40.0, f64::NAN, f64::NAN]), 0.5);
        assert!((composite - 52.0).abs() < 1e-9);
    }

    #[test]
    fn all_nan_is_nan() {
        assert!(composite_score(&ComponentScores::MISSING, 0.5).is_nan());
        assert!(composite_score(&ComponentScores::MISSING, 0.01).is_nan());
    }

    #[test]
    fn formula_lists_weights() {
        assert_eq!(
            composite_formula(),
            "0.30 × Velocity + 0.25 × Conversion + 0.20 × Availability + 0.15 × Penetration + 0.10 × Momentum"
        );
    }
}
