//! Congruence statistics over the comparator's result tables.
//!
//! # Convention
//! Lower distance means more congruent. The empirical p-value is one-sided:
//! the fraction of random trees whose distance to the host tree is less than
//! or equal to the observed host–microbiome distance. A small p-value means
//! random trees rarely match the host tree as well as the microbiome does.
//!
//! # Normalization
//! The observed score is also reported relative to the worst random score
//! (`observed / max(random)`). When every random score is zero the ratio is
//! undefined and reported as such rather than dividing by zero.

use thiserror::Error;

use crate::compare::Method;
use crate::io::Report;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("observed-pair table has no data rows")]
    NoObservedScore,
    #[error("null-distribution table has no data rows")]
    NoNullScores,
}

/// Per-method congruence summary.
#[derive(Debug, Clone)]
pub struct MethodSummary {
    pub method: Method,
    /// Host-vs-microbiome distance.
    pub observed: f64,
    /// Largest distance among the random trees.
    pub max_random: f64,
    /// `observed / max_random`; `None` when all random scores are zero.
    pub normalized: Option<f64>,
    /// Random trees at least as congruent as the microbiome (distance ≤ observed).
    pub as_congruent: usize,
    /// Size of the null distribution.
    pub total: usize,
}

impl MethodSummary {
    /// One-sided empirical p-value; in [0,1] whenever `total > 0`.
    pub fn p_value(&self) -> f64 {
        self.as_congruent as f64 / self.total as f64
    }
}

impl std::fmt::Display for MethodSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, " --- METHOD: {} --- ", self.method)?;
        writeln!(f, "Host-Microbe Score:   {}", self.observed)?;
        writeln!(f, "Max Stochastic Metric:  {}", self.max_random)?;
        match self.normalized {
            Some(score) => writeln!(f, "Normalized Score: {score}")?,
            None => writeln!(f, "Normalized Score: undefined (all random scores are zero)")?,
        }
        writeln!(
            f,
            "Random Trees with Equivalent or More Congruent Score: {}",
            self.as_congruent
        )?;
        writeln!(f, "Total Trees: {}", self.total)?;
        writeln!(f, "P-Value: {}", self.p_value())
    }
}

/// Reduce the two result tables for one method into a [`MethodSummary`].
///
/// The observed score is the first data row of the pair table; the null
/// distribution is every row of the random-tree table.
pub fn summarize(method: Method, pair: &Report, null: &Report) -> Result<MethodSummary, StatsError> {
    let observed = *pair.scores.first().ok_or(StatsError::NoObservedScore)?;
    if null.scores.is_empty() {
        return Err(StatsError::NoNullScores);
    }

    let max_random = null
        .scores
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let as_congruent = null.scores.iter().filter(|&&score| score <= observed).count();

    let normalized = if max_random > 0.0 {
        Some(observed / max_random)
    } else {
        None
    };

    Ok(MethodSummary {
        method,
        observed,
        max_random,
        normalized,
        as_congruent,
        total: null.scores.len(),
    })
}

#[cfg(test)]
fn report(scores: &[f64]) -> Report {
    Report {
        header: vec!["No.".to_string(), "Metric".to_string()],
        scores: scores.to_vec(),
    }
}

#[test]
fn summary_of_a_typical_run() {
    let pair = report(&[4.0]);
    let null = report(&[2.0, 4.0, 6.0, 8.0]);

    let summary = summarize(Method::RobinsonFoulds, &pair, &null).unwrap();
    assert_eq!(summary.observed, 4.0);
    assert_eq!(summary.max_random, 8.0);
    assert_eq!(summary.normalized, Some(0.5));
    assert_eq!(summary.as_congruent, 2);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.p_value(), 0.5);
}

#[test]
fn all_zero_random_scores_leave_normalization_undefined() {
    let pair = report(&[0.0]);
    let null = report(&[0.0, 0.0, 0.0]);

    let summary = summarize(Method::RootedRobinsonFoulds, &pair, &null).unwrap();
    assert_eq!(summary.normalized, None);
    assert_eq!(summary.p_value(), 1.0);
    assert!(summary.to_string().contains("undefined"));
}

#[test]
fn identical_trees_score_zero_against_a_spread_null() {
    // Observed distance 0: only the random trees that also hit 0 count.
    let pair = report(&[0.0]);
    let null = report(&[0.0, 1.0, 2.0, 3.0]);

    let summary = summarize(Method::MatchingCluster, &pair, &null).unwrap();
    assert_eq!(summary.normalized, Some(0.0));
    assert_eq!(summary.as_congruent, 1);
    assert_eq!(summary.p_value(), 0.25);
}

#[test]
fn p_value_stays_in_unit_interval() {
    let pair = report(&[5.0]);
    let null = report(&[1.0, 9.0, 5.0, 4.9, 5.1, 0.0, 12.5]);

    let summary = summarize(Method::MatchingSplit, &pair, &null).unwrap();
    let p = summary.p_value();
    assert!((0.0..=1.0).contains(&p));
    assert_eq!(summary.as_congruent, 4);
}

#[test]
fn empty_tables_are_rejected() {
    let empty = report(&[]);
    let filled = report(&[1.0]);

    assert!(matches!(
        summarize(Method::RobinsonFoulds, &empty, &filled),
        Err(StatsError::NoObservedScore)
    ));
    assert!(matches!(
        summarize(Method::RobinsonFoulds, &filled, &empty),
        Err(StatsError::NoNullScores)
    ));
}
