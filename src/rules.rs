use std::fmt;

use tracing::debug;

use crate::error::{ChaosError, DistributionFault, Result};

/// Allowed distance between the probability total and 1.0.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-9;

pub type Transform<P> = Box<dyn Fn(&P) -> P + Send + Sync>;

/// One rule as supplied by the caller: a map on points, the probability of
/// choosing it, and an opaque label carried through to every point it
/// produces.
pub struct UpdateRule<P, L> {
    probability: f64,
    transform: Transform<P>,
    label: L,
}

impl<P, L> UpdateRule<P, L> {
    pub fn new<F>(probability: f64, transform: F, label: L) -> Self
    where
        F: Fn(&P) -> P + Send + Sync + 'static,
    {
        UpdateRule {
            probability,
            transform: Box::new(transform),
            label,
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn label(&self) -> &L {
        &self.label
    }
}

impl<P, L: fmt::Debug> fmt::Debug for UpdateRule<P, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRule")
            .field("probability", &self.probability)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A rule placed in the cumulative distribution.
pub struct WeightedRule<P, L> {
    threshold: f64,
    probability: f64,
    transform: Transform<P>,
    label: L,
}

impl<P, L> WeightedRule<P, L> {
    /// Running sum of probabilities up to and including this rule.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn label(&self) -> &L {
        &self.label
    }

    pub fn apply(&self, point: &P) -> P {
        (self.transform)(point)
    }
}

impl<P, L: fmt::Debug> fmt::Debug for WeightedRule<P, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedRule")
            .field("threshold", &self.threshold)
            .field("probability", &self.probability)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Validated, immutable set of update rules in cumulative order.
///
/// Rules are stored sorted by ascending probability (ties keep their input
/// order) so the rare rules come first and the common ones are reached
/// with a short search.
pub struct RuleSet<P, L> {
    rules: Vec<WeightedRule<P, L>>,
}

impl<P, L> RuleSet<P, L> {
    /// Validates the probabilities and builds the cumulative thresholds.
    ///
    /// Fails with [`ChaosError::EmptyRuleSet`] for an empty input and with
    /// [`ChaosError::InvalidDistribution`] when a probability is not a
    /// finite positive number or the total is not 1.0 within
    /// [`DISTRIBUTION_TOLERANCE`]. Weights are never renormalized.
    pub fn build(rules: impl IntoIterator<Item = UpdateRule<P, L>>) -> Result<Self> {
        let mut rules: Vec<UpdateRule<P, L>> = rules.into_iter().collect();
        if rules.is_empty() {
            return Err(ChaosError::EmptyRuleSet);
        }

        for (index, rule) in rules.iter().enumerate() {
            let p = rule.probability;
            if !p.is_finite() || p <= 0.0 {
                return Err(DistributionFault::NonPositiveProbability {
                    index,
                    probability: p,
                }
                .into());
            }
        }

        // sort_by is stable
        rules.sort_by(|a, b| a.probability.total_cmp(&b.probability));

        let mut cumulative = 0.0;
        let rules: Vec<WeightedRule<P, L>> = rules
            .into_iter()
            .map(|rule| {
                cumulative += rule.probability;
                WeightedRule {
                    threshold: cumulative,
                    probability: rule.probability,
                    transform: rule.transform,
                    label: rule.label,
                }
            })
            .collect();

        // checked after sorting: the input-order sum can round differently
        if (cumulative - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(DistributionFault::SumOutOfTolerance { total: cumulative }.into());
        }
        if cumulative < 1.0 {
            debug!(
                threshold = cumulative,
                "final threshold below 1.0, draws above it go to the last rule"
            );
        }

        debug!(
            rules = rules.len(),
            thresholds = ?rules.iter().map(|r| r.threshold).collect::<Vec<_>>(),
            "built rule set"
        );

        Ok(RuleSet { rules })
    }

    /// Picks the first rule whose threshold is at least `draw`.
    ///
    /// A draw above the last threshold (rounding left the total a hair
    /// under 1.0) selects the last rule.
    pub fn select(&self, draw: f64) -> &WeightedRule<P, L> {
        let index = self.rules.partition_point(|rule| rule.threshold < draw);
        self.rules.get(index).unwrap_or_else(|| self.last())
    }

    fn last(&self) -> &WeightedRule<P, L> {
        // build() rejects empty input
        &self.rules[self.rules.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in cumulative order.
    pub fn iter(&self) -> std::slice::Iter<'_, WeightedRule<P, L>> {
        self.rules.iter()
    }

    pub fn thresholds(&self) -> Vec<f64> {
        self.rules.iter().map(|r| r.threshold).collect()
    }
}

impl<'a, P, L> IntoIterator for &'a RuleSet<P, L> {
    type Item = &'a WeightedRule<P, L>;
    type IntoIter = std::slice::Iter<'a, WeightedRule<P, L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl<P, L: fmt::Debug> fmt::Debug for RuleSet<P, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(probability: f64, label: &'static str) -> UpdateRule<f64, &'static str> {
        UpdateRule::new(probability, |x: &f64| *x, label)
    }

    fn labels(set: &RuleSet<f64, &'static str>) -> Vec<&'static str> {
        set.iter().map(|r| *r.label()).collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = RuleSet::<f64, ()>::build(Vec::new()).unwrap_err();
        assert!(matches!(err, ChaosError::EmptyRuleSet));
    }

    #[test]
    fn short_total_is_rejected() {
        let err = RuleSet::build(vec![
            constant(0.3, "a"),
            constant(0.3, "b"),
            constant(0.3, "c"),
        ])
        .unwrap_err();
        match err {
            ChaosError::InvalidDistribution(DistributionFault::SumOutOfTolerance { total }) => {
                assert!((total - 0.9).abs() < 1e-12);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn excess_total_is_rejected() {
        let err = RuleSet::build(vec![constant(0.6, "a"), constant(0.6, "b")]).unwrap_err();
        assert!(matches!(
            err,
            ChaosError::InvalidDistribution(DistributionFault::SumOutOfTolerance { .. })
        ));
    }

    #[test]
    fn zero_probability_is_rejected() {
        let err = RuleSet::build(vec![constant(1.0, "a"), constant(0.0, "b")]).unwrap_err();
        match err {
            ChaosError::InvalidDistribution(DistributionFault::NonPositiveProbability {
                index,
                probability,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(probability, 0.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_and_nan_probabilities_are_rejected() {
        for bad in [-0.5, f64::NAN, f64::INFINITY] {
            let err = RuleSet::build(vec![constant(1.5, "a"), constant(bad, "b")]).unwrap_err();
            assert!(
                matches!(
                    err,
                    ChaosError::InvalidDistribution(
                        DistributionFault::NonPositiveProbability { index: 1, .. }
                    )
                ),
                "probability {bad} accepted"
            );
        }
    }

    #[test]
    fn total_within_tolerance_is_accepted() {
        let set = RuleSet::build(vec![constant(0.5 + 5e-10, "a"), constant(0.5, "b")]);
        assert!(set.is_ok());
    }

    #[test]
    fn thirds_sum_close_enough() {
        let third = 1.0 / 3.0;
        let set = RuleSet::build(vec![
            constant(third, "a"),
            constant(third, "b"),
            constant(third, "c"),
        ])
        .unwrap();
        assert_eq!(set.len(), 3);
        assert!((set.thresholds()[2] - 1.0).abs() <= DISTRIBUTION_TOLERANCE);
    }

    #[test]
    fn rules_sorted_ascending_with_stable_ties() {
        let set = RuleSet::build(vec![
            constant(0.85, "stem"),
            constant(0.07, "left"),
            constant(0.01, "base"),
            constant(0.07, "right"),
        ])
        .unwrap();
        assert_eq!(labels(&set), vec!["base", "left", "right", "stem"]);

        let thresholds = set.thresholds();
        let expected = [0.01, 0.08, 0.15, 1.0];
        for (got, want) in thresholds.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
    }

    #[test]
    fn select_bounds() {
        let set = RuleSet::build(vec![
            constant(0.5, "big"),
            constant(0.25, "x"),
            constant(0.25, "y"),
        ])
        .unwrap();
        assert_eq!(*set.select(0.0).label(), "x");
        assert_eq!(*set.select(0.25).label(), "x");
        assert_eq!(*set.select(0.250001).label(), "y");
        assert_eq!(*set.select(0.5).label(), "y");
        assert_eq!(*set.select(0.75).label(), "big");
        assert_eq!(*set.select(1.0 - f64::EPSILON).label(), "big");
    }

    #[test]
    fn select_clamps_past_last_threshold() {
        // draws at or past the final threshold all land on the last rule
        let set = RuleSet::build(vec![
            constant(0.1, "a"),
            constant(0.2, "b"),
            constant(0.7, "c"),
        ])
        .unwrap();
        let last = *set.thresholds().last().unwrap();
        assert_eq!(*set.select(last + 1e-12).label(), "c");
        assert_eq!(*set.select(1.0).label(), "c");
    }

    #[test]
    fn final_threshold_is_what_gets_checked() {
        // sums to within 1e-9 in this order, but not once sorted ascending
        let err = RuleSet::build(vec![
            constant(0.4279901203794501, "a"),
            constant(0.44653579398015686, "b"),
            constant(0.12547408664039297, "c"),
        ])
        .unwrap_err();
        match err {
            ChaosError::InvalidDistribution(DistributionFault::SumOutOfTolerance { total }) => {
                assert!((total - 1.0).abs() > DISTRIBUTION_TOLERANCE, "total {total}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn draw_above_short_final_threshold_takes_last_rule() {
        let set = RuleSet::build(vec![constant(0.5, "big"), constant(0.5 - 5e-10, "small")])
            .unwrap();
        let last = *set.thresholds().last().unwrap();
        assert!(last < 1.0 - 1e-10, "final threshold {last}");
        assert_eq!(*set.select(1.0 - 1e-10).label(), "big");
        assert_eq!(*set.select(last).label(), "big");
        assert_eq!(*set.select(0.25).label(), "small");
    }

    #[test]
    fn thresholds_partition_unit_interval() {
        let set = RuleSet::build(vec![
            constant(0.1, "a"),
            constant(0.2, "b"),
            constant(0.3, "c"),
            constant(0.4, "d"),
        ])
        .unwrap();
        let mut counts = std::collections::HashMap::new();
        let steps = 10_000;
        for i in 0..steps {
            let draw = i as f64 / steps as f64;
            *counts.entry(*set.select(draw).label()).or_insert(0usize) += 1;
        }
        for rule in &set {
            let share = counts[rule.label()] as f64 / steps as f64;
            assert!(
                (share - rule.probability()).abs() < 1e-3,
                "{} got share {share}",
                rule.label()
            );
        }
    }

    #[test]
    fn single_rule_takes_every_draw() {
        let set = RuleSet::build(vec![UpdateRule::new(1.0, |x: &f64| x * 2.0, 'z')]).unwrap();
        for draw in [0.0, 0.3, 0.999_999] {
            let rule = set.select(draw);
            assert_eq!(*rule.label(), 'z');
            assert_eq!(rule.apply(&1.5), 3.0);
        }
    }
}
