//! Link-probability scorers.
//!
//! A [`Scorer`] is trained on a labelled [`PairTable`] and then maps encoded
//! feature vectors to link probabilities in `[0, 1]`. The default
//! implementation is [`LogisticRegression`].

use tracing::{debug, instrument};

use crate::{
    error::{LinkDriftError, Result},
    features::PairTable,
};

/// Trainable link-probability model.
pub trait Scorer {
    /// Trains the model on every row of `table`.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::EmptyTable`] when the table has no rows and
    /// [`LinkDriftError::DegenerateLabelSet`] when it holds a single class.
    fn fit(&mut self, table: &PairTable) -> Result<()>;

    /// Scores one encoded feature vector.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::NotFitted`] before training and
    /// [`LinkDriftError::FeatureWidthMismatch`] when `features` does not match
    /// the trained schema.
    fn score(&self, features: &[f64]) -> Result<f64>;

    /// Scores every row of `table` in row order.
    ///
    /// # Errors
    /// Propagates failures from [`Scorer::score`].
    fn score_table(&self, table: &PairTable) -> Result<Vec<f64>> {
        let schema = table.schema();
        table
            .rows()
            .iter()
            .map(|row| self.score(&row.features().encode(schema)))
            .collect()
    }
}

/// Hyper-parameters for [`LogisticRegression`].
///
/// # Examples
/// ```
/// use linkdrift_core::LogisticConfig;
///
/// let config = LogisticConfig::default().with_learning_rate(0.1);
/// assert_eq!(config.learning_rate(), 0.1);
/// assert!(LogisticConfig::default().with_max_iterations(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticConfig {
    learning_rate: f64,
    max_iterations: usize,
    tolerance: f64,
    l2: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            max_iterations: 500,
            tolerance: 1e-6,
            l2: 1e-4,
        }
    }
}

impl LogisticConfig {
    /// Overrides the gradient-descent step size.
    #[must_use]
    pub const fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Overrides the iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Overrides the gradient-norm stopping tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Overrides the L2 penalty on the weights.
    #[must_use]
    pub const fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    /// Returns the gradient-descent step size.
    #[must_use]
    pub const fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Returns the iteration cap.
    #[must_use]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Returns the gradient-norm stopping tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns the L2 penalty on the weights.
    #[must_use]
    pub const fn l2(&self) -> f64 {
        self.l2
    }

    /// Checks that every parameter is usable.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::InvalidScorerConfig`] naming the first bad
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        let reason = if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            "learning rate must be positive and finite"
        } else if self.max_iterations == 0 {
            "iteration cap must be positive"
        } else if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            "tolerance must be non-negative and finite"
        } else if !(self.l2.is_finite() && self.l2 >= 0.0) {
            "l2 penalty must be non-negative and finite"
        } else {
            return Ok(());
        };
        Err(LinkDriftError::InvalidScorerConfig { reason })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FittedModel {
    means: Vec<f64>,
    scales: Vec<f64>,
    weights: Vec<f64>,
    intercept: f64,
    iterations: usize,
}

impl FittedModel {
    fn logit(&self, features: &[f64]) -> f64 {
        self.intercept
            + features
                .iter()
                .zip(&self.means)
                .zip(&self.scales)
                .zip(&self.weights)
                .map(|(((value, mean), scale), weight)| weight * (value - mean) / scale)
                .sum::<f64>()
    }
}

/// Logistic regression trained by full-batch gradient descent on
/// standardised columns.
///
/// # Examples
/// ```
/// use linkdrift_core::{FeatureBuilder, Graph, LogisticRegression, Scorer};
///
/// let graph = Graph::try_from_pairs(&[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)])?;
/// let table = FeatureBuilder::new().build(graph.edges())?;
/// let mut scorer = LogisticRegression::default();
/// scorer.fit(&table)?;
/// let scores = scorer.score_table(&table)?;
/// assert!(scores.iter().all(|p| (0.0..=1.0).contains(p)));
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogisticRegression {
    config: LogisticConfig,
    model: Option<FittedModel>,
}

impl LogisticRegression {
    /// Creates an untrained model.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::InvalidScorerConfig`] when `config` fails
    /// [`LogisticConfig::validate`].
    pub fn new(config: LogisticConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            model: None,
        })
    }

    /// Returns the training parameters.
    #[must_use]
    pub const fn config(&self) -> &LogisticConfig {
        &self.config
    }

    /// Returns whether [`Scorer::fit`] has succeeded.
    #[must_use]
    pub const fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Returns the weights on standardised columns.
    #[must_use]
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.model.as_ref().map(|model| model.weights.as_slice())
    }

    /// Returns the fitted intercept.
    #[must_use]
    pub fn intercept(&self) -> Option<f64> {
        self.model.as_ref().map(|model| model.intercept)
    }

    /// Returns the gradient-descent iterations used by the last fit.
    #[must_use]
    pub fn iterations(&self) -> Option<usize> {
        self.model.as_ref().map(|model| model.iterations)
    }
}

impl Scorer for LogisticRegression {
    #[instrument(
        name = "scorer.fit",
        err,
        skip_all,
        fields(rows = table.len(), columns = table.schema().width()),
    )]
    fn fit(&mut self, table: &PairTable) -> Result<()> {
        if table.is_empty() {
            return Err(LinkDriftError::EmptyTable);
        }
        let positives = table.positives();
        if positives == 0 || positives == table.len() {
            return Err(LinkDriftError::DegenerateLabelSet {
                positives,
                rows: table.len(),
            });
        }

        let matrix = table.design_matrix();
        let labels: Vec<f64> = table
            .rows()
            .iter()
            .map(|row| if row.link() { 1.0 } else { 0.0 })
            .collect();
        let width = table.schema().width();
        let (means, scales) = column_moments(&matrix, width);
        let standardised: Vec<Vec<f64>> = matrix
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&means)
                    .zip(&scales)
                    .map(|((value, mean), scale)| (value - mean) / scale)
                    .collect()
            })
            .collect();

        let rows = standardised.len() as f64;
        let mut weights = vec![0.0; width];
        let mut intercept = 0.0;
        let mut gradient = vec![0.0; width];
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;
            gradient.iter_mut().for_each(|slot| *slot = 0.0);
            let mut intercept_gradient = 0.0;
            for (row, label) in standardised.iter().zip(&labels) {
                let z = intercept + dot(&weights, row);
                let residual = sigmoid(z) - label;
                intercept_gradient += residual;
                for (slot, value) in gradient.iter_mut().zip(row) {
                    *slot += residual * value;
                }
            }
            intercept_gradient /= rows;
            let mut largest = intercept_gradient.abs();
            for (slot, weight) in gradient.iter_mut().zip(&weights) {
                *slot = *slot / rows + self.config.l2 * weight;
                largest = largest.max(slot.abs());
            }

            intercept -= self.config.learning_rate * intercept_gradient;
            for (weight, slot) in weights.iter_mut().zip(&gradient) {
                *weight -= self.config.learning_rate * slot;
            }
            if largest < self.config.tolerance {
                break;
            }
        }

        debug!(iterations, intercept, "logistic regression fitted");
        self.model = Some(FittedModel {
            means,
            scales,
            weights,
            intercept,
            iterations,
        });
        Ok(())
    }

    fn score(&self, features: &[f64]) -> Result<f64> {
        let model = self.model.as_ref().ok_or(LinkDriftError::NotFitted)?;
        if features.len() != model.weights.len() {
            return Err(LinkDriftError::FeatureWidthMismatch {
                expected: model.weights.len(),
                actual: features.len(),
            });
        }
        Ok(sigmoid(model.logit(features)))
    }
}

/// Returns per-column means and standard deviations. Constant columns get a
/// scale of one so they standardise to zero.
fn column_moments(matrix: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let rows = matrix.len().max(1) as f64;
    let mut means = vec![0.0; width];
    for row in matrix {
        for (mean, value) in means.iter_mut().zip(row) {
            *mean += value;
        }
    }
    means.iter_mut().for_each(|mean| *mean /= rows);

    let mut scales = vec![0.0; width];
    for row in matrix {
        for ((scale, value), mean) in scales.iter_mut().zip(row).zip(&means) {
            *scale += (value - mean).powi(2);
        }
    }
    for scale in &mut scales {
        let deviation = (*scale / rows).sqrt();
        *scale = if deviation > f64::EPSILON { deviation } else { 1.0 };
    }
    (means, scales)
}

fn dot(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{Edge, FeatureBuilder, FeatureInputs, Graph, NodeId, Partition};
    use rstest::rstest;

    fn table_for(pairs: &[(u64, u64)]) -> PairTable {
        let graph = Graph::try_from_pairs(pairs).expect("fixture pairs are valid");
        let partition = Partition::from_labels(graph.nodes().iter().map(|n| (*n, 0)));
        FeatureBuilder::new()
            .build_with(
                FeatureInputs::new(graph.edges())
                    .with_reference(&graph)
                    .with_partition(&partition),
            )
            .expect("table")
    }

    #[test]
    fn unfitted_model_refuses_to_score() {
        let scorer = LogisticRegression::default();
        assert_eq!(scorer.score(&[0.0; 6]), Err(LinkDriftError::NotFitted));
    }

    #[test]
    fn empty_table_cannot_be_fitted() {
        let table = FeatureBuilder::new()
            .build(&BTreeSet::new())
            .expect("empty table");
        let mut scorer = LogisticRegression::default();
        assert_eq!(scorer.fit(&table), Err(LinkDriftError::EmptyTable));
    }

    #[test]
    fn single_class_table_is_degenerate() {
        let table = table_for(&[(0, 1), (0, 2), (1, 2)]);
        let mut scorer = LogisticRegression::default();
        assert_eq!(
            scorer.fit(&table),
            Err(LinkDriftError::DegenerateLabelSet { positives: 3, rows: 3 })
        );
        assert!(!scorer.is_fitted());
    }

    #[test]
    fn width_mismatch_is_reported() {
        let table = table_for(&[(0, 1), (1, 2), (2, 3)]);
        let mut scorer = LogisticRegression::default();
        scorer.fit(&table).expect("fit");
        assert_eq!(
            scorer.score(&[1.0, 2.0]),
            Err(LinkDriftError::FeatureWidthMismatch { expected: 6, actual: 2 })
        );
    }

    #[test]
    fn probabilities_stay_in_unit_interval() {
        let table = table_for(&[(0, 1), (0, 2), (0, 3), (0, 4), (1, 2), (3, 4)]);
        let mut scorer = LogisticRegression::default();
        scorer.fit(&table).expect("fit");
        let scores = scorer.score_table(&table).expect("scores");
        assert_eq!(scores.len(), table.len());
        assert!(scores.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn hub_pairs_outscore_rim_non_edges() {
        // Wheel around hub 0: every hub pair is an edge, every non-edge joins
        // two rim nodes.
        let table = table_for(&[
            (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6),
            (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1),
        ]);
        let mut scorer = LogisticRegression::default();
        scorer.fit(&table).expect("fit");
        let schema = table.schema();
        let score = |a: u64, b: u64| {
            let row = table
                .row(&Edge::new(NodeId::new(a), NodeId::new(b)).expect("edge"))
                .expect("row");
            scorer.score(&row.features().encode(schema)).expect("score")
        };
        assert!(score(0, 1) > score(1, 4));
    }

    #[test]
    fn fitting_is_deterministic() {
        let table = table_for(&[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)]);
        let mut first = LogisticRegression::default();
        let mut second = LogisticRegression::default();
        first.fit(&table).expect("fit");
        second.fit(&table).expect("fit");
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(LogisticConfig::default().with_learning_rate(0.0))]
    #[case(LogisticConfig::default().with_learning_rate(f64::NAN))]
    #[case(LogisticConfig::default().with_max_iterations(0))]
    #[case(LogisticConfig::default().with_tolerance(-1.0))]
    #[case(LogisticConfig::default().with_l2(f64::INFINITY))]
    fn invalid_configs_are_rejected(#[case] config: LogisticConfig) {
        let err = LogisticRegression::new(config).expect_err("config is invalid");
        assert!(matches!(err, LinkDriftError::InvalidScorerConfig { .. }));
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(1_000.0), 1.0);
        assert_eq!(sigmoid(-1_000.0), 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < f64::EPSILON);
    }
}
