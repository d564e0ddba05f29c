use crate::FlowError;

/// Largest accepted deviation of a probability vector's sum from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// A validated probability vector turning uniform draws into output
/// indices.
///
/// Validation happens once, at construction, so that [`select()`]
/// can never run past the end of the vector.
///
/// [`select()`]: WeightedSelector::select
#[derive(Clone, PartialEq, Debug)]
pub struct WeightedSelector {
    probabilities: Vec<f64>,
    last_positive: usize,
}

impl WeightedSelector {
    pub fn new(probabilities: Vec<f64>) -> Result<Self, FlowError> {
        if probabilities.is_empty() {
            return Err(FlowError::ProbabilitiesEmpty)
        }

        for &p in probabilities.iter() {
            if !p.is_finite() || p < 0.0 {
                return Err(FlowError::ProbabilityInvalid(p))
            }
        }

        let sum: f64 = probabilities.iter().sum();

        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(FlowError::ProbabilitiesSum(sum))
        }

        // The sum is positive, so some entry is.
        let last_positive = probabilities.iter().rposition(|&p| p > 0.0).unwrap_or(0);

        Ok(WeightedSelector { probabilities, last_positive })
    }

    /// Builds a selector from non-negative firing weights, normalized
    /// by their sum.
    pub fn from_weights(weights: &[f64]) -> Result<Self, FlowError> {
        for &w in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(FlowError::ProbabilityInvalid(w))
            }
        }

        let total: f64 = weights.iter().sum();

        if weights.is_empty() {
            Err(FlowError::ProbabilitiesEmpty)
        } else if total <= 0.0 {
            Err(FlowError::WeightsZero)
        } else {
            Self::new(weights.iter().map(|w| w / total).collect())
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    #[inline]
    pub fn get_probabilities(&self) -> &[f64] {
        self.probabilities.as_slice()
    }

    /// Returns the smallest index `i` such that `p[0] + ... + p[i] >= r`,
    /// where `r` is a draw from `[0, 1)`.
    ///
    /// A draw left over after the scan can only come from the rounding
    /// slack admitted by [`PROBABILITY_TOLERANCE`]; it goes to the last
    /// index with positive mass.
    pub fn select(&self, r: f64) -> usize {
        let mut r = r;

        for (i, &p) in self.probabilities.iter().enumerate() {
            if r <= p {
                return i
            }
            r -= p;
        }

        self.last_positive
    }
}
