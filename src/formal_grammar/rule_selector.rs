//! Policies choosing one alternative of an `Or` rule per expansion step.
//!
//! * `Uniform` - equal chance for each alternative, index = floor(r*n)
//! * `Weighted` - cumulative lookup of the draw in the normalized weights
//! * `MinDepth` - while the node being placed is shallower than the minimum depth only
//!   alternatives able to push their leaves deep enough stay eligible, the inner selector picks
//!   among them
//!
//! A choice among a single eligible alternative consumes no draw.
use crate::formal_grammar::draw_source::DrawSource;
use crate::formal_grammar::grammar_errors::GrammarError;

/// tolerance for the sum of a weight vector
pub const WEIGHTS_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum RuleSelector {
    Uniform,
    Weighted(Vec<f64>),
    MinDepth {
        min_depth: usize,
        inner: Box<RuleSelector>,
    },
}

impl RuleSelector {
    /// weighted selector, probabilities must sum to 1
    pub fn weighted(probabilities: Vec<f64>) -> Result<Self, GrammarError> {
        if probabilities.iter().any(|p| *p < 0.0 || !p.is_finite()) {
            return Err(GrammarError::InvalidWeights(format!(
                "negative or non-finite weight in {:?}",
                probabilities
            )));
        }
        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > WEIGHTS_TOLERANCE {
            return Err(GrammarError::InvalidWeights(format!(
                "weights {:?} sum to {} instead of 1",
                probabilities, sum
            )));
        }
        Ok(RuleSelector::Weighted(probabilities))
    }

    pub fn min_depth(min_depth: usize, inner: RuleSelector) -> Self {
        RuleSelector::MinDepth {
            min_depth,
            inner: Box::new(inner),
        }
    }

    /// number of alternatives the selector was configured for, if it cares
    pub fn expected_alternatives(&self) -> Option<usize> {
        match self {
            RuleSelector::Uniform => None,
            RuleSelector::Weighted(weights) => Some(weights.len()),
            RuleSelector::MinDepth { inner, .. } => inner.expected_alternatives(),
        }
    }

    /// largest minimum depth enforced by this selector (0 if none)
    pub fn enforced_depth(&self) -> usize {
        match self {
            RuleSelector::MinDepth { min_depth, inner } => (*min_depth).max(inner.enforced_depth()),
            _ => 0,
        }
    }

    /// Picks one of `count` alternatives.
    /// `depth` is the 1-based depth of the next node to be placed, `reach(i)` how deep alternative i
    /// can keep its shallowest leaf relative to that node.
    pub fn select(
        &self,
        count: usize,
        depth: usize,
        reach: &dyn Fn(usize) -> usize,
        draws: &mut dyn DrawSource,
    ) -> usize {
        let candidates: Vec<usize> = (0..count).collect();
        self.select_among(&candidates, depth, reach, draws)
    }

    fn select_among(
        &self,
        candidates: &[usize],
        depth: usize,
        reach: &dyn Fn(usize) -> usize,
        draws: &mut dyn DrawSource,
    ) -> usize {
        if candidates.len() == 1 {
            return candidates[0];
        }
        match self {
            RuleSelector::Uniform => {
                let r = draws.next_draw();
                let i = ((r * candidates.len() as f64) as usize).min(candidates.len() - 1);
                candidates[i]
            }
            RuleSelector::Weighted(weights) => {
                let eligible: Vec<f64> = candidates.iter().map(|&i| weights[i]).collect();
                let total: f64 = eligible.iter().sum();
                let r = draws.next_draw();
                if total <= 0.0 {
                    let i = ((r * candidates.len() as f64) as usize).min(candidates.len() - 1);
                    return candidates[i];
                }
                candidates[take_weighted(&normalize(&eligible), r)]
            }
            RuleSelector::MinDepth { min_depth, inner } => {
                if depth >= *min_depth {
                    return inner.select_among(candidates, depth, reach, draws);
                }
                let deep_enough: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&i| depth + reach(i) >= *min_depth)
                    .collect();
                if !deep_enough.is_empty() {
                    return inner.select_among(&deep_enough, depth, reach, draws);
                }
                // nothing reaches the minimum, keep the deepest ones
                let deepest = candidates.iter().map(|&i| reach(i)).max().unwrap_or(0);
                let deepest: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&i| reach(i) == deepest)
                    .collect();
                inner.select_among(&deepest, depth, reach, draws)
            }
        }
    }
}

/// divides every weight by the sum of all weights
pub fn normalize(weights: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| w / sum).collect()
}

/// index of the first cumulative weight exceeding r; the last cumulative entry is forced to 1
pub fn take_weighted(probabilities: &[f64], r: f64) -> usize {
    let mut cumulative: Vec<f64> = probabilities
        .iter()
        .scan(0.0, |acc, p| {
            *acc += p;
            Some(*acc)
        })
        .collect();
    if let Some(last) = cumulative.last_mut() {
        *last = 1.0;
    }
    let index = cumulative.iter().take_while(|&&c| r >= c).count();
    index.min(probabilities.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formal_grammar::draw_source::ScriptedDraws;
    use approx::assert_relative_eq;

    fn no_reach(_: usize) -> usize {
        0
    }

    #[test]
    fn uniform_selection() {
        let selector = RuleSelector::Uniform;
        let mut draws = ScriptedDraws::new(vec![0.0, 0.34, 0.99]);
        assert_eq!(selector.select(3, 1, &no_reach, &mut draws), 0);
        assert_eq!(selector.select(3, 1, &no_reach, &mut draws), 1);
        assert_eq!(selector.select(3, 1, &no_reach, &mut draws), 2);
    }

    #[test]
    fn single_alternative_consumes_no_draw() {
        let mut draws = ScriptedDraws::new(vec![0.5]);
        assert_eq!(RuleSelector::Uniform.select(1, 1, &no_reach, &mut draws), 0);
        let weighted = RuleSelector::weighted(vec![1.0]).unwrap();
        assert_eq!(weighted.select(1, 1, &no_reach, &mut draws), 0);
        assert_eq!(draws.consumed(), 0);
    }

    #[test]
    fn weighted_selection_by_cumulative_lookup() {
        let selector = RuleSelector::weighted(vec![0.2, 0.5, 0.3]).unwrap();
        let mut draws = ScriptedDraws::new(vec![0.1, 0.21, 0.69, 0.71, 0.999]);
        let picks: Vec<usize> = (0..5)
            .map(|_| selector.select(3, 1, &no_reach, &mut draws))
            .collect();
        assert_eq!(picks, vec![0, 1, 1, 2, 2]);
    }

    #[test]
    fn weighted_selector_validates_sum() {
        assert!(RuleSelector::weighted(vec![0.5, 0.6]).is_err());
        assert!(RuleSelector::weighted(vec![0.5, -0.5, 1.0]).is_err());
        assert!(RuleSelector::weighted(vec![0.1; 10]).is_ok());
    }

    #[test]
    fn min_depth_gate_restricts_shallow_alternatives() {
        // alternative 0 is a leaf, alternative 1 recurses
        let selector = RuleSelector::min_depth(3, RuleSelector::Uniform);
        let reach = |i: usize| if i == 0 { 0 } else { 3 };
        let mut draws = ScriptedDraws::new(vec![0.0]);
        assert_eq!(selector.select(2, 1, &reach, &mut draws), 1);
        assert_eq!(selector.select(2, 2, &reach, &mut draws), 1);
        assert_eq!(draws.consumed(), 0);
        // free choice from the minimum depth on
        assert_eq!(selector.select(2, 3, &reach, &mut draws), 0);
        assert_eq!(draws.consumed(), 1);
    }

    #[test]
    fn min_depth_gate_falls_back_to_deepest() {
        let selector = RuleSelector::min_depth(10, RuleSelector::Uniform);
        let reach = |i: usize| [0, 2, 1][i];
        let mut draws = ScriptedDraws::new(vec![0.0]);
        assert_eq!(selector.select(3, 1, &reach, &mut draws), 1);
    }

    #[test]
    fn min_depth_gate_renormalizes_inner_weights() {
        let inner = RuleSelector::weighted(vec![0.6, 0.1, 0.3]).unwrap();
        let selector = RuleSelector::min_depth(2, inner);
        let reach = |i: usize| if i == 0 { 0 } else { 5 };
        // eligible 1 and 2 with weights 0.25 and 0.75
        let mut draws = ScriptedDraws::new(vec![0.2, 0.3]);
        assert_eq!(selector.select(3, 1, &reach, &mut draws), 1);
        assert_eq!(selector.select(3, 1, &reach, &mut draws), 2);
        assert_eq!(selector.enforced_depth(), 2);
        assert_eq!(selector.expected_alternatives(), Some(3));
    }

    #[test]
    fn normalization() {
        let normalized = normalize(&[30.0, 20.0]);
        assert_relative_eq!(normalized[0], 0.6);
        assert_relative_eq!(normalized[1], 0.4);
    }
}
