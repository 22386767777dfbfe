//! Earlier formula generator: instead of a grammar it draws a sequence of operator arities that
//! consumes a shuffled list of leaves and assembles the tree bottom-up with a FIFO queue.
//! Formulas built this way have no depth control and tend to be flat.
use crate::formal_grammar::tree_node::TreeNode;
use crate::formulas::formula_errors::FormulaError;
use crate::formulas::formula_tree::FormulaTree;
use crate::formulas::operators::Operator;
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// largest constant drawn for a leaf (exclusive)
pub const MAX_LEAF_CONSTANT: i32 = 20;

pub struct AritySequenceGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> AritySequenceGenerator<R> {
    pub fn new(rng: R) -> Self {
        AritySequenceGenerator { rng }
    }

    /// Random formula over `x0..x{dimensions-1}` with exactly `variables` variable leaves,
    /// `constants` constant leaves and `unary_dilution` extra unary operators.
    pub fn create_random_formula_tree(
        &mut self,
        dimensions: usize,
        variables: usize,
        constants: usize,
        unary_dilution: usize,
        library: &[Operator],
    ) -> Result<FormulaTree, FormulaError> {
        if variables < dimensions {
            return Err(FormulaError::Configuration(
                "variables count can't be less than dimensions count".to_string(),
            ));
        }
        if dimensions == 0 && variables > 0 {
            return Err(FormulaError::Configuration(
                "variables need at least one dimension".to_string(),
            ));
        }
        if library.is_empty() {
            return Err(FormulaError::Configuration(
                "operators library can't be empty".to_string(),
            ));
        }
        let count_of = |arity: usize| library.iter().filter(|op| op.arity() == arity).count();
        if variables + constants > 1 && count_of(2) == 0 {
            return Err(FormulaError::Configuration(
                "more than one leaf requires binary operators in the library".to_string(),
            ));
        }
        if unary_dilution > 0 && count_of(1) == 0 {
            return Err(FormulaError::Configuration(
                "unary dilution requires unary operators in the library".to_string(),
            ));
        }

        let ternary_probability = if count_of(2) + count_of(3) > 0 {
            count_of(3) as f64 / (count_of(2) + count_of(3)) as f64
        } else {
            0.0
        };
        let arities =
            self.arity_sequence(variables + constants, unary_dilution, ternary_probability)?;
        let mut operators = Vec::with_capacity(arities.len());
        for arity in arities {
            let candidates: Vec<&Operator> =
                library.iter().filter(|op| op.arity() == arity).collect();
            let pick = self.rng.random_range(0..candidates.len());
            operators.push(candidates[pick].clone());
        }

        let names: Vec<String> = (0..dimensions).map(|i| format!("x{}", i)).collect();
        let mut leaves: Vec<Operator> = names.iter().map(|name| Operator::variable(name)).collect();
        for _ in dimensions..variables {
            let pick = self.rng.random_range(0..names.len());
            leaves.push(Operator::variable(&names[pick]));
        }
        for _ in 0..constants {
            let value = self.rng.random_range(1..MAX_LEAF_CONSTANT);
            leaves.push(Operator::constant(value as f64));
        }
        leaves.shuffle(&mut self.rng);

        let tree = assemble_formula_tree(leaves, operators)?;
        debug!("arity sequence formula: {}", tree);
        Ok(tree)
    }

    /// Arities of the non-leaf operators, in the order they consume the leaf queue.
    pub fn arity_sequence(
        &mut self,
        leaves: usize,
        unary: usize,
        ternary_probability: f64,
    ) -> Result<Vec<usize>, FormulaError> {
        if leaves < 1 {
            return Err(FormulaError::Configuration(
                "at least one leaf is required".to_string(),
            ));
        }
        if ternary_probability > 0.99 {
            return Err(FormulaError::Configuration(format!(
                "ternary probability {} is above 0.99",
                ternary_probability
            )));
        }
        let mut pending = leaves;
        let mut unary = unary;
        let mut sequence = Vec::new();
        while pending > 1 {
            let unary_probability = unary as f64 / (pending + unary) as f64;
            let mut arity = if self.rng.random::<f64>() < unary_probability {
                1
            } else {
                2
            };
            if arity == 2 && pending > 2 && self.rng.random::<f64>() < ternary_probability {
                arity = 3;
            }
            sequence.push(arity);
            pending -= arity - 1;
            if arity == 1 {
                unary -= 1;
            }
        }
        sequence.extend(std::iter::repeat_n(1, unary));
        Ok(sequence)
    }
}

/// Builds the tree with a FIFO queue: every operator takes its operands from the front of the
/// queue and is pushed to the back; the last node left is the root.
pub fn assemble_formula_tree(
    leaves: Vec<Operator>,
    operators: Vec<Operator>,
) -> Result<FormulaTree, FormulaError> {
    if leaves.is_empty() {
        return Err(FormulaError::Configuration("no leaves given".to_string()));
    }
    let consumed: usize = operators.iter().map(|op| op.arity().saturating_sub(1)).sum();
    if operators.iter().any(|op| op.arity() == 0) || consumed + 1 != leaves.len() {
        return Err(FormulaError::Configuration(format!(
            "{} leaves and {} operators are not balanced",
            leaves.len(),
            operators.len()
        )));
    }
    let mut queue: VecDeque<TreeNode<Operator>> = leaves.into_iter().map(TreeNode::leaf).collect();
    for op in operators {
        let children: Vec<TreeNode<Operator>> = queue.drain(..op.arity()).collect();
        queue.push_back(TreeNode::new(op, children));
    }
    match queue.pop_front() {
        Some(root) => Ok(FormulaTree::new(root)),
        None => Err(FormulaError::Configuration("empty tree".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulas::formula_serializer::serialize;
    use crate::formulas::operators::{BinaryOp, TernaryOp, UnaryOp};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn library() -> Vec<Operator> {
        vec![
            Operator::Unary(UnaryOp::Sin),
            Operator::Binary(BinaryOp::Sum),
            Operator::Binary(BinaryOp::Mul),
            Operator::Ternary(TernaryOp::Ifg0),
        ]
    }

    #[test]
    fn queue_assembly_order() {
        let leaves = vec![
            Operator::variable("x"),
            Operator::variable("y"),
            Operator::constant(2.0),
        ];
        let operators = vec![
            Operator::Binary(BinaryOp::Sum),
            Operator::Unary(UnaryOp::Sin),
            Operator::Binary(BinaryOp::Mul),
        ];
        let tree = assemble_formula_tree(leaves, operators).unwrap();
        // sum x y -> queue [2, sum]; sin 2 -> [sum, sin]; mul sum sin
        assert_eq!(serialize(&tree), "mul sum x y sin 2");
    }

    #[test]
    fn unbalanced_assembly_is_rejected() {
        let leaves = vec![Operator::variable("x"), Operator::variable("y")];
        assert!(assemble_formula_tree(leaves.clone(), vec![]).is_err());
        assert!(
            assemble_formula_tree(leaves, vec![Operator::Ternary(TernaryOp::Ifg0)]).is_err()
        );
        assert!(assemble_formula_tree(vec![], vec![]).is_err());
    }

    #[test]
    fn arity_sequence_consumes_all_leaves() {
        let mut generator = AritySequenceGenerator::new(StdRng::seed_from_u64(5));
        for leaves in 1..12 {
            let sequence = generator.arity_sequence(leaves, 3, 0.3).unwrap();
            let consumed: usize = sequence.iter().map(|a| a - 1).sum();
            assert_eq!(consumed + 1, leaves);
            assert_eq!(sequence.iter().filter(|a| **a == 1).count(), 3);
        }
        assert!(generator.arity_sequence(0, 0, 0.0).is_err());
        assert!(generator.arity_sequence(3, 0, 1.0).is_err());
    }

    #[test]
    fn random_formula_uses_every_dimension() {
        let mut generator = AritySequenceGenerator::new(StdRng::seed_from_u64(9));
        for _ in 0..20 {
            let tree = generator
                .create_random_formula_tree(3, 5, 2, 2, &library())
                .unwrap();
            let mut variables = tree.variables().to_vec();
            variables.sort();
            assert_eq!(variables, vec!["x0", "x1", "x2"]);
            assert!(tree.is_balanced());
            assert_eq!(tree.root().leaf_count(), 7);
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let mut generator = AritySequenceGenerator::new(StdRng::seed_from_u64(1));
        let unary_only = vec![Operator::Unary(UnaryOp::Sin)];
        assert!(generator.create_random_formula_tree(3, 2, 0, 0, &library()).is_err());
        assert!(generator.create_random_formula_tree(1, 1, 0, 0, &[]).is_err());
        assert!(generator.create_random_formula_tree(2, 2, 0, 0, &unary_only).is_err());
        let binary_only = vec![Operator::Binary(BinaryOp::Sum)];
        assert!(generator.create_random_formula_tree(2, 2, 0, 1, &binary_only).is_err());
        assert!(generator.create_random_formula_tree(1, 1, 0, 2, &unary_only).is_ok());
    }
}
