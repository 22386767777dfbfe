//! Generated formula: an owned operator tree plus its variable inventory.
use crate::formal_grammar::tree_node::TreeNode;
use crate::formulas::operators::Operator;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct FormulaTree {
    root: TreeNode<Operator>,
    variables: Vec<String>,
}

impl FormulaTree {
    pub fn new(root: TreeNode<Operator>) -> Self {
        let mut variables: Vec<String> = Vec::new();
        for value in root.prefix_values() {
            if let Operator::Variable(name) = value {
                if !variables.contains(name) {
                    variables.push(name.clone());
                }
            }
        }
        FormulaTree { root, variables }
    }

    pub fn root(&self) -> &TreeNode<Operator> {
        &self.root
    }

    /// distinct variables in order of first occurrence, evaluation binds values positionally
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn dimensions(&self) -> usize {
        self.variables.len()
    }

    /// Evaluates the formula for one value per variable.
    /// Missing values and domain errors give NaN.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.evaluate_node(&self.root, values)
    }

    fn evaluate_node(&self, node: &TreeNode<Operator>, values: &[f64]) -> f64 {
        match &node.value {
            Operator::Variable(name) => self
                .variables
                .iter()
                .position(|v| v == name)
                .and_then(|i| values.get(i).copied())
                .unwrap_or(f64::NAN),
            Operator::Constant(value) => *value,
            op => {
                let operands: Vec<f64> = node
                    .children
                    .iter()
                    .map(|child| self.evaluate_node(child, values))
                    .collect();
                op.apply(&operands)
            }
        }
    }

    /// number of nodes on the shortest root-to-leaf path
    pub fn min_depth(&self) -> usize {
        self.root.min_leaf_depth()
    }

    pub fn height(&self) -> usize {
        self.root.height()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// every node has as many children as its arity and the leaf count equals
    /// 1 + Σ(arity − 1) over internal nodes
    pub fn is_balanced(&self) -> bool {
        let mut expected_leaves: isize = 1;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            let arity = node.value.arity();
            if node.children.len() != arity {
                return false;
            }
            if arity > 0 {
                expected_leaves += arity as isize - 1;
            }
            stack.extend(node.children.iter());
        }
        self.root.leaf_count() as isize == expected_leaves
    }
}

/// space separated prefix notation
impl fmt::Display for FormulaTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<String> = self.root.prefix_values().iter().map(|op| op.name()).collect();
        write!(f, "{}", names.join(" "))
    }
}
