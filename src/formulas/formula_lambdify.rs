//! Turning a formula tree into Rust closures and evaluating it on coordinate grids.
//!
//! Every node becomes a boxed closure over the closures of its children, so a tree is
//! traversed once and then evaluated many times. Subtrees without variables are evaluated
//! at construction and become constant closures.
use crate::formal_grammar::tree_node::TreeNode;
use crate::formulas::formula_errors::FormulaError;
use crate::formulas::formula_tree::FormulaTree;
use crate::formulas::operators::Operator;
use ndarray::Array2;
use rayon::prelude::*;

/// compiled formula taking one value per variable
pub type LambdifiedFormula = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// grid axis a variable follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAxis {
    X,
    Y,
}

impl FormulaTree {
    /// Compiles the tree; arguments bind positionally to `variables()`.
    pub fn lambdify(&self) -> LambdifiedFormula {
        lambdify_node(self.root(), self.variables())
    }

    /// Evaluates the formula on a `height x width` grid.
    /// `coordinates[i]` gives the axis variable i follows and its values along that axis,
    /// which must have `width` values for X and `height` values for Y.
    /// Domain errors give NaN at the affected points.
    pub fn evaluate_grid(
        &self,
        coordinates: &[(GridAxis, Vec<f64>)],
        width: usize,
        height: usize,
    ) -> Result<Array2<f64>, FormulaError> {
        if coordinates.len() != self.dimensions() {
            return Err(FormulaError::Configuration(format!(
                "formula has {} variables but {} coordinate ranges were given",
                self.dimensions(),
                coordinates.len()
            )));
        }
        for (i, (axis, values)) in coordinates.iter().enumerate() {
            let expected = match axis {
                GridAxis::X => width,
                GridAxis::Y => height,
            };
            if values.len() != expected {
                return Err(FormulaError::Configuration(format!(
                    "range of variable {} has {} values, {:?} axis needs {}",
                    i,
                    values.len(),
                    axis,
                    expected
                )));
            }
        }
        let f = self.lambdify();
        let rows: Vec<Vec<f64>> = (0..height)
            .into_par_iter()
            .map(|row| {
                let mut args = vec![0.0; coordinates.len()];
                (0..width)
                    .map(|column| {
                        for (arg, (axis, values)) in args.iter_mut().zip(coordinates) {
                            *arg = match axis {
                                GridAxis::X => values[column],
                                GridAxis::Y => values[row],
                            };
                        }
                        f(&args)
                    })
                    .collect()
            })
            .collect();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((height, width), flat)
            .map_err(|e| FormulaError::Configuration(format!("grid shape: {}", e)))
    }
}

fn has_variables(node: &TreeNode<Operator>) -> bool {
    node.value.is_variable() || node.children.iter().any(has_variables)
}

fn lambdify_node(node: &TreeNode<Operator>, vars: &[String]) -> LambdifiedFormula {
    if node.children.len() < node.value.arity() {
        return Box::new(|_| f64::NAN);
    }
    if !has_variables(node) {
        let value = FormulaTree::new(node.clone()).evaluate(&[]);
        return Box::new(move |_| value);
    }
    match &node.value {
        Operator::Variable(name) => match vars.iter().position(|v| v == name) {
            Some(index) => Box::new(move |args| args.get(index).copied().unwrap_or(f64::NAN)),
            None => Box::new(|_| f64::NAN),
        },
        Operator::Constant(value) => {
            let value = *value;
            Box::new(move |_| value)
        }
        Operator::Unary(op) => {
            let transform = op.transform();
            let a = lambdify_node(&node.children[0], vars);
            Box::new(move |args| transform(a(args)))
        }
        Operator::Binary(op) => {
            let transform = op.transform();
            let a = lambdify_node(&node.children[0], vars);
            let b = lambdify_node(&node.children[1], vars);
            Box::new(move |args| transform(a(args), b(args)))
        }
        Operator::Ternary(op) => {
            let transform = op.transform();
            let a = lambdify_node(&node.children[0], vars);
            let b = lambdify_node(&node.children[1], vars);
            let c = lambdify_node(&node.children[2], vars);
            Box::new(move |args| transform(a(args), b(args), c(args)))
        }
        Operator::Quaternary(op) => {
            let transform = op.transform();
            let a = lambdify_node(&node.children[0], vars);
            let b = lambdify_node(&node.children[1], vars);
            let c = lambdify_node(&node.children[2], vars);
            let d = lambdify_node(&node.children[3], vars);
            Box::new(move |args| transform(a(args), b(args), c(args), d(args)))
        }
    }
}
