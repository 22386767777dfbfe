use crate::formal_grammar::grammar_errors::GrammarError;

/// Node of a generated tree, exclusively owning its children
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    pub value: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    pub fn new(value: T, children: Vec<TreeNode<T>>) -> Self {
        TreeNode { value, children }
    }

    pub fn leaf(value: T) -> Self {
        TreeNode {
            value,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Builds a tree from values listed in prefix order, each taking `arity(value)` children.
    /// Fails unless the values form exactly one tree.
    pub fn from_prefix(values: Vec<T>, arity: impl Fn(&T) -> usize) -> Result<Self, GrammarError> {
        let total = values.len();
        let mut stack: Vec<TreeNode<T>> = Vec::new();
        for value in values.into_iter().rev() {
            let k = arity(&value);
            if stack.len() < k {
                return Err(GrammarError::UnbalancedProduction(format!(
                    "node needs {} children but only {} are left",
                    k,
                    stack.len()
                )));
            }
            let children: Vec<TreeNode<T>> = (0..k).filter_map(|_| stack.pop()).collect();
            stack.push(TreeNode::new(value, children));
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(root), true) => Ok(root),
            (None, _) => Err(GrammarError::UnbalancedProduction(
                "no terminals were produced".to_string(),
            )),
            (Some(_), false) => Err(GrammarError::UnbalancedProduction(format!(
                "{} values leave {} separate trees",
                total,
                stack.len() + 1
            ))),
        }
    }

    /// values in prefix (depth-first, left-to-right) order
    pub fn prefix_values(&self) -> Vec<&T> {
        let mut values = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            values.push(&node.value);
            stack.extend(node.children.iter().rev());
        }
        values
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(|c| c.leaf_count()).sum()
        }
    }

    /// number of nodes on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(|c| c.height()).max().unwrap_or(0)
    }

    /// number of nodes on the shortest root-to-leaf path
    pub fn min_leaf_depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.min_leaf_depth())
            .min()
            .unwrap_or(0)
    }

    /// Σ (children − 1) over internal nodes, plus one; equals the leaf count of any tree
    pub fn balance(&self) -> usize {
        let mut balance: isize = 1;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if !node.is_leaf() {
                balance += node.children.len() as isize - 1;
            }
            stack.extend(node.children.iter());
        }
        balance.max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arity(v: &&str) -> usize {
        match *v {
            "f" => 2,
            "g" => 1,
            "h" => 3,
            _ => 0,
        }
    }

    #[test]
    fn from_prefix_builds_tree() {
        let tree = TreeNode::from_prefix(vec!["f", "g", "a", "h", "b", "c", "d"], arity).unwrap();
        assert_eq!(tree.value, "f");
        assert_eq!(tree.children[0].value, "g");
        assert_eq!(tree.children[0].children[0].value, "a");
        let h = &tree.children[1];
        let leaves: Vec<&str> = h.children.iter().map(|c| c.value).collect();
        assert_eq!(leaves, vec!["b", "c", "d"]);
        assert_eq!(
            tree.prefix_values().into_iter().copied().collect::<Vec<_>>(),
            vec!["f", "g", "a", "h", "b", "c", "d"]
        );
    }

    #[test]
    fn tree_measures() {
        let tree = TreeNode::from_prefix(vec!["f", "g", "g", "a", "b"], arity).unwrap();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.balance(), 2);
        assert_eq!(tree.height(), 4);
        assert_eq!(tree.min_leaf_depth(), 2);
    }

    #[test]
    fn unbalanced_prefix_fails() {
        assert!(TreeNode::from_prefix(vec!["f", "a"], arity).is_err());
        assert!(TreeNode::from_prefix(vec!["a", "b"], arity).is_err());
        assert!(TreeNode::from_prefix(Vec::<&str>::new(), arity).is_err());
    }
}
