//! Grammar of formula trees built from an operator/probability configuration.
//!
//! ```text
//! V               -> one of the variables                          uniform
//! C               -> Constant(create_constant())
//! Operand         -> V | C                                         1-cp, cp
//! InfGuard        -> atan | tanh                                   uniform
//! OpOrOperandPair -> (OpNode Operand) | (Operand OpNode)           uniform
//! OpOrVarPair     -> (OpNode OpOrVar) | (OpOrVar OpNode)           uniform
//! OpOrVar         -> OpNode | V                                    1-lp, lp   depth gate
//! RegularPair     -> (OpNode OpNode) | OpOrOperandPair             1-lp, lp   depth gate
//! OpNode          -> V | Op1Node | .. | Op4Node                    arity map  depth gate
//! Op{k}Node       -> {op}Node for every operator of arity k        op weights depth gate
//! absNode         -> abs OpNode                   (sqrt cbrt sin cos atan tanh alike)
//! pow2Node        -> InfGuard pow2 OpNode         (pow3 ln sinh cosh alike)
//! sumNode         -> sum RegularPair              (sub mul alike)
//! divNode         -> (InfGuard div OpNode OpNode) | (div OpOrOperandPair)          depth gate
//! powNode         -> (InfGuard pow RegularPair)
//!                  | pow ((OpNode InfGuard Operand) | (Operand InfGuard OpNode))  both gated
//! modNode         -> mod ((OpNode sum abs OpNode 0.01) | OpOrOperandPair)          depth gate
//! maxNode         -> max OpOrVarPair
//! ifg0Node        -> ifg0 OpNode OpNode OpNode
//! ifgNode         -> ifg OpNode OpNode OpNode OpNode
//! ```
//! cp - constant probability, lp - leaf probability. Operators with probability 0 are dropped
//! before the grammar is built. Without an arity 0 weight the bare variable of `OpNode` is
//! weighted with lp.
use crate::formal_grammar::draw_source::DrawSource;
use crate::formal_grammar::grammar::Grammar;
use crate::formal_grammar::rule::Rule;
use crate::formal_grammar::rule_selector::{RuleSelector, normalize};
use crate::formal_grammar::symbol::Symbol;
use crate::formal_grammar::tree_generator::{MAX_NODES, TreeGenerator};
use crate::formulas::formula_errors::FormulaError;
use crate::formulas::formula_tree::FormulaTree;
use crate::formulas::operators::{BinaryOp, Operator, UnaryOp};
use log::{debug, info};
use rand::Rng;
use std::collections::BTreeMap;

/// start symbol of the formula grammar
pub const START_SYMBOL: &str = "OpNode";
/// offset keeping the divisor of the guarded modulo away from zero
pub const MOD_OFFSET: f64 = 0.01;

/// operators with their relative probabilities, in the order alternatives are listed
pub type OperatorProbabilities = Vec<(Operator, f64)>;

/// Structural settings of formula generation
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaGrammarConfig {
    /// minimum number of nodes on every root-to-leaf path
    pub minimal_depth: usize,
    /// chance to stop a branch early where the grammar offers a leaf
    pub leaf_probability: f64,
    /// chance of a constant among leaf operands
    pub constant_probability: f64,
    /// arity -> relative weight; key 0 is the weight of a bare variable, the leaf probability
    /// when absent
    pub arity_probabilities: BTreeMap<usize, f64>,
}

impl Default for FormulaGrammarConfig {
    fn default() -> Self {
        FormulaGrammarConfig {
            minimal_depth: 8,
            leaf_probability: 0.1,
            constant_probability: 0.2,
            arity_probabilities: BTreeMap::from([
                (0, 0.5),
                (1, 0.3),
                (2, 0.2),
                (3, 0.05),
                (4, 0.05),
            ]),
        }
    }
}

impl FormulaGrammarConfig {
    pub fn validate(&self) -> Result<(), FormulaError> {
        if self.minimal_depth == 0 {
            return Err(FormulaError::Configuration(
                "minimal depth must be at least 1".to_string(),
            ));
        }
        for (name, p) in [
            ("leaf probability", self.leaf_probability),
            ("constant probability", self.constant_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(FormulaError::Configuration(format!(
                    "{} {} is outside [0, 1]",
                    name, p
                )));
            }
        }
        if self
            .arity_probabilities
            .values()
            .any(|p| *p < 0.0 || !p.is_finite())
        {
            return Err(FormulaError::Configuration(
                "arity probabilities must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Keeps the weights of arities that have at least one operator and divides them by their sum,
/// in ascending arity order.
pub fn normalize_arity_probabilities(
    operators: &[Operator],
    arity_probabilities: &BTreeMap<usize, f64>,
) -> Vec<f64> {
    let present: Vec<f64> = arity_probabilities
        .iter()
        .filter(|(arity, _)| operators.iter().any(|op| op.arity() == **arity))
        .map(|(_, p)| *p)
        .collect();
    normalize(&present)
}

fn node_name(op: &Operator) -> String {
    format!("{}Node", op.name())
}

fn arity_node_name(arity: usize) -> String {
    format!("Op{}Node", arity)
}

fn t(op: Operator) -> Symbol<Operator> {
    Symbol::terminal(&op.name(), op)
}

fn n(name: &str) -> Symbol<Operator> {
    Symbol::non_terminal(name)
}

fn either(p: f64) -> Result<RuleSelector, FormulaError> {
    Ok(RuleSelector::weighted(vec![1.0 - p, p])?)
}

/// Builds the formula grammar. Fails on an empty operator set, a set without variables, arity
/// weights missing for a present operator arity or a minimal depth the operators can only reach
/// with more than `MAX_NODES` leaves.
pub fn build_formula_grammar(
    operators: &[(Operator, f64)],
    create_constant: impl FnMut() -> f64 + 'static,
    config: &FormulaGrammarConfig,
) -> Result<Grammar<Operator>, FormulaError> {
    config.validate()?;
    let mut filtered: Vec<(Operator, f64)> = Vec::new();
    for (op, p) in operators {
        if *p < 0.0 || !p.is_finite() {
            return Err(FormulaError::Configuration(format!(
                "probability {} of '{}' is invalid",
                p, op
            )));
        }
        if *p > 0.0 && !op.is_constant() && !filtered.iter().any(|(o, _)| o == op) {
            filtered.push((op.clone(), *p));
        }
    }
    if filtered.is_empty() {
        return Err(FormulaError::Configuration(
            "operator set is empty".to_string(),
        ));
    }
    let variables: Vec<Operator> = filtered
        .iter()
        .filter(|(op, _)| op.is_variable())
        .map(|(op, _)| op.clone())
        .collect();
    if variables.is_empty() {
        return Err(FormulaError::Configuration(
            "operator set contains no variable".to_string(),
        ));
    }
    let present: Vec<Operator> = filtered.iter().map(|(op, _)| op.clone()).collect();
    let arities: Vec<usize> = (1..=4)
        .filter(|a| present.iter().any(|op| op.arity() == *a))
        .collect();
    for arity in &arities {
        if !config.arity_probabilities.contains_key(arity) {
            return Err(FormulaError::Configuration(format!(
                "no probability for operators of arity {}",
                arity
            )));
        }
    }
    if let Some(&narrowest) = arities.first() {
        let depth = u32::try_from(config.minimal_depth - 1).unwrap_or(u32::MAX);
        let leaves = narrowest.checked_pow(depth);
        if narrowest > 1 && leaves.is_none_or(|leaves| leaves > MAX_NODES) {
            return Err(FormulaError::Configuration(format!(
                "minimal depth {} needs at least {}^{} leaves when the narrowest operator has \
                 arity {}, more than the limit of {} nodes",
                config.minimal_depth,
                narrowest,
                depth,
                narrowest,
                MAX_NODES
            )));
        }
    }
    let mut arity_probabilities = config.arity_probabilities.clone();
    arity_probabilities
        .entry(0)
        .or_insert(config.leaf_probability);
    let op_node_weights = normalize_arity_probabilities(&present, &arity_probabilities);
    if op_node_weights.iter().any(|w| !w.is_finite()) {
        return Err(FormulaError::Configuration(
            "arity probabilities of the available operators sum to zero".to_string(),
        ));
    }

    let gate = |inner: RuleSelector| RuleSelector::min_depth(config.minimal_depth, inner);
    let leaf_p = config.leaf_probability;
    let atan = Operator::Unary(UnaryOp::Atan);
    let tanh = Operator::Unary(UnaryOp::Tanh);

    let mut rules = vec![
        Rule::or_symbols(
            "V",
            RuleSelector::Uniform,
            variables.iter().cloned().map(t).collect(),
        )?,
        Rule::factory("C", "Constant", {
            let mut create_constant = create_constant;
            move || Operator::constant(create_constant())
        }),
        Rule::or_symbols(
            "Operand",
            either(config.constant_probability)?,
            vec![n("V"), n("C")],
        )?,
        Rule::or_symbols("InfGuard", RuleSelector::Uniform, vec![t(atan), t(tanh)])?,
        Rule::or(
            "OpOrOperandPair",
            RuleSelector::Uniform,
            vec![
                Rule::seq(vec![n("OpNode"), n("Operand")]),
                Rule::seq(vec![n("Operand"), n("OpNode")]),
            ],
        )?,
        Rule::or(
            "OpOrVarPair",
            RuleSelector::Uniform,
            vec![
                Rule::seq(vec![n("OpNode"), n("OpOrVar")]),
                Rule::seq(vec![n("OpOrVar"), n("OpNode")]),
            ],
        )?,
        Rule::or_symbols("OpOrVar", gate(either(leaf_p)?), vec![n("OpNode"), n("V")])?,
        Rule::or(
            "RegularPair",
            gate(either(leaf_p)?),
            vec![
                Rule::seq(vec![n("OpNode"), n("OpNode")]),
                Rule::seq(vec![n("OpOrOperandPair")]),
            ],
        )?,
    ];

    let mut op_node_alternatives = vec![n("V")];
    op_node_alternatives.extend(arities.iter().map(|a| n(&arity_node_name(*a))));
    rules.push(Rule::or_symbols(
        START_SYMBOL,
        gate(RuleSelector::weighted(op_node_weights)?),
        op_node_alternatives,
    )?);

    for arity in &arities {
        let members: Vec<&(Operator, f64)> =
            filtered.iter().filter(|(op, _)| op.arity() == *arity).collect();
        let weights = normalize(&members.iter().map(|(_, p)| *p).collect::<Vec<f64>>());
        rules.push(Rule::or_symbols(
            &arity_node_name(*arity),
            gate(RuleSelector::weighted(weights)?),
            members.iter().map(|(op, _)| n(&node_name(op))).collect(),
        )?);
    }

    for (op, _) in filtered.iter().filter(|(op, _)| op.arity() > 0) {
        rules.push(operator_rule(op, config)?);
    }
    let grammar = Grammar::new(rules);
    debug!("formula grammar:\n{}", grammar);
    Ok(grammar)
}

// production of one operator under its own node symbol
fn operator_rule(op: &Operator, config: &FormulaGrammarConfig) -> Result<Rule<Operator>, FormulaError> {
    let name = node_name(op);
    let gate = |inner: RuleSelector| RuleSelector::min_depth(config.minimal_depth, inner);
    let leaf_p = config.leaf_probability;
    let rule = match op {
        Operator::Unary(unary) if unary.needs_guard() => {
            Rule::new(&name, vec![n("InfGuard"), t(op.clone()), n("OpNode")])
        }
        Operator::Unary(_) => Rule::new(&name, vec![t(op.clone()), n("OpNode")]),
        Operator::Binary(BinaryOp::Sum | BinaryOp::Sub | BinaryOp::Mul) => {
            Rule::new(&name, vec![t(op.clone()), n("RegularPair")])
        }
        Operator::Binary(BinaryOp::Div) => Rule::or(
            &name,
            gate(either(leaf_p)?),
            vec![
                Rule::seq(vec![n("InfGuard"), t(op.clone()), n("OpNode"), n("OpNode")]),
                Rule::seq(vec![t(op.clone()), n("OpOrOperandPair")]),
            ],
        )?,
        Operator::Binary(BinaryOp::Pow) => Rule::or(
            &name,
            gate(either(leaf_p)?),
            vec![
                Rule::seq(vec![n("InfGuard"), t(op.clone()), n("RegularPair")]),
                Rule::and(
                    "",
                    vec![
                        Rule::seq(vec![t(op.clone())]),
                        Rule::or(
                            "",
                            gate(RuleSelector::Uniform),
                            vec![
                                Rule::seq(vec![n("OpNode"), n("InfGuard"), n("Operand")]),
                                Rule::seq(vec![n("Operand"), n("InfGuard"), n("OpNode")]),
                            ],
                        )?,
                    ],
                ),
            ],
        )?,
        Operator::Binary(BinaryOp::Mod) => Rule::and(
            &name,
            vec![
                Rule::seq(vec![t(op.clone())]),
                Rule::or(
                    "",
                    gate(either(leaf_p)?),
                    vec![
                        Rule::seq(vec![
                            n("OpNode"),
                            t(Operator::Binary(BinaryOp::Sum)),
                            t(Operator::Unary(UnaryOp::Abs)),
                            n("OpNode"),
                            t(Operator::constant(MOD_OFFSET)),
                        ]),
                        Rule::seq(vec![n("OpOrOperandPair")]),
                    ],
                )?,
            ],
        ),
        Operator::Binary(BinaryOp::Max) => Rule::new(&name, vec![t(op.clone()), n("OpOrVarPair")]),
        Operator::Ternary(_) => Rule::new(
            &name,
            vec![t(op.clone()), n("OpNode"), n("OpNode"), n("OpNode")],
        ),
        Operator::Quaternary(_) => Rule::new(
            &name,
            vec![t(op.clone()), n("OpNode"), n("OpNode"), n("OpNode"), n("OpNode")],
        ),
        Operator::Variable(_) | Operator::Constant(_) => {
            return Err(FormulaError::Configuration(format!(
                "'{}' is not an operator",
                op
            )));
        }
    };
    Ok(rule)
}

/// Random constant within `[low, high)` rounded to 2 decimals; values closer to zero than 0.01
/// become 0.01.
pub fn create_constant<R: Rng + ?Sized>(bounds: (f64, f64), rng: &mut R) -> f64 {
    let (low, high) = bounds;
    let value = if low < high {
        rng.random_range(low..high)
    } else {
        low
    };
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.abs() < MOD_OFFSET {
        MOD_OFFSET
    } else {
        rounded
    }
}

/// Builds the grammar for the configuration and expands it into one formula tree.
pub fn generate_formula_tree(
    operators: &[(Operator, f64)],
    create_constant: impl FnMut() -> f64 + 'static,
    config: &FormulaGrammarConfig,
    draws: &mut dyn DrawSource,
) -> Result<FormulaTree, FormulaError> {
    let grammar = build_formula_grammar(operators, create_constant, config)?;
    info!(
        "generating formula: {} rules, minimal depth {}",
        grammar.len(),
        config.minimal_depth
    );
    let mut generator = TreeGenerator::new(&grammar, Operator::arity)?;
    let root = generator.generate(START_SYMBOL, draws)?;
    let tree = FormulaTree::new(root);
    debug!("generated formula: {}", tree);
    Ok(tree)
}
