//! Static analysis of a grammar used by the generator.
//!
//! For every non-terminal two facts are derived by fixpoint iteration:
//! * skeleton - the net effect of the symbol on the open child slots of the tree being built,
//!   e.g. `[0]` for a complete subtree, `[0, 0]` for two sibling subtrees, `[1]` for a unary
//!   node whose operand comes from the following symbols
//! * reach - how deep below its first node the symbol can keep its shallowest leaf; capped, the
//!   cap stands for "unbounded". Depth-gated choices count with their deepest alternative, since
//!   the gate steers them, any other choice counts with its shallowest one
//!
//! A symbol without a skeleton has no terminating derivation.
use crate::formal_grammar::grammar::Grammar;
use crate::formal_grammar::grammar_errors::GrammarError;
use crate::formal_grammar::rule::Rule;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
enum Item<'a> {
    Terminal(usize),
    NonTerminal(&'a str),
}

#[derive(Debug, Clone)]
pub struct GrammarAnalysis {
    skeletons: HashMap<String, Vec<usize>>,
    reach: HashMap<String, usize>,
    cap: usize,
}

impl GrammarAnalysis {
    /// `cap` bounds the computed reach, usually the largest enforced minimum depth
    pub fn new<T>(
        grammar: &Grammar<T>,
        arity: &dyn Fn(&T) -> usize,
        cap: usize,
    ) -> Result<Self, GrammarError> {
        let mut names: Vec<&str> = Vec::new();
        for rule in grammar.rules() {
            if !names.contains(&rule.from()) {
                names.push(rule.from());
            }
            for referenced in rule.referenced_names() {
                if !grammar.contains(referenced) {
                    return Err(GrammarError::UndefinedSymbol(referenced.to_string()));
                }
            }
        }
        let mut flat: HashMap<&str, Vec<Vec<Item>>> = HashMap::new();
        for name in &names {
            flat.insert(*name, sequences(grammar.rule(name)?, arity));
        }

        let mut analysis = GrammarAnalysis {
            skeletons: HashMap::new(),
            reach: HashMap::new(),
            cap,
        };
        loop {
            let mut changed = false;
            for name in &names {
                if analysis.skeletons.contains_key(*name) {
                    continue;
                }
                let found = flat[name].iter().find_map(|seq| analysis.seq_skeleton(seq));
                if let Some(skeleton) = found {
                    analysis.skeletons.insert(name.to_string(), skeleton);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        for name in analysis.skeletons.keys() {
            analysis.reach.insert(name.clone(), 0);
        }
        loop {
            let mut changed = false;
            for name in &names {
                if !analysis.skeletons.contains_key(*name) {
                    continue;
                }
                let value = analysis.rule_reach(grammar.rule(name)?, arity);
                if value > analysis.reach[*name] {
                    analysis.reach.insert(name.to_string(), value);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        Ok(analysis)
    }

    /// fails unless `start` and every symbol reachable from it terminate
    pub fn ensure_terminates<T>(&self, grammar: &Grammar<T>, start: &str) -> Result<(), GrammarError> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut pending = vec![start];
        while let Some(name) = pending.pop() {
            if !visited.insert(name) {
                continue;
            }
            let rule = grammar.rule(name)?;
            if !self.skeletons.contains_key(name) {
                return Err(GrammarError::NonTerminating(name.to_string()));
            }
            pending.extend(rule.referenced_names());
        }
        Ok(())
    }

    pub fn skeleton(&self, name: &str) -> Option<&[usize]> {
        self.skeletons.get(name).map(|s| s.as_slice())
    }

    /// capped reach of a non-terminal, 0 for unknown names
    pub fn reach(&self, name: &str) -> usize {
        self.reach.get(name).copied().unwrap_or(0)
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// capped reach of a rule, e.g. of one alternative of an `Or` rule
    pub fn rule_reach<T>(&self, rule: &Rule<T>, arity: &dyn Fn(&T) -> usize) -> usize {
        let mut slots = Vec::new();
        self.walk(rule, arity, &mut slots)
            .map(|shallowest| shallowest.min(self.cap))
            .unwrap_or(0)
    }

    // Shallowest leaf offset of `rule` placed on top of `slots`, None if it cannot terminate.
    // `slots` is left as the chosen derivation leaves it.
    fn walk<T>(
        &self,
        rule: &Rule<T>,
        arity: &dyn Fn(&T) -> usize,
        slots: &mut Vec<usize>,
    ) -> Option<usize> {
        match rule {
            Rule::Production { symbols, .. } => {
                let mut shallowest = self.cap;
                for symbol in symbols {
                    let offset = slots.len();
                    match &symbol.value {
                        Some(value) => {
                            let a = arity(value);
                            if a == 0 {
                                shallowest = shallowest.min(offset);
                            }
                            place_node(slots, a);
                        }
                        None => {
                            let skeleton = self.skeletons.get(symbol.name.as_str())?;
                            shallowest = shallowest.min(offset + self.reach(&symbol.name));
                            for a in skeleton {
                                place_node(slots, *a);
                            }
                        }
                    }
                }
                Some(shallowest)
            }
            Rule::Factory { .. } => {
                let offset = slots.len();
                place_node(slots, 0);
                Some(offset)
            }
            Rule::And { parts, .. } => {
                let mut shallowest = self.cap;
                for part in parts {
                    shallowest = shallowest.min(self.walk(part, arity, slots)?);
                }
                Some(shallowest)
            }
            Rule::Or {
                alternatives,
                selector,
                ..
            } => {
                let outcomes = alternatives.iter().filter_map(|alternative| {
                    let mut after = slots.clone();
                    self.walk(alternative, arity, &mut after)
                        .map(|shallowest| (shallowest.min(self.cap), after))
                });
                let chosen = if selector.enforced_depth() > 0 {
                    outcomes.max_by_key(|(shallowest, _)| *shallowest)
                } else {
                    outcomes.min_by_key(|(shallowest, _)| *shallowest)
                };
                let (shallowest, after) = chosen?;
                *slots = after;
                Some(shallowest)
            }
        }
    }

    fn seq_skeleton(&self, seq: &[Item]) -> Option<Vec<usize>> {
        let mut arities = Vec::new();
        for item in seq {
            match item {
                Item::Terminal(a) => arities.push(*a),
                Item::NonTerminal(name) => arities.extend(self.skeletons.get(*name)?),
            }
        }
        Some(reduce_skeleton(arities))
    }
}

/// Places a node with `arity` children into the open slots of the tree under construction.
/// `slots` holds the number of missing children of every open ancestor, its length is the depth
/// offset of the next node.
pub fn place_node(slots: &mut Vec<usize>, arity: usize) {
    if let Some(top) = slots.last_mut() {
        *top = top.saturating_sub(1);
    }
    if arity > 0 {
        slots.push(arity);
    } else {
        while slots.last() == Some(&0) {
            slots.pop();
        }
    }
}

// collapses every "k followed by k complete subtrees" into one complete subtree
fn reduce_skeleton(mut arities: Vec<usize>) -> Vec<usize> {
    loop {
        let position = (0..arities.len()).find(|&i| {
            let k = arities[i];
            k > 0 && i + k < arities.len() && arities[i + 1..=i + k].iter().all(|a| *a == 0)
        });
        match position {
            Some(i) => {
                let k = arities[i];
                arities = arities[..i]
                    .iter()
                    .chain(std::iter::once(&0))
                    .chain(arities[i + k + 1..].iter())
                    .copied()
                    .collect();
            }
            None => return arities,
        }
    }
}

// every flat symbol sequence the rule can produce, alternatives unfolded
fn sequences<'a, T>(rule: &'a Rule<T>, arity: &dyn Fn(&T) -> usize) -> Vec<Vec<Item<'a>>> {
    match rule {
        Rule::Production { symbols, .. } => vec![
            symbols
                .iter()
                .map(|s| match &s.value {
                    Some(value) => Item::Terminal(arity(value)),
                    None => Item::NonTerminal(s.name.as_str()),
                })
                .collect(),
        ],
        Rule::Factory { .. } => vec![vec![Item::Terminal(0)]],
        Rule::Or { alternatives, .. } => alternatives
            .iter()
            .flat_map(|alternative| sequences(alternative, arity))
            .collect(),
        Rule::And { parts, .. } => {
            if parts.is_empty() {
                return vec![Vec::new()];
            }
            parts
                .iter()
                .map(|part| sequences(part, arity))
                .multi_cartesian_product()
                .map(|combination| combination.concat())
                .collect()
        }
    }
}
