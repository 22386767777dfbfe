//! Recursive-descent expansion of a grammar into a tree.
//!
//! Expansion is depth-first and left-to-right over each chosen right-hand side. Terminals are
//! emitted in prefix order while a stack of open child slots tracks the depth of the next node,
//! which is what the minimum-depth selectors look at. The emitted prefix sequence is assembled
//! into a `TreeNode` with the arity function at the end.
use crate::formal_grammar::draw_source::DrawSource;
use crate::formal_grammar::grammar::Grammar;
use crate::formal_grammar::grammar_analysis::{GrammarAnalysis, place_node};
use crate::formal_grammar::grammar_errors::GrammarError;
use crate::formal_grammar::rule::Rule;
use crate::formal_grammar::tree_node::TreeNode;
use log::debug;

/// upper bound on emitted terminals per tree
pub const MAX_NODES: usize = 100_000;
/// upper bound on nested rule expansions
pub const MAX_NESTING: usize = 1_000;

pub struct TreeGenerator<'g, T, A>
where
    A: Fn(&T) -> usize,
{
    grammar: &'g Grammar<T>,
    arity: A,
    analysis: GrammarAnalysis,
    slots: Vec<usize>,
    emitted: Vec<T>,
    nesting: usize,
}

impl<'g, T: Clone, A: Fn(&T) -> usize> TreeGenerator<'g, T, A> {
    pub fn new(grammar: &'g Grammar<T>, arity: A) -> Result<Self, GrammarError> {
        let cap = grammar.enforced_depth().max(1);
        let analysis = GrammarAnalysis::new(grammar, &arity, cap)?;
        Ok(TreeGenerator {
            grammar,
            arity,
            analysis,
            slots: Vec::new(),
            emitted: Vec::new(),
            nesting: 0,
        })
    }

    pub fn analysis(&self) -> &GrammarAnalysis {
        &self.analysis
    }

    /// expands `start` into one tree
    pub fn generate(
        &mut self,
        start: &str,
        draws: &mut dyn DrawSource,
    ) -> Result<TreeNode<T>, GrammarError> {
        self.analysis.ensure_terminates(self.grammar, start)?;
        self.slots.clear();
        self.emitted.clear();
        self.nesting = 0;
        let grammar = self.grammar;
        self.expand(grammar.rule(start)?, draws)?;
        let values = std::mem::take(&mut self.emitted);
        debug!("expanded '{}' into {} nodes", start, values.len());
        TreeNode::from_prefix(values, &self.arity)
    }

    fn expand(&mut self, rule: &'g Rule<T>, draws: &mut dyn DrawSource) -> Result<(), GrammarError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(GrammarError::ExpansionLimit(format!(
                "more than {} nested expansions under '{}'",
                MAX_NESTING,
                rule.from()
            )));
        }
        let result = self.expand_rule(rule, draws);
        self.nesting -= 1;
        result
    }

    fn expand_rule(&mut self, rule: &'g Rule<T>, draws: &mut dyn DrawSource) -> Result<(), GrammarError> {
        let grammar = self.grammar;
        match rule {
            Rule::Production { symbols, .. } => {
                for symbol in symbols {
                    match &symbol.value {
                        Some(value) => self.emit(value.clone())?,
                        None => self.expand(grammar.rule(&symbol.name)?, draws)?,
                    }
                }
                Ok(())
            }
            Rule::Factory { factory, .. } => {
                let value = {
                    let mut create = factory.borrow_mut();
                    (*create)()
                };
                self.emit(value)
            }
            Rule::Or {
                alternatives,
                selector,
                ..
            } => {
                let depth = self.slots.len() + 1;
                let chosen = {
                    let analysis = &self.analysis;
                    let arity = &self.arity;
                    let reach = |i: usize| analysis.rule_reach(&alternatives[i], arity);
                    selector.select(alternatives.len(), depth, &reach, draws)
                };
                self.expand(&alternatives[chosen], draws)
            }
            Rule::And { parts, .. } => {
                for part in parts {
                    self.expand(part, draws)?;
                }
                Ok(())
            }
        }
    }

    fn emit(&mut self, value: T) -> Result<(), GrammarError> {
        if self.emitted.len() >= MAX_NODES {
            return Err(GrammarError::ExpansionLimit(format!(
                "more than {} nodes emitted",
                MAX_NODES
            )));
        }
        place_node(&mut self.slots, (self.arity)(&value));
        self.emitted.push(value);
        Ok(())
    }
}

/// one-shot generation of a tree from `start`
pub fn generate_tree<T: Clone>(
    grammar: &Grammar<T>,
    start: &str,
    arity: impl Fn(&T) -> usize,
    draws: &mut dyn DrawSource,
) -> Result<TreeNode<T>, GrammarError> {
    TreeGenerator::new(grammar, arity)?.generate(start, draws)
}
