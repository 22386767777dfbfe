use crate::formal_grammar::grammar_errors::GrammarError;
use crate::formal_grammar::rule::Rule;
use log::warn;
use std::collections::HashMap;
use std::fmt;

/// Ordered collection of rules, looked up by the name of their from-symbol.
/// Only the first rule defining a name is reachable, duplicates are kept but never merged.
pub struct Grammar<T> {
    rules: Vec<Rule<T>>,
    index: HashMap<String, usize>,
}

impl<T> Grammar<T> {
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        let mut index = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            if index.contains_key(rule.from()) {
                warn!("rule for '{}' defined twice, the first one is used", rule.from());
                continue;
            }
            index.insert(rule.from().to_string(), i);
        }
        Grammar { rules, index }
    }

    pub fn rule(&self, name: &str) -> Result<&Rule<T>, GrammarError> {
        self.index
            .get(name)
            .map(|&i| &self.rules[i])
            .ok_or_else(|| GrammarError::UndefinedSymbol(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// largest minimum depth any selector of the grammar enforces
    pub fn enforced_depth(&self) -> usize {
        fn rule_depth<T>(rule: &Rule<T>) -> usize {
            match rule {
                Rule::Or {
                    alternatives,
                    selector,
                    ..
                } => alternatives
                    .iter()
                    .map(rule_depth)
                    .max()
                    .unwrap_or(0)
                    .max(selector.enforced_depth()),
                Rule::And { parts, .. } => parts.iter().map(rule_depth).max().unwrap_or(0),
                _ => 0,
            }
        }
        self.rules.iter().map(rule_depth).max().unwrap_or(0)
    }
}

impl<T> fmt::Display for Grammar<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}
