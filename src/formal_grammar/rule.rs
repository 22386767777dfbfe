use crate::formal_grammar::grammar_errors::GrammarError;
use crate::formal_grammar::rule_selector::RuleSelector;
use crate::formal_grammar::symbol::Symbol;
use std::cell::RefCell;
use std::fmt;

/// factory producing a fresh terminal value at each use
pub type TerminalFactory<T> = RefCell<Box<dyn FnMut() -> T>>;

/// Production rule of a grammar.
/// * `Production` - from-symbol expands into a fixed symbol sequence
/// * `Factory` - from-symbol expands into one terminal computed at each use
/// * `Or` - one of the alternatives, picked by the selector
/// * `And` - the productions of all parts, in order
pub enum Rule<T> {
    Production {
        from: String,
        symbols: Vec<Symbol<T>>,
    },
    Factory {
        from: String,
        terminal_name: String,
        factory: TerminalFactory<T>,
    },
    Or {
        from: String,
        alternatives: Vec<Rule<T>>,
        selector: RuleSelector,
    },
    And {
        from: String,
        parts: Vec<Rule<T>>,
    },
}

impl<T> Rule<T> {
    pub fn new(from: &str, symbols: Vec<Symbol<T>>) -> Self {
        Rule::Production {
            from: from.to_string(),
            symbols,
        }
    }

    /// anonymous production used as an alternative or a part of a composite rule
    pub fn seq(symbols: Vec<Symbol<T>>) -> Self {
        Rule::new("", symbols)
    }

    pub fn factory(from: &str, terminal_name: &str, factory: impl FnMut() -> T + 'static) -> Self {
        Rule::Factory {
            from: from.to_string(),
            terminal_name: terminal_name.to_string(),
            factory: RefCell::new(Box::new(factory)),
        }
    }

    /// Alternative rule. Fails on zero candidates or when a weighted selector was built for a
    /// different number of alternatives.
    pub fn or(
        from: &str,
        selector: RuleSelector,
        alternatives: Vec<Rule<T>>,
    ) -> Result<Self, GrammarError> {
        if alternatives.is_empty() {
            return Err(GrammarError::EmptyAlternative(from.to_string()));
        }
        if let Some(expected) = selector.expected_alternatives() {
            if expected != alternatives.len() {
                return Err(GrammarError::InvalidWeights(format!(
                    "'{}' has {} alternatives but {} weights",
                    from,
                    alternatives.len(),
                    expected
                )));
            }
        }
        let alternatives = alternatives
            .into_iter()
            .map(|alternative| alternative.renamed(from))
            .collect();
        Ok(Rule::Or {
            from: from.to_string(),
            alternatives,
            selector,
        })
    }

    /// alternative rule where each candidate is a single symbol
    pub fn or_symbols(
        from: &str,
        selector: RuleSelector,
        symbols: Vec<Symbol<T>>,
    ) -> Result<Self, GrammarError> {
        let alternatives = symbols.into_iter().map(|s| Rule::seq(vec![s])).collect();
        Rule::or(from, selector, alternatives)
    }

    pub fn and(from: &str, parts: Vec<Rule<T>>) -> Self {
        Rule::And {
            from: from.to_string(),
            parts: parts.into_iter().map(|part| part.renamed(from)).collect(),
        }
    }

    pub fn from(&self) -> &str {
        match self {
            Rule::Production { from, .. }
            | Rule::Factory { from, .. }
            | Rule::Or { from, .. }
            | Rule::And { from, .. } => from,
        }
    }

    // anonymous sub-rules take the name of the rule they belong to
    fn renamed(mut self, name: &str) -> Self {
        match &mut self {
            Rule::Production { from, .. }
            | Rule::Factory { from, .. }
            | Rule::Or { from, .. }
            | Rule::And { from, .. } => {
                if from.is_empty() {
                    *from = name.to_string();
                }
            }
        }
        self
    }

    /// names of all non-terminals the rule can expand into
    pub fn referenced_names(&self) -> Vec<&str> {
        match self {
            Rule::Production { symbols, .. } => symbols
                .iter()
                .filter(|s| !s.is_terminal())
                .map(|s| s.name.as_str())
                .collect(),
            Rule::Factory { .. } => Vec::new(),
            Rule::Or { alternatives, .. } => alternatives
                .iter()
                .flat_map(|rule| rule.referenced_names())
                .collect(),
            Rule::And { parts, .. } => parts.iter().flat_map(|rule| rule.referenced_names()).collect(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rule::Production { from, symbols } => f
                .debug_struct("Production")
                .field("from", from)
                .field("symbols", symbols)
                .finish(),
            Rule::Factory {
                from, terminal_name, ..
            } => f
                .debug_struct("Factory")
                .field("from", from)
                .field("terminal_name", terminal_name)
                .finish(),
            Rule::Or {
                from,
                alternatives,
                selector,
            } => f
                .debug_struct("Or")
                .field("from", from)
                .field("alternatives", alternatives)
                .field("selector", selector)
                .finish(),
            Rule::And { from, parts } => f
                .debug_struct("And")
                .field("from", from)
                .field("parts", parts)
                .finish(),
        }
    }
}

/// `from -> a b | c` style rendering of the rule
impl<T> fmt::Display for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> ", self.from())?;
        self.fmt_body(f)
    }
}

impl<T> Rule<T> {
    fn fmt_body(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rule::Production { symbols, .. } => {
                let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
                write!(f, "{}", names.join(" "))
            }
            Rule::Factory { terminal_name, .. } => write!(f, "{}()", terminal_name),
            Rule::Or { alternatives, .. } => {
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "(")?;
                    alternative.fmt_body(f)?;
                    write!(f, ")")?;
                }
                Ok(())
            }
            Rule::And { parts, .. } => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    part.fmt_body(f)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str) -> Symbol<String> {
        Symbol::terminal(name, name.to_string())
    }

    fn n(name: &str) -> Symbol<String> {
        Symbol::non_terminal(name)
    }

    #[test]
    fn empty_alternative_fails() {
        let rule: Result<Rule<String>, _> = Rule::or("A", RuleSelector::Uniform, vec![]);
        assert_eq!(
            rule.err(),
            Some(GrammarError::EmptyAlternative("A".to_string()))
        );
    }

    #[test]
    fn weights_must_match_alternatives() {
        let selector = RuleSelector::weighted(vec![0.5, 0.5]).unwrap();
        let rule = Rule::or_symbols("A", selector, vec![t("a"), t("b"), t("c")]);
        assert!(matches!(rule, Err(GrammarError::InvalidWeights(_))));
    }

    #[test]
    fn sub_rules_take_parent_name() {
        let rule = Rule::and("P", vec![Rule::seq(vec![t("pow")]), Rule::seq(vec![n("A")])]);
        if let Rule::And { parts, .. } = &rule {
            assert!(parts.iter().all(|p| p.from() == "P"));
        } else {
            panic!("expected sequence rule");
        }
        assert_eq!(rule.referenced_names(), vec!["A"]);
    }

    #[test]
    fn display() {
        let rule = Rule::or(
            "D",
            RuleSelector::Uniform,
            vec![
                Rule::seq(vec![n("G"), t("div"), n("Op"), n("Op")]),
                Rule::seq(vec![t("div"), n("Pair")]),
            ],
        )
        .unwrap();
        assert_eq!(format!("{}", rule), "D -> (G div Op Op) | (div Pair)");
        let factory: Rule<String> = Rule::factory("C", "const", || "1".to_string());
        assert_eq!(format!("{}", factory), "C -> const()");
    }
}
