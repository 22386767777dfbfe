use crate::formal_grammar::grammar_errors::GrammarError;
use std::fmt;

/// Errors of formula generation, parsing and rendering
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaError {
    /// invalid input detected before any generation work
    Configuration(String),
    /// grammar could not be expanded
    Grammar(GrammarError),
    /// malformed serialized text
    Parse(String),
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormulaError::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            FormulaError::Grammar(err) => write!(f, "Grammar error: {}", err),
            FormulaError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for FormulaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormulaError::Grammar(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GrammarError> for FormulaError {
    fn from(err: GrammarError) -> Self {
        FormulaError::Grammar(err)
    }
}
