use std::fmt;

/// Errors raised while building or expanding a grammar
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// an alternative rule was built without candidates
    EmptyAlternative(String),
    /// a non-terminal is referenced but no rule defines it
    UndefinedSymbol(String),
    /// weight vector does not match the alternatives or does not sum to 1
    InvalidWeights(String),
    /// no derivation of the symbol ever reaches terminals
    NonTerminating(String),
    /// expansion produced too many nodes or nested too deep
    ExpansionLimit(String),
    /// emitted terminals do not assemble into exactly one tree
    UnbalancedProduction(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::EmptyAlternative(from) => {
                write!(f, "Alternative rule for '{}' has no candidates", from)
            }
            GrammarError::UndefinedSymbol(name) => {
                write!(f, "Symbol '{}' is used but no rule defines it", name)
            }
            GrammarError::InvalidWeights(msg) => write!(f, "Invalid selector weights: {}", msg),
            GrammarError::NonTerminating(name) => {
                write!(f, "Symbol '{}' has no terminating derivation", name)
            }
            GrammarError::ExpansionLimit(msg) => write!(f, "Expansion limit exceeded: {}", msg),
            GrammarError::UnbalancedProduction(msg) => {
                write!(f, "Produced terminals do not form a tree: {}", msg)
            }
        }
    }
}

impl std::error::Error for GrammarError {}
