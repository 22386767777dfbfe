use std::fmt;

/// Grammar symbol. Terminals carry a value, non-terminals are bare names.
/// Equality and hashing go by (name, value).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol<T> {
    pub name: String,
    pub value: Option<T>,
}

impl<T> Symbol<T> {
    pub fn terminal(name: &str, value: T) -> Self {
        Symbol {
            name: name.to_string(),
            value: Some(value),
        }
    }

    pub fn non_terminal(name: &str) -> Self {
        Symbol {
            name: name.to_string(),
            value: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> fmt::Display for Symbol<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn terminal_and_non_terminal() {
        let t = Symbol::terminal("x", 1);
        let n: Symbol<i32> = Symbol::non_terminal("V");
        assert!(t.is_terminal());
        assert!(!n.is_terminal());
        assert_eq!(format!("{}", n), "V");
    }

    #[test]
    fn equality_by_name_and_value() {
        let mut set = HashSet::new();
        set.insert(Symbol::terminal("a", 1));
        set.insert(Symbol::terminal("a", 1));
        set.insert(Symbol::terminal("a", 2));
        set.insert(Symbol::non_terminal("a"));
        assert_eq!(set.len(), 3);
    }
}
