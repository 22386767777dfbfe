//! Operators of formula trees.
//!
//! Closed set of operator kinds: variables and constants (arity 0) and the unary, binary,
//! ternary and quaternary transforms. Every transform is a plain `fn` value; names are printed
//! lower-case and parsed case-insensitively.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UnaryOp {
    Abs,
    Sqrt,
    Cbrt,
    Sin,
    Cos,
    Atan,
    Tanh,
    Pow2,
    Pow3,
    Ln,
    Sinh,
    Cosh,
}

impl UnaryOp {
    pub fn transform(self) -> fn(f64) -> f64 {
        match self {
            UnaryOp::Abs => |a| a.abs(),
            UnaryOp::Sqrt => |a| a.sqrt(),
            UnaryOp::Cbrt => |a| a.cbrt(),
            UnaryOp::Sin => |a| a.sin(),
            UnaryOp::Cos => |a| a.cos(),
            UnaryOp::Atan => |a| a.atan(),
            UnaryOp::Tanh => |a| a.tanh(),
            UnaryOp::Pow2 => |a| a * a,
            UnaryOp::Pow3 => |a| a * a * a,
            UnaryOp::Ln => |a| a.ln(),
            UnaryOp::Sinh => |a| a.sinh(),
            UnaryOp::Cosh => |a| a.cosh(),
        }
    }

    /// unbounded growth or singularities: only reachable under a guard
    pub fn needs_guard(self) -> bool {
        matches!(
            self,
            UnaryOp::Pow2 | UnaryOp::Pow3 | UnaryOp::Ln | UnaryOp::Sinh | UnaryOp::Cosh
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BinaryOp {
    Sum,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    Max,
}

impl BinaryOp {
    pub fn transform(self) -> fn(f64, f64) -> f64 {
        match self {
            BinaryOp::Sum => |a, b| a + b,
            BinaryOp::Sub => |a, b| a - b,
            BinaryOp::Mul => |a, b| a * b,
            BinaryOp::Div => |a, b| a / b,
            BinaryOp::Pow => |a, b| a.powf(b),
            BinaryOp::Mod => |a, b| a % b,
            BinaryOp::Max => |a, b| a.max(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TernaryOp {
    /// a > 0 ? b : c
    Ifg0,
}

impl TernaryOp {
    pub fn transform(self) -> fn(f64, f64, f64) -> f64 {
        match self {
            TernaryOp::Ifg0 => |a, b, c| if a > 0.0 { b } else { c },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum QuaternaryOp {
    /// a > b ? c : d
    Ifg,
}

impl QuaternaryOp {
    pub fn transform(self) -> fn(f64, f64, f64, f64) -> f64 {
        match self {
            QuaternaryOp::Ifg => |a, b, c, d| if a > b { c } else { d },
        }
    }
}

/// Value of a formula tree node
#[derive(Debug, Clone)]
pub enum Operator {
    Variable(String),
    Constant(f64),
    Unary(UnaryOp),
    Binary(BinaryOp),
    Ternary(TernaryOp),
    Quaternary(QuaternaryOp),
}

impl Operator {
    pub fn variable(name: &str) -> Self {
        Operator::Variable(name.to_string())
    }

    pub fn constant(value: f64) -> Self {
        Operator::Constant(value)
    }

    pub fn arity(&self) -> usize {
        match self {
            Operator::Variable(_) | Operator::Constant(_) => 0,
            Operator::Unary(_) => 1,
            Operator::Binary(_) => 2,
            Operator::Ternary(_) => 3,
            Operator::Quaternary(_) => 4,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Operator::Variable(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Operator::Constant(_))
    }

    /// serialized name: variable name, constant value or lower-case operator name
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Applies the operator to already evaluated operands.
    /// Variables have no value of their own and give NaN, so does a short operand list.
    pub fn apply(&self, operands: &[f64]) -> f64 {
        if operands.len() < self.arity() {
            return f64::NAN;
        }
        match self {
            Operator::Variable(_) => f64::NAN,
            Operator::Constant(value) => *value,
            Operator::Unary(op) => op.transform()(operands[0]),
            Operator::Binary(op) => op.transform()(operands[0], operands[1]),
            Operator::Ternary(op) => op.transform()(operands[0], operands[1], operands[2]),
            Operator::Quaternary(op) => {
                op.transform()(operands[0], operands[1], operands[2], operands[3])
            }
        }
    }

    /// every non-leaf operator
    pub fn library() -> Vec<Operator> {
        UnaryOp::iter()
            .map(Operator::Unary)
            .chain(BinaryOp::iter().map(Operator::Binary))
            .chain(TernaryOp::iter().map(Operator::Ternary))
            .chain(QuaternaryOp::iter().map(Operator::Quaternary))
            .collect()
    }

    /// non-leaf operator by name, case-insensitive
    pub fn by_name(name: &str) -> Option<Operator> {
        if let Ok(op) = UnaryOp::from_str(name) {
            return Some(Operator::Unary(op));
        }
        if let Ok(op) = BinaryOp::from_str(name) {
            return Some(Operator::Binary(op));
        }
        if let Ok(op) = TernaryOp::from_str(name) {
            return Some(Operator::Ternary(op));
        }
        QuaternaryOp::from_str(name).ok().map(Operator::Quaternary)
    }

    /// names a variable may take: a letter followed by digits, e.g. `x`, `x12`
    pub fn is_variable_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_digit()),
            _ => false,
        }
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operator::Variable(a), Operator::Variable(b)) => a == b,
            (Operator::Constant(a), Operator::Constant(b)) => a.to_bits() == b.to_bits(),
            (Operator::Unary(a), Operator::Unary(b)) => a == b,
            (Operator::Binary(a), Operator::Binary(b)) => a == b,
            (Operator::Ternary(a), Operator::Ternary(b)) => a == b,
            (Operator::Quaternary(a), Operator::Quaternary(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Operator {}

impl Hash for Operator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Operator::Variable(name) => name.hash(state),
            Operator::Constant(value) => value.to_bits().hash(state),
            Operator::Unary(op) => op.hash(state),
            Operator::Binary(op) => op.hash(state),
            Operator::Ternary(op) => op.hash(state),
            Operator::Quaternary(op) => op.hash(state),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operator::Variable(name) => write!(f, "{}", name),
            // shortest round-trip form, never exponent notation
            Operator::Constant(value) => write!(f, "{}", value),
            Operator::Unary(op) => write!(f, "{}", op),
            Operator::Binary(op) => write!(f, "{}", op),
            Operator::Ternary(op) => write!(f, "{}", op),
            Operator::Quaternary(op) => write!(f, "{}", op),
        }
    }
}
