//! # Formulas
//!
//! Formula trees over real-valued variables built on top of `formal_grammar`.
//!
//! * `operators` - the operator library (variables, constants, unary..quaternary functions)
//! * `formula_tree` - tree wrapper with direct evaluation and structural queries
//! * `formula_lambdify` - closures and parallel grid evaluation
//! * `formula_grammar` - the grammar that produces well-behaved random formulas
//! * `formula_serializer` - prefix text form, e.g. `sum sin x0 mul x1 2.5`
//! * `arity_sequence_generator` - older generator without depth control
//!
//! ```
//! use RustedWallpaper::formulas::formula_serializer::deserialize;
//! let formula = deserialize("sum sin x mul y 2").unwrap();
//! assert_eq!(formula.evaluate(&[0.0, 3.0]), 6.0);
//! ```
pub mod arity_sequence_generator;
pub mod formula_errors;
pub mod formula_grammar;
mod formula_grammar_tests;
pub mod formula_lambdify;
pub mod formula_serializer;
pub mod formula_tree;
pub mod operators;
