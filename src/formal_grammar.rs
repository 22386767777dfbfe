//! # Formal grammar
//!
//! Generic machinery to grow random trees from a context-free-like grammar.
//!
//! * `symbol` - terminals carrying a value and bare non-terminals
//! * `rule` - plain productions, factories, alternatives (`Or`) and sequences (`And`)
//! * `rule_selector` - uniform, weighted and minimum-depth selection policies
//! * `grammar` - ordered rule collection looked up by from-symbol
//! * `grammar_analysis` - skeleton/reach analysis behind the minimum-depth gate
//! * `tree_generator` - depth-first expansion into a `TreeNode`
//! * `draw_source` - uniform draws from any `rand::Rng` or a scripted replay
//!
//! # Example
//! ```
//! use RustedWallpaper::formal_grammar::grammar::Grammar;
//! use RustedWallpaper::formal_grammar::rule::Rule;
//! use RustedWallpaper::formal_grammar::rule_selector::RuleSelector;
//! use RustedWallpaper::formal_grammar::symbol::Symbol;
//! use RustedWallpaper::formal_grammar::tree_generator::generate_tree;
//! use RustedWallpaper::formal_grammar::draw_source::ScriptedDraws;
//! // E -> x | neg E, at least 3 levels deep
//! let grammar = Grammar::new(vec![
//!     Rule::or(
//!         "E",
//!         RuleSelector::min_depth(3, RuleSelector::Uniform),
//!         vec![
//!             Rule::seq(vec![Symbol::terminal("x", 0usize)]),
//!             Rule::seq(vec![Symbol::terminal("neg", 1usize), Symbol::non_terminal("E")]),
//!         ],
//!     )
//!     .unwrap(),
//! ]);
//! let tree = generate_tree(&grammar, "E", |a: &usize| *a, &mut ScriptedDraws::new(vec![0.0])).unwrap();
//! assert_eq!(tree.min_leaf_depth(), 3);
//! ```
pub mod draw_source;
pub mod grammar;
pub mod grammar_analysis;
pub mod grammar_errors;
pub mod rule;
pub mod rule_selector;
pub mod symbol;
pub mod tree_generator;
pub mod tree_node;
