// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! # RustedWallpaper
//! Random formulas grown from a probabilistic grammar and rendered as pictures.
//!
//! * `formal_grammar` - generic grammar machinery: rules, selectors with minimum-depth control,
//!   tree generation
//! * `formulas` - operators, formula trees, their evaluation, text form and the formula grammar
//! * `rendering` - projection of a formula on a pixel grid and coloring
//! * `Utils` - logging, csv export, task documents and random generation settings
pub mod Utils;
pub mod formal_grammar;
pub mod formulas;
pub mod rendering;
