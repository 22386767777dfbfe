//! # Rendering
//! Projection of formulas onto a pixel grid and coloring of the computed values.
//! * `ranges` - value ranges of the variables along the X and Y axes
//! * `color_transformation` - per-channel cubic color polynomials
//! * `render_arguments` - formula, ranges and colors with their text form
//! * `renderer` - parallel evaluation and coloring into RGB bytes
pub mod color_transformation;
pub mod ranges;
pub mod render_arguments;
pub mod renderer;
