//! Random render arguments.
//!
//! `GenerationParams` holds the bounds every random setting is drawn from; they can be read
//! from a task document (see `task_parser`). `FormulaGenerationArguments` is one draw of the
//! formula settings, `generate_render_arguments` adds random ranges and colors to a generated
//! formula.
use crate::Utils::random_bounds::Bounds;
use crate::Utils::task_parser::{DocumentMap, get_bounds, get_float, parse_document};
use crate::formulas::formula_errors::FormulaError;
use crate::formulas::formula_grammar::{
    FormulaGrammarConfig, OperatorProbabilities, create_constant, generate_formula_tree,
};
use crate::formulas::formula_tree::FormulaTree;
use crate::formulas::operators::{BinaryOp, Operator, UnaryOp};
use crate::rendering::color_transformation::ColorTransformation;
use crate::rendering::ranges::RangesForProjection;
use crate::rendering::render_arguments::FormulaRenderArguments;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const ARITY_KEYS: [(&str, usize); 5] = [
    ("bare_variable", 0),
    ("unary", 1),
    ("binary", 2),
    ("ternary", 3),
    ("quaternary", 4),
];

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub width: usize,
    pub height: usize,
    pub dimensions: Bounds,
    pub minimal_depth: Bounds,
    pub constant: Bounds,
    pub constant_probability: Bounds,
    pub leaf_probability: Bounds,
    pub range: Bounds,
    pub color_coefficient: Bounds,
    pub zero_channel_probability: f64,
    pub unary_vs_binary: Bounds,
    /// operators with the bounds of their probability
    pub operators: Vec<(Operator, Bounds)>,
    pub arity_probabilities: BTreeMap<usize, f64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        let operators = vec![
            Operator::Binary(BinaryOp::Sum),
            Operator::Binary(BinaryOp::Sub),
            Operator::Unary(UnaryOp::Sin),
            Operator::Unary(UnaryOp::Cos),
            Operator::Unary(UnaryOp::Ln),
            Operator::Unary(UnaryOp::Cbrt),
        ];
        GenerationParams {
            width: 360,
            height: 640,
            dimensions: Bounds::new(4.0, 15.0),
            minimal_depth: Bounds::new(8.0, 13.0),
            constant: Bounds::new(-10.0, 10.0),
            constant_probability: Bounds::new(0.0, 0.5),
            leaf_probability: Bounds::new(0.0, 0.25),
            range: Bounds::new(-40.0, 40.0),
            color_coefficient: Bounds::new(-10.0, 10.0),
            zero_channel_probability: 0.1,
            unary_vs_binary: Bounds::new(0.01, 0.01),
            operators: operators
                .into_iter()
                .map(|op| (op, Bounds::new(0.0, 1.0)))
                .collect(),
            arity_probabilities: FormulaGrammarConfig::default().arity_probabilities,
        }
    }
}

fn config_error(message: String) -> FormulaError {
    FormulaError::Configuration(message)
}

impl GenerationParams {
    /// Reads parameters from a task document; absent keys keep their defaults.
    pub fn from_task_document(text: &str) -> Result<Self, FormulaError> {
        let document = parse_document(text).map_err(config_error)?;
        let mut params = GenerationParams::default();
        params.apply_document(&document).map_err(config_error)?;
        params.validate()?;
        info!("generation parameters: {:?}", params);
        Ok(params)
    }

    fn apply_document(&mut self, document: &DocumentMap) -> Result<(), String> {
        for (section, keys) in document {
            let known: &[&str] = match section.as_str() {
                "image" => &["width", "height"],
                "formula" => &[
                    "dimensions",
                    "minimal_depth",
                    "constant",
                    "constant_probability",
                    "leaf_probability",
                    "unary_vs_binary",
                ],
                "arity" => &["bare_variable", "unary", "binary", "ternary", "quaternary"],
                "rendering" => &["range", "color_coefficient", "zero_channel_probability"],
                "operators" => continue,
                _ => {
                    warn!("unknown section '{}' ignored", section);
                    continue;
                }
            };
            for key in keys.keys().filter(|key| !known.contains(&key.as_str())) {
                warn!("unknown key '{}.{}' ignored", section, key);
            }
        }

        let size = |key: &str| -> Result<Option<usize>, String> {
            match get_float(document, "image", key)? {
                Some(v) if v >= 1.0 && v.fract() == 0.0 => Ok(Some(v as usize)),
                Some(v) => Err(format!("image.{} must be a positive integer, found {}", key, v)),
                None => Ok(None),
            }
        };
        if let Some(width) = size("width")? {
            self.width = width;
        }
        if let Some(height) = size("height")? {
            self.height = height;
        }

        for (key, target) in [
            ("dimensions", &mut self.dimensions),
            ("minimal_depth", &mut self.minimal_depth),
            ("constant", &mut self.constant),
            ("constant_probability", &mut self.constant_probability),
            ("leaf_probability", &mut self.leaf_probability),
            ("unary_vs_binary", &mut self.unary_vs_binary),
        ] {
            if let Some(bounds) = get_bounds(document, "formula", key)? {
                *target = bounds.into();
            }
        }
        for (key, target) in [
            ("range", &mut self.range),
            ("color_coefficient", &mut self.color_coefficient),
        ] {
            if let Some(bounds) = get_bounds(document, "rendering", key)? {
                *target = bounds.into();
            }
        }
        if let Some(p) = get_float(document, "rendering", "zero_channel_probability")? {
            self.zero_channel_probability = p;
        }

        for (key, arity) in ARITY_KEYS {
            if let Some(p) = get_float(document, "arity", key)? {
                self.arity_probabilities.insert(arity, p);
            }
        }

        if let Some(section) = document.get("operators") {
            let mut names: Vec<&String> = section.keys().collect();
            // document sections are unordered, keep the operator order stable
            names.sort();
            let mut operators = Vec::with_capacity(names.len());
            for name in names {
                let op = Operator::by_name(name)
                    .ok_or_else(|| format!("unknown operator '{}'", name))?;
                let bounds = get_bounds(document, "operators", name)?
                    .ok_or_else(|| format!("operator '{}' needs probability bounds", name))?;
                operators.push((op, bounds.into()));
            }
            self.operators = operators;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FormulaError> {
        let ordered = [
            ("dimensions", self.dimensions),
            ("minimal_depth", self.minimal_depth),
            ("constant", self.constant),
            ("constant_probability", self.constant_probability),
            ("leaf_probability", self.leaf_probability),
            ("unary_vs_binary", self.unary_vs_binary),
            ("range", self.range),
            ("color_coefficient", self.color_coefficient),
        ];
        for (name, bounds) in ordered {
            if bounds.low > bounds.high {
                return Err(config_error(format!("{} bounds {} are reversed", name, bounds)));
            }
        }
        for (name, bounds) in [
            ("constant_probability", self.constant_probability),
            ("leaf_probability", self.leaf_probability),
            ("unary_vs_binary", self.unary_vs_binary),
        ] {
            if bounds.low < 0.0 || bounds.high > 1.0 {
                return Err(config_error(format!("{} bounds {} leave [0, 1]", name, bounds)));
            }
        }
        if self.unary_vs_binary.high >= 1.0 {
            return Err(config_error(
                "unary_vs_binary probability must stay below 1".to_string(),
            ));
        }
        if self.dimensions.low < 1.0 || self.minimal_depth.low < 1.0 {
            return Err(config_error(
                "dimensions and minimal depth start at 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.zero_channel_probability) {
            return Err(config_error(format!(
                "zero channel probability {} leaves [0, 1]",
                self.zero_channel_probability
            )));
        }
        if self.operators.is_empty() {
            return Err(config_error("no operators configured".to_string()));
        }
        Ok(())
    }
}

/// One random draw of the formula settings
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaGenerationArguments {
    pub dimensions: usize,
    pub minimal_depth: usize,
    pub constant_probability: f64,
    pub leaf_probability: f64,
    pub constant_bounds: Bounds,
    pub operator_probabilities: OperatorProbabilities,
    pub arity_probabilities: BTreeMap<usize, f64>,
}

impl FormulaGenerationArguments {
    /// Draws every setting within its bounds. Unary probabilities are rescaled so that the
    /// unary share of the unary + binary mass equals the drawn unary-vs-binary probability.
    pub fn create_random<R: Rng + ?Sized>(params: &GenerationParams, rng: &mut R) -> Self {
        let mut operator_probabilities: OperatorProbabilities = params
            .operators
            .iter()
            .map(|(op, bounds)| (op.clone(), bounds.draw(rng)))
            .collect();
        let ubp = params.unary_vs_binary.draw(rng);
        let mass = |arity: usize, ops: &OperatorProbabilities| -> f64 {
            ops.iter()
                .filter(|(op, _)| op.arity() == arity)
                .map(|(_, p)| *p)
                .sum()
        };
        let unary_sum = mass(1, &operator_probabilities);
        let binary_sum = mass(2, &operator_probabilities);
        if unary_sum > 0.0 && binary_sum > 0.0 && ubp < 1.0 {
            let correction = ubp / (1.0 - ubp) * binary_sum / unary_sum;
            for (op, p) in operator_probabilities.iter_mut() {
                if op.arity() == 1 {
                    *p *= correction;
                }
            }
        }

        let dimensions = params.dimensions.draw_int(rng).max(1) as usize;
        operator_probabilities.extend(
            (0..dimensions).map(|i| (Operator::variable(&format!("x{}", i)), 1.0)),
        );
        FormulaGenerationArguments {
            dimensions,
            minimal_depth: params.minimal_depth.draw_int(rng).max(1) as usize,
            leaf_probability: params.leaf_probability.draw(rng),
            constant_probability: params.constant_probability.draw(rng),
            constant_bounds: params.constant,
            operator_probabilities,
            arity_probabilities: params.arity_probabilities.clone(),
        }
    }

    pub fn grammar_config(&self) -> FormulaGrammarConfig {
        FormulaGrammarConfig {
            minimal_depth: self.minimal_depth,
            leaf_probability: self.leaf_probability,
            constant_probability: self.constant_probability,
            arity_probabilities: self.arity_probabilities.clone(),
        }
    }

    /// Generates a formula; constants come from a generator seeded from `rng`.
    pub fn generate_formula<R: Rng>(&self, rng: &mut R) -> Result<FormulaTree, FormulaError> {
        let bounds = (self.constant_bounds.low, self.constant_bounds.high);
        let mut constant_rng = StdRng::seed_from_u64(rng.random());
        generate_formula_tree(
            &self.operator_probabilities,
            move || create_constant(bounds, &mut constant_rng),
            &self.grammar_config(),
            rng,
        )
    }
}

/// Random formula with random ranges and colors, sized `params.width x params.height`.
pub fn generate_render_arguments<R: Rng>(
    params: &GenerationParams,
    rng: &mut R,
) -> Result<FormulaRenderArguments, FormulaError> {
    params.validate()?;
    let arguments = FormulaGenerationArguments::create_random(params, rng);
    info!(
        "formula settings: {} dimensions, minimal depth {}, leaf probability {:.3}, constant probability {:.3}",
        arguments.dimensions,
        arguments.minimal_depth,
        arguments.leaf_probability,
        arguments.constant_probability
    );
    let formula = arguments.generate_formula(rng)?;
    let ranges = RangesForProjection::create_random(
        rng,
        formula.dimensions(),
        params.width,
        params.height,
        params.range,
    );
    let color = ColorTransformation::create_random(
        rng,
        params.color_coefficient,
        params.zero_channel_probability,
    );
    Ok(FormulaRenderArguments::new(formula, ranges, color))
}
