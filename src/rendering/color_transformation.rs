//! Mapping of normalized formula values to color channels.
use crate::Utils::random_bounds::Bounds;
use crate::formulas::formula_errors::FormulaError;
use crate::rendering::ranges::split_fields;
use rand::Rng;
use std::fmt;

/// largest dispersion drawn for a random channel
pub const MAX_DISPERSION: f64 = 0.3;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Cubic polynomial `a·v³ + b·v² + c·v` plus uniform noise of amplitude `dispersion`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorChannelTransformation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub dispersion: f64,
}

impl ColorChannelTransformation {
    pub fn new(a: f64, b: f64, c: f64, dispersion: f64) -> Self {
        ColorChannelTransformation {
            a,
            b,
            c,
            dispersion,
        }
    }

    /// channel that stays black
    pub fn zero() -> Self {
        ColorChannelTransformation::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.a == 0.0 && self.b == 0.0 && self.c == 0.0
    }

    pub fn transform(&self, v: f64) -> f64 {
        v * v * v * self.a + v * v * self.b + v * self.c
    }

    /// Random channel: zero with `zero_channel_probability`, otherwise coefficients
    /// `round(U · randint(low, high), 2)` within randomly shrunk bounds.
    pub fn create_random<R: Rng + ?Sized>(
        rng: &mut R,
        coefficient_bounds: Bounds,
        zero_channel_probability: f64,
    ) -> Self {
        if rng.random::<f64>() < zero_channel_probability {
            return ColorChannelTransformation::zero();
        }
        let bounds = coefficient_bounds.randomly_shrink(rng, 1.0);
        let (low, high) = (bounds.low.round() as i64, bounds.high.round() as i64);
        let mut coefficient = || {
            // randint over [low, high)
            let n = if low < high {
                rng.random_range(low..high)
            } else {
                low
            };
            round2(rng.random::<f64>() * n as f64)
        };
        let (mut a, mut b, mut c) = (coefficient(), coefficient(), coefficient());
        if a == 0.0 && b == 0.0 && c == 0.0 {
            let half = bounds.width() / 2.0;
            (a, b, c) = (half, half, half);
        }
        let dispersion = round2(rng.random::<f64>() * MAX_DISPERSION);
        ColorChannelTransformation::new(a, b, c, dispersion)
    }

    /// `a,b,c,dispersion`
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        let values = split_fields(text, ',')?
            .into_iter()
            .map(|f| {
                f.trim()
                    .parse::<f64>()
                    .map_err(|_| FormulaError::Parse(format!("invalid coefficient '{}'", f)))
            })
            .collect::<Result<Vec<f64>, FormulaError>>()?;
        match values.as_slice() {
            [a, b, c, d] => Ok(ColorChannelTransformation::new(*a, *b, *c, *d)),
            _ => Err(FormulaError::Parse(format!(
                "channel '{}' needs 'a,b,c,dispersion'",
                text
            ))),
        }
    }
}

impl fmt::Display for ColorChannelTransformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.a, self.b, self.c, self.dispersion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTransformation {
    pub red: ColorChannelTransformation,
    pub green: ColorChannelTransformation,
    pub blue: ColorChannelTransformation,
}

impl ColorTransformation {
    pub fn new(
        red: ColorChannelTransformation,
        green: ColorChannelTransformation,
        blue: ColorChannelTransformation,
    ) -> Self {
        ColorTransformation { red, green, blue }
    }

    pub fn channels(&self) -> [&ColorChannelTransformation; 3] {
        [&self.red, &self.green, &self.blue]
    }

    pub fn create_random<R: Rng + ?Sized>(
        rng: &mut R,
        coefficient_bounds: Bounds,
        zero_channel_probability: f64,
    ) -> Self {
        let red =
            ColorChannelTransformation::create_random(rng, coefficient_bounds, zero_channel_probability);
        let green =
            ColorChannelTransformation::create_random(rng, coefficient_bounds, zero_channel_probability);
        let blue =
            ColorChannelTransformation::create_random(rng, coefficient_bounds, zero_channel_probability);
        ColorTransformation::new(red, green, blue)
    }

    /// `red;green;blue`
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        let channels = split_fields(text, ';')?;
        match channels.as_slice() {
            [red, green, blue] => Ok(ColorTransformation::new(
                ColorChannelTransformation::parse(red)?,
                ColorChannelTransformation::parse(green)?,
                ColorChannelTransformation::parse(blue)?,
            )),
            _ => Err(FormulaError::Parse(format!(
                "color transformation '{}' needs three channels",
                text
            ))),
        }
    }
}

impl fmt::Display for ColorTransformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.red, self.green, self.blue)
    }
}
