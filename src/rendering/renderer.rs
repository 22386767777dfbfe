//! Rendering of formula values to RGB pixels.
//!
//! The formula is evaluated on the projection grid, values are mapped from
//! `[mean - 3σ, mean + 3σ]` onto `[-1, 1]` and every color channel polynomial turns the mapped
//! value into an intensity.
use crate::formulas::formula_errors::FormulaError;
use crate::rendering::color_transformation::ColorChannelTransformation;
use crate::rendering::render_arguments::FormulaRenderArguments;
use log::{debug, info};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// number of standard deviations around the mean mapped onto [-1, 1]
pub const SIGMA_SPAN: f64 = 3.0;

/// row-major RGB bytes, three per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub width: usize,
    pub height: usize,
    pub rgb: Vec<u8>,
}

impl RenderedImage {
    pub fn pixel(&self, row: usize, column: usize) -> [u8; 3] {
        let i = 3 * (row * self.width + column);
        [self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]]
    }
}

/// mean and standard deviation of the finite grid values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStatistics {
    pub mean: f64,
    pub std_dev: f64,
}

impl GridStatistics {
    pub fn of(grid: &Array2<f64>) -> Self {
        let (sum, count) = grid
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if count == 0 {
            return GridStatistics {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let mean = sum / count as f64;
        let variance = grid
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / count as f64;
        GridStatistics {
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// value mapped linearly onto [-1, 1], NaN to 0
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() || self.std_dev == 0.0 {
            return 0.0;
        }
        let low = self.mean - SIGMA_SPAN * self.std_dev;
        let span = 2.0 * SIGMA_SPAN * self.std_dev;
        ((value - low) / span * 2.0 - 1.0).clamp(-1.0, 1.0)
    }
}

/// channel intensity of a normalized value, `noise` is a uniform draw in [0, 1)
pub fn channel_byte(channel: &ColorChannelTransformation, value: f64, noise: f64) -> u8 {
    let intensity = channel.transform(value) + channel.dispersion * (2.0 * noise - 1.0);
    (intensity * 255.0).clamp(0.0, 255.0) as u8
}

/// Evaluates the formula of `arguments` over its projection grid.
pub fn evaluate_projection(arguments: &FormulaRenderArguments) -> Result<Array2<f64>, FormulaError> {
    arguments.formula.evaluate_grid(
        &arguments.ranges.coordinates(),
        arguments.width(),
        arguments.height(),
    )
}

/// Colors an evaluated grid. Rows are colored in parallel, each with its own noise generator
/// derived from `seed`, so the result does not depend on scheduling.
pub fn color_grid(
    grid: &Array2<f64>,
    arguments: &FormulaRenderArguments,
    seed: u64,
) -> RenderedImage {
    let statistics = GridStatistics::of(grid);
    debug!(
        "grid statistics: mean {}, std dev {}",
        statistics.mean, statistics.std_dev
    );
    let channels = arguments.color.channels();
    let (height, width) = grid.dim();
    let rows: Vec<Vec<u8>> = (0..height)
        .into_par_iter()
        .map(|row| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(row as u64));
            let mut bytes = Vec::with_capacity(3 * width);
            for column in 0..width {
                let value = statistics.normalize(grid[[row, column]]);
                for channel in channels {
                    bytes.push(channel_byte(channel, value, rng.random::<f64>()));
                }
            }
            bytes
        })
        .collect();
    RenderedImage {
        width,
        height,
        rgb: rows.into_iter().flatten().collect(),
    }
}

/// Evaluates and colors the picture described by `arguments`.
pub fn render<R: Rng + ?Sized>(
    arguments: &FormulaRenderArguments,
    rng: &mut R,
) -> Result<RenderedImage, FormulaError> {
    let begin = Instant::now();
    let grid = evaluate_projection(arguments)?;
    let image = color_grid(&grid, arguments, rng.random());
    info!(
        "rendered {}x{} image in {:?}",
        image.width,
        image.height,
        begin.elapsed()
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn arguments(text: &str) -> FormulaRenderArguments {
        FormulaRenderArguments::parse(text).unwrap()
    }

    #[test]
    fn statistics_skip_non_finite_values() {
        let grid = array![[1.0, 3.0], [f64::NAN, f64::INFINITY]];
        let statistics = GridStatistics::of(&grid);
        assert_relative_eq!(statistics.mean, 2.0);
        assert_relative_eq!(statistics.std_dev, 1.0);
        assert_relative_eq!(statistics.normalize(2.0), 0.0);
        assert_relative_eq!(statistics.normalize(5.0), 1.0);
        assert_relative_eq!(statistics.normalize(-1.0), -1.0);
        assert_relative_eq!(statistics.normalize(3.5), 0.5);
        assert_relative_eq!(statistics.normalize(100.0), 1.0);
        assert_relative_eq!(statistics.normalize(f64::NAN), 0.0);
    }

    #[test]
    fn channel_bytes_are_clamped() {
        let identity = ColorChannelTransformation::new(0.0, 0.0, 1.0, 0.0);
        assert_eq!(channel_byte(&identity, 1.0, 0.3), 255);
        assert_eq!(channel_byte(&identity, 0.5, 0.3), 127);
        assert_eq!(channel_byte(&identity, -0.5, 0.3), 0);
        let noisy = ColorChannelTransformation::new(0.0, 0.0, 0.0, 0.2);
        assert_eq!(channel_byte(&noisy, 0.0, 0.5), 0);
        assert_eq!(channel_byte(&noisy, 0.0, 1.0), 51);
    }

    #[test]
    fn gradient_rendering() {
        // x0 runs along X from -1 to 1, only the red channel is lit
        let arguments = arguments("5;2;-1,0.5\r\n0,0,1,0;0,0,0,0;0,0,0,0\r\nsum x0 0");
        let image = color_grid(&evaluate_projection(&arguments).unwrap(), &arguments, 1);
        assert_eq!((image.width, image.height), (5, 2));
        assert_eq!(image.rgb.len(), 30);
        for row in 0..2 {
            assert_eq!(image.pixel(row, 0), [0, 0, 0]);
            assert_eq!(image.pixel(row, 2), [0, 0, 0]);
            assert!(image.pixel(row, 4)[0] > image.pixel(row, 3)[0]);
            assert_eq!(image.pixel(row, 4)[1], 0);
        }
    }

    #[test]
    fn rendering_is_reproducible_for_a_seed() {
        let arguments =
            arguments("8;6;-3,1;-2,0.5\r\n1,0.5,0.2,0.1;0,1,0,0.2;-1,0,1,0.3\r\nmul sin x0 cos x1");
        let first = render(&arguments, &mut StdRng::seed_from_u64(4)).unwrap();
        let second = render(&arguments, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mismatched_ranges_are_reported() {
        let arguments = arguments("4;4;0,1\r\n1,0,0,0;0,1,0,0;0,0,1,0\r\nsum x0 x1");
        assert!(evaluate_projection(&arguments).is_err());
    }
}
