//! Variable ranges of a 2D projection.
//!
//! Every formula variable gets an arithmetic progression of values. Variables with an even index
//! run along the X axis (`x_count` values), odd ones along Y (`y_count` values).
use crate::Utils::random_bounds::Bounds;
use crate::formulas::formula_errors::FormulaError;
use crate::formulas::formula_lambdify::GridAxis;
use rand::Rng;
use std::fmt;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Splits `text` at `separator`. One trailing separator is tolerated, an empty field anywhere
/// else is an error.
pub(crate) fn split_fields(text: &str, separator: char) -> Result<Vec<&str>, FormulaError> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix(separator).unwrap_or(trimmed);
    let fields: Vec<&str> = trimmed.split(separator).collect();
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(FormulaError::Parse(format!(
            "empty field in '{}'",
            text
        )));
    }
    Ok(fields)
}

fn parse_number<T: std::str::FromStr>(text: &str, what: &str) -> Result<T, FormulaError> {
    text.trim()
        .parse::<T>()
        .map_err(|_| FormulaError::Parse(format!("invalid {} '{}'", what, text)))
}

/// `count` values starting at `start` with increment `step`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}

impl Range {
    pub fn new(start: f64, step: f64, count: usize) -> Self {
        Range { start, step, count }
    }

    pub fn end(&self) -> f64 {
        self.start + self.step * self.count.saturating_sub(1) as f64
    }

    pub fn values(&self) -> Vec<f64> {
        (0..self.count)
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }

    /// Random range of `count` values inside `bounds`, start and step rounded to 2 decimals.
    pub fn create_random<R: Rng + ?Sized>(rng: &mut R, count: usize, bounds: Bounds) -> Range {
        let start = round2(bounds.draw(rng)).clamp(bounds.low, bounds.high);
        let end = bounds.draw(rng);
        let step = if count > 1 {
            // truncation keeps the last value inside the bounds
            ((end - start) / (count - 1) as f64 * 100.0).trunc() / 100.0
        } else {
            0.0
        };
        Range::new(start, step, count)
    }

    /// `start,step` without the count
    pub fn to_short_string(&self) -> String {
        format!("{},{}", self.start, self.step)
    }

    /// Parses `start,step,count` or the short `start,step` form, which gets `default_count`.
    pub fn parse(text: &str, default_count: usize) -> Result<Range, FormulaError> {
        let fields = split_fields(text, ',')?;
        match fields.as_slice() {
            [start, step] => Ok(Range::new(
                parse_number(start, "range start")?,
                parse_number(step, "range step")?,
                default_count,
            )),
            [start, step, count] => Ok(Range::new(
                parse_number(start, "range start")?,
                parse_number(step, "range step")?,
                parse_number(count, "range count")?,
            )),
            _ => Err(FormulaError::Parse(format!(
                "range '{}' needs 'start,step[,count]'",
                text
            ))),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.start, self.step, self.count)
    }
}

/// Ranges of all variables of a formula projected on a `x_count x y_count` grid
#[derive(Debug, Clone, PartialEq)]
pub struct RangesForProjection {
    pub x_count: usize,
    pub y_count: usize,
    pub ranges: Vec<Range>,
}

impl RangesForProjection {
    /// counts of the given ranges are replaced by the count of their axis
    pub fn new(x_count: usize, y_count: usize, ranges: Vec<Range>) -> Self {
        let ranges = ranges
            .into_iter()
            .enumerate()
            .map(|(i, r)| Range::new(r.start, r.step, Self::count_for(i, x_count, y_count)))
            .collect();
        RangesForProjection {
            x_count,
            y_count,
            ranges,
        }
    }

    fn count_for(index: usize, x_count: usize, y_count: usize) -> usize {
        if index % 2 == 0 { x_count } else { y_count }
    }

    pub fn axis(index: usize) -> GridAxis {
        if index % 2 == 0 { GridAxis::X } else { GridAxis::Y }
    }

    /// Random ranges for `variables` variables; the bounds are shrunk once and shared by all ranges.
    pub fn create_random<R: Rng + ?Sized>(
        rng: &mut R,
        variables: usize,
        x_count: usize,
        y_count: usize,
        bounds: Bounds,
    ) -> Self {
        let bounds = bounds.randomly_shrink(rng, 1.0);
        let ranges = (0..variables)
            .map(|i| Range::create_random(rng, Self::count_for(i, x_count, y_count), bounds))
            .collect();
        RangesForProjection::new(x_count, y_count, ranges)
    }

    /// axis and values per variable, the input of grid evaluation
    pub fn coordinates(&self) -> Vec<(GridAxis, Vec<f64>)> {
        self.ranges
            .iter()
            .enumerate()
            .map(|(i, r)| (Self::axis(i), r.values()))
            .collect()
    }

    /// `xCount;yCount;start,step;start,step;...`
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        let fields = split_fields(text, ';')?;
        if fields.len() < 2 {
            return Err(FormulaError::Parse(format!(
                "ranges '{}' need at least the X and Y counts",
                text
            )));
        }
        let x_count = parse_number(fields[0], "X count")?;
        let y_count = parse_number(fields[1], "Y count")?;
        let ranges = fields[2..]
            .iter()
            .enumerate()
            .map(|(i, field)| Range::parse(field, Self::count_for(i, x_count, y_count)))
            .collect::<Result<Vec<Range>, FormulaError>>()?;
        Ok(RangesForProjection::new(x_count, y_count, ranges))
    }
}

impl fmt::Display for RangesForProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x_count, self.y_count)?;
        for range in &self.ranges {
            write!(f, ";{}", range.to_short_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn range_values_and_text() {
        let range = Range::new(-1.5, 0.5, 4);
        assert_eq!(range.values(), vec![-1.5, -1.0, -0.5, 0.0]);
        assert_relative_eq!(range.end(), 0.0);
        assert_eq!(range.to_string(), "-1.5,0.5,4");
        assert_eq!(range.to_short_string(), "-1.5,0.5");
        assert_eq!(Range::parse("-1.5,0.5,4", 10).unwrap(), range);
        assert_eq!(Range::parse("-1.5, 0.5", 4).unwrap(), range);
        assert!(Range::parse("1", 4).is_err());
        assert!(Range::parse("a,1", 4).is_err());
    }

    #[test]
    fn projection_counts_follow_axis_parity() {
        let ranges = RangesForProjection::parse("3;2;0,1;10,-1;5,0.5").unwrap();
        assert_eq!(ranges.x_count, 3);
        assert_eq!(ranges.y_count, 2);
        let counts: Vec<usize> = ranges.ranges.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![3, 2, 3]);
        assert_eq!(ranges.to_string(), "3;2;0,1;10,-1;5,0.5");
        let coordinates = ranges.coordinates();
        assert_eq!(coordinates[1], (GridAxis::Y, vec![10.0, 9.0]));
        assert_eq!(coordinates[2].0, GridAxis::X);
    }

    #[test]
    fn malformed_projection_is_rejected() {
        assert!(RangesForProjection::parse("3").is_err());
        assert!(RangesForProjection::parse("3;x;0,1").is_err());
        assert!(RangesForProjection::parse("3;2;0").is_err());
        assert!(RangesForProjection::parse("3;;0,1").is_err());
        assert!(RangesForProjection::parse("").is_err());
        assert_eq!(
            RangesForProjection::parse("3;2;0,1;").unwrap(),
            RangesForProjection::parse("3;2;0,1").unwrap()
        );
    }

    #[test]
    fn empty_range_fields_are_rejected() {
        assert!(Range::parse("1,,2", 4).is_err());
        assert!(Range::parse(",1,2", 4).is_err());
        assert!(Range::parse("1, ,2", 4).is_err());
        assert_eq!(Range::parse("1,2,", 4).unwrap(), Range::new(1.0, 2.0, 4));
    }

    #[test]
    fn random_ranges_stay_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(17);
        let bounds = Bounds::new(-40.0, 40.0);
        for _ in 0..50 {
            let ranges = RangesForProjection::create_random(&mut rng, 5, 36, 64, bounds);
            assert_eq!(ranges.ranges.len(), 5);
            for (i, range) in ranges.ranges.iter().enumerate() {
                assert_eq!(range.count, if i % 2 == 0 { 36 } else { 64 });
                assert!(range.start >= -40.0 && range.start <= 40.0);
                assert!(range.end() >= -40.0 - 1e-9 && range.end() <= 40.0 + 1e-9);
                assert_relative_eq!(range.step * 100.0, (range.step * 100.0).round(), epsilon = 1e-6);
            }
        }
    }
}
