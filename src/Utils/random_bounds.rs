//! Closed intervals that random settings are drawn from.
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    pub fn new(low: f64, high: f64) -> Self {
        Bounds { low, high }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// uniform value in [low, high); `low` for an empty interval
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.low < self.high {
            rng.random_range(self.low..self.high)
        } else {
            self.low
        }
    }

    /// uniform integer in [low, high], bounds rounded to the nearest integers
    pub fn draw_int<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let (low, high) = (self.low.round() as i64, self.high.round() as i64);
        if low < high {
            rng.random_range(low..=high)
        } else {
            low
        }
    }

    /// Raises `low` and lowers `high` by random amounts, keeping at least `min_width` between them.
    /// Bounds already narrower than `min_width` stay as they are.
    pub fn randomly_shrink<R: Rng + ?Sized>(&self, rng: &mut R, min_width: f64) -> Bounds {
        let slack = self.width() - min_width;
        if slack <= 0.0 {
            return *self;
        }
        let raise = rng.random::<f64>() * slack;
        let lower = rng.random::<f64>() * (slack - raise);
        Bounds::new(self.low + raise, self.high - lower)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.low, self.high)
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((low, high): (f64, f64)) -> Self {
        Bounds::new(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn draws_stay_inside() {
        let mut rng = StdRng::seed_from_u64(1);
        let bounds = Bounds::new(-40.0, 40.0);
        for _ in 0..100 {
            let v = bounds.draw(&mut rng);
            assert!((-40.0..40.0).contains(&v));
            let i = Bounds::new(4.0, 15.0).draw_int(&mut rng);
            assert!((4..=15).contains(&i));
        }
        assert_eq!(Bounds::new(0.01, 0.01).draw(&mut rng), 0.01);
        assert_eq!(Bounds::new(8.0, 8.0).draw_int(&mut rng), 8);
    }

    #[test]
    fn shrinking_keeps_order_and_width() {
        let mut rng = StdRng::seed_from_u64(2);
        let bounds = Bounds::new(-10.0, 10.0);
        for _ in 0..100 {
            let shrunk = bounds.randomly_shrink(&mut rng, 1.0);
            assert!(shrunk.low >= bounds.low && shrunk.high <= bounds.high);
            assert!(shrunk.width() >= 1.0 - 1e-9);
        }
        let narrow = Bounds::new(0.0, 0.5);
        assert_eq!(narrow.randomly_shrink(&mut rng, 1.0), narrow);
    }
}
