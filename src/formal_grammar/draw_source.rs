//! Sources of uniform draws in [0, 1) consumed by rule selectors.
//!
//! Any `rand::Rng` is a draw source. `ScriptedDraws` replays a fixed cyclic sequence, so a
//! generation run can be reproduced draw by draw.
use rand::Rng;

pub trait DrawSource {
    /// next uniform draw in [0, 1)
    fn next_draw(&mut self) -> f64;
}

impl<R: Rng + ?Sized> DrawSource for R {
    fn next_draw(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Cyclic replay of a fixed draw sequence
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: Vec<f64>,
    position: usize,
}

impl ScriptedDraws {
    /// an empty sequence replays 0.0 forever
    pub fn new(draws: Vec<f64>) -> Self {
        ScriptedDraws { draws, position: 0 }
    }

    /// i*step for i in 0..count, e.g. 0.0, 0.1, ..., 0.9
    pub fn linear(count: usize, step: f64) -> Self {
        ScriptedDraws::new((0..count).map(|i| i as f64 * step).collect())
    }

    /// number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.position
    }
}

impl DrawSource for ScriptedDraws {
    fn next_draw(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.position % self.draws.len()];
        self.position += 1;
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn scripted_draws_cycle() {
        let mut draws = ScriptedDraws::new(vec![0.1, 0.5]);
        let taken: Vec<f64> = (0..5).map(|_| draws.next_draw()).collect();
        assert_eq!(taken, vec![0.1, 0.5, 0.1, 0.5, 0.1]);
        assert_eq!(draws.consumed(), 5);
    }

    #[test]
    fn linear_draws() {
        let mut draws = ScriptedDraws::linear(10, 0.1);
        assert_eq!(draws.next_draw(), 0.0);
        assert_eq!(draws.next_draw(), 0.1);
    }

    #[test]
    fn rng_draws_are_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let r = rng.next_draw();
            assert!((0.0..1.0).contains(&r));
        }
    }
}
