use rand::Rng;

/// Source of uniform draws in `[0, 1)` handed to the engine.
///
/// Each run owns its source; two runs never share one.
pub trait RandomSource {
    fn uniform01(&mut self) -> f64;
}

impl<R: Rng> RandomSource for R {
    fn uniform01(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of draws in order.
///
/// Panics once the list is exhausted: asking for more draws than were
/// scripted is a bug in the caller.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: Vec<f64>,
    next: usize,
}

impl ScriptedDraws {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        ScriptedDraws {
            draws: draws.into(),
            next: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len() - self.next
    }
}

impl RandomSource for ScriptedDraws {
    fn uniform01(&mut self) -> f64 {
        let draw = match self.draws.get(self.next) {
            Some(&draw) => draw,
            None => panic!(
                "scripted draws exhausted after {} values",
                self.draws.len()
            ),
        };
        self.next += 1;
        draw
    }
}
