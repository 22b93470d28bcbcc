//! The chaos-game iteration.
//!
//! [`run`] returns a lazy [`Trajectory`]: the seed point first, then one
//! entry per iteration, each holding the new point and the label of the
//! rule that produced it. Only the previous point is kept between steps.

use std::iter::{FusedIterator, Skip};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use crate::random::RandomSource;
use crate::rules::RuleSet;

/// Entries the original animations threw away before plotting.
pub const DEFAULT_WARM_UP: usize = 50;

/// Where a trajectory entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag<L> {
    /// The caller-supplied starting point.
    Seed,
    /// Produced by the rule carrying this label.
    Rule(L),
}

impl<L> Tag<L> {
    pub fn rule(&self) -> Option<&L> {
        match self {
            Tag::Seed => None,
            Tag::Rule(label) => Some(label),
        }
    }

    pub fn is_seed(&self) -> bool {
        matches!(self, Tag::Seed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry<P, L> {
    pub point: P,
    pub tag: Tag<L>,
}

/// Single-pass iterator over one chaos-game run.
pub struct Trajectory<'a, P, L, R> {
    rules: &'a RuleSet<P, L>,
    rng: R,
    current: P,
    seed_pending: bool,
    remaining: usize,
}

impl<'a, P, L, R> Iterator for Trajectory<'a, P, L, R>
where
    P: Clone,
    L: Clone,
    R: RandomSource,
{
    type Item = Entry<P, L>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.seed_pending {
            self.seed_pending = false;
            return Some(Entry {
                point: self.current.clone(),
                tag: Tag::Seed,
            });
        }
        if self.remaining == 0 {
            return None;
        }

        let draw = self.rng.uniform01();
        let rule = self.rules.select(draw);
        self.current = rule.apply(&self.current);
        self.remaining -= 1;

        Some(Entry {
            point: self.current.clone(),
            tag: Tag::Rule(rule.label().clone()),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining.checked_add(usize::from(self.seed_pending)) {
            Some(len) => (len, Some(len)),
            None => (usize::MAX, None),
        }
    }
}

impl<P: Clone, L: Clone, R: RandomSource> FusedIterator for Trajectory<'_, P, L, R> {}

/// Starts a run of `iterations` steps from `initial`.
///
/// The trajectory yields exactly `iterations + 1` entries. Nothing is drawn
/// from `rng` until the second entry is requested. A transform that panics
/// unwinds through the iterator.
pub fn run<P, L, R>(
    rules: &RuleSet<P, L>,
    initial: P,
    iterations: usize,
    rng: R,
) -> Trajectory<'_, P, L, R>
where
    R: RandomSource,
{
    Trajectory {
        rules,
        rng,
        current: initial,
        seed_pending: true,
        remaining: iterations,
    }
}

/// Discards the first `n` entries, which still carry the bias of the
/// starting point.
pub fn drop_warm_up<I: Iterator>(entries: I, n: usize) -> Skip<I> {
    entries.skip(n)
}

/// Runs one independent trajectory per seed, in parallel.
///
/// Every run gets its own `StdRng` seeded from its entry in `seeds`, so
/// the result is identical to running the seeds one after another; the
/// output keeps the order of `seeds`.
pub fn run_ensemble<P, L>(
    rules: &RuleSet<P, L>,
    initial: &P,
    iterations: usize,
    seeds: &[u64],
) -> Vec<Vec<Entry<P, L>>>
where
    P: Clone + Send + Sync,
    L: Clone + Send + Sync,
{
    debug!(runs = seeds.len(), iterations, "starting ensemble");
    let runs: Vec<Vec<Entry<P, L>>> = seeds
        .par_iter()
        .map(|&seed| {
            run(rules, initial.clone(), iterations, StdRng::seed_from_u64(seed)).collect()
        })
        .collect();
    debug!(runs = runs.len(), "ensemble finished");
    runs
}
