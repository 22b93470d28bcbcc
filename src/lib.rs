//! Barnsley's Chaos Game for iterated function systems.
//!
//! A [`RuleSet`] turns weighted update rules into a cumulative
//! distribution; [`engine::run`] walks a point through randomly selected
//! rules and yields every visited point tagged with the rule that produced
//! it. Presets, palette and PNG/GIF output sit on top of that stream.

pub mod engine;
pub mod error;
pub mod palette;
pub mod point;
pub mod presets;
pub mod random;
pub mod render;
pub mod rules;

pub use engine::{drop_warm_up, run, run_ensemble, Entry, Tag, Trajectory, DEFAULT_WARM_UP};
pub use error::{ChaosError, DistributionFault, Result};
pub use point::{Affine, Point, Point2};
pub use random::{RandomSource, ScriptedDraws};
pub use rules::{RuleSet, UpdateRule, WeightedRule, DISTRIBUTION_TOLERANCE};
