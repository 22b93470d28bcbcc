//! Classic rule sets, each paired with a frame that shows the whole
//! attractor. Labels are palette indices.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4};
use std::fmt;

use crate::error::Result;
use crate::point::{Affine, Point2};
use crate::render::Viewport;
use crate::rules::{RuleSet, UpdateRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fractal {
    Triangle,
    Flower,
    Fern,
    Dragon,
    Carpet,
    Math,
}

impl Fractal {
    pub const ALL: [Fractal; 6] = [
        Fractal::Triangle,
        Fractal::Flower,
        Fractal::Fern,
        Fractal::Dragon,
        Fractal::Carpet,
        Fractal::Math,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Fractal::Triangle => "triangle",
            Fractal::Flower => "flower",
            Fractal::Fern => "fern",
            Fractal::Dragon => "dragon",
            Fractal::Carpet => "carpet",
            Fractal::Math => "math",
        }
    }

    pub fn preset(self) -> Result<Preset> {
        let (maps, viewport) = match self {
            Fractal::Triangle => (triangle(), Viewport::new((0.0, 1.0), (0.0, 3f64.sqrt() / 2.0))),
            Fractal::Flower => (flower(), Viewport::new((0.5, 2.5), (0.0, 3f64.sqrt()))),
            Fractal::Fern => (fern(), Viewport::new((-3.0, 3.0), (0.0, 10.0))),
            Fractal::Dragon => (dragon(), Viewport::new((-2.5, 2.5), (-2.0, 2.0))),
            Fractal::Carpet => (carpet(), Viewport::new((0.0, 1.0), (0.0, 1.0))),
            Fractal::Math => (math(), Viewport::new((0.0, 4.6), (0.0, 1.0))),
        };

        let rules = RuleSet::build(
            maps.into_iter()
                .enumerate()
                .map(|(color, (probability, map))| {
                    UpdateRule::new(probability, move |p: &Point2| map.apply(p), color)
                }),
        )?;

        Ok(Preset {
            fractal: self,
            rules,
            viewport,
        })
    }
}

impl fmt::Display for Fractal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Preset {
    pub fractal: Fractal,
    pub rules: RuleSet<Point2, usize>,
    pub viewport: Viewport,
}

fn uniform(maps: Vec<Affine>) -> Vec<(f64, Affine)> {
    let p = 1.0 / maps.len() as f64;
    maps.into_iter().map(|m| (p, m)).collect()
}

/// Sierpinski triangle.
fn triangle() -> Vec<(f64, Affine)> {
    let h = 3f64.sqrt() / 4.0;
    uniform(vec![
        Affine::scale_translate(0.5, 0.0, 0.0),
        Affine::scale_translate(0.5, 0.25, h),
        Affine::scale_translate(0.5, 0.5, 0.0),
    ])
}

/// Six-pointed flower built from a hexagram of thirds.
fn flower() -> Vec<(f64, Affine)> {
    let t = 1.0 / 3.0;
    let h = 3f64.sqrt() / 3.0;
    uniform(vec![
        Affine::scale_translate(t, 2.0 / 3.0, 0.0),
        Affine::scale_translate(t, 4.0 / 3.0, 0.0),
        Affine::scale_translate(t, 1.0 / 3.0, h),
        Affine::scale_translate(t, 5.0 / 3.0, h),
        Affine::scale_translate(t, 2.0 / 3.0, 2.0 * h),
        Affine::scale_translate(t, 4.0 / 3.0, 2.0 * h),
    ])
}

/// Barnsley fern.
fn fern() -> Vec<(f64, Affine)> {
    vec![
        (0.01, Affine::new(0.0, 0.0, 0.0, 0.0, 0.16, 0.0)),
        (0.85, Affine::new(0.85, 0.04, 0.0, -0.04, 0.85, 1.6)),
        (0.07, Affine::new(0.20, -0.26, 0.0, 0.23, 0.22, 1.6)),
        (0.07, Affine::new(-0.15, 0.28, 0.0, 0.26, 0.24, 0.44)),
    ]
}

/// Heighway dragon.
fn dragon() -> Vec<(f64, Affine)> {
    uniform(vec![
        Affine::new(0.5, -0.5, 1.0, 0.5, 0.5, 0.0),
        Affine::new(0.5, -0.5, -1.0, 0.5, 0.5, 0.0),
    ])
}

/// Sierpinski carpet: every ninth of the square except the middle.
fn carpet() -> Vec<(f64, Affine)> {
    let t = 1.0 / 3.0;
    let cells = [
        (0.0, 0.0),
        (1.0, 0.0),
        (2.0, 0.0),
        (0.0, 1.0),
        (2.0, 1.0),
        (0.0, 2.0),
        (1.0, 2.0),
        (2.0, 2.0),
    ];
    uniform(
        cells
            .iter()
            .map(|&(col, row)| Affine::scale_translate(t, col * t, row * t))
            .collect(),
    )
}

/// The letters M, A, T, H drawn with rotated and scaled copies.
fn math() -> Vec<(f64, Affine)> {
    let big = 1.0 / 4.6;
    let small = 1.0 / 9.2;
    uniform(vec![
        Affine::similarity(big, FRAC_PI_2, big, 0.0),
        Affine::similarity(small, -FRAC_PI_4, 0.18, 0.87),
        Affine::similarity(small, FRAC_PI_4, 0.5, 0.5),
        Affine::similarity(big, FRAC_PI_2, 1.0, 0.0),
        Affine::similarity(big, FRAC_PI_3, 1.4, 0.0),
        Affine::similarity(small, 0.0, 1.6, 0.37),
        Affine::similarity(big, -FRAC_PI_3, 1.9, 0.8),
        Affine::similarity(big, 0.0, 2.4, 0.75),
        Affine::similarity(big, FRAC_PI_2, 3.1, 0.0),
        Affine::similarity(big, FRAC_PI_2, 3.8, 0.0),
        Affine::similarity(small, 0.0, 3.8, 0.5),
        Affine::similarity(big, FRAC_PI_2, 4.4, 0.0),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{drop_warm_up, run, DEFAULT_WARM_UP};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_preset_builds() {
        for fractal in Fractal::ALL {
            let preset = fractal.preset().unwrap();
            assert!(!preset.rules.is_empty(), "{fractal} has no rules");
            assert_eq!(preset.fractal, fractal);
        }
    }

    #[test]
    fn rule_counts() {
        let counts: Vec<usize> = Fractal::ALL
            .iter()
            .map(|f| f.preset().unwrap().rules.len())
            .collect();
        assert_eq!(counts, vec![3, 6, 4, 2, 8, 12]);
    }

    #[test]
    fn labels_cover_each_rule_once() {
        for fractal in Fractal::ALL {
            let preset = fractal.preset().unwrap();
            let mut labels: Vec<usize> = preset.rules.iter().map(|r| *r.label()).collect();
            labels.sort_unstable();
            let expected: Vec<usize> = (0..preset.rules.len()).collect();
            assert_eq!(labels, expected, "{fractal}");
        }
    }

    #[test]
    fn fern_keeps_rare_stem_rule_first() {
        let preset = Fractal::Fern.preset().unwrap();
        let first = preset.rules.iter().next().unwrap();
        assert_eq!(*first.label(), 0);
        assert!((first.probability() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn attractors_stay_inside_their_frames() {
        for fractal in Fractal::ALL {
            let preset = fractal.preset().unwrap();
            let frame = preset.viewport.padded(0.05);
            let entries = drop_warm_up(
                run(&preset.rules, [0.1, 0.1], 20_000, StdRng::seed_from_u64(17)),
                DEFAULT_WARM_UP,
            );
            for entry in entries {
                assert!(
                    frame.contains(&entry.point),
                    "{fractal} point {:?} outside {:?}",
                    entry.point,
                    preset.viewport
                );
            }
        }
    }
}
