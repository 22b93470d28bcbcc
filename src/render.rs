//! Raster output for trajectories: still PNG images and progressive GIF
//! animations, drawn pixel by pixel with plotters.

use std::collections::HashMap;
use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::engine::{Entry, Tag};
use crate::error::{ChaosError, Result};
use crate::point::Point2;

/// Region of the plane mapped onto the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Viewport {
    pub const fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Viewport { x, y }
    }

    /// Smallest viewport holding every point.
    pub fn fit<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Result<Self> {
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for &[x, y] in points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let viewport = Viewport::new((min_x, max_x), (min_y, max_y));
        viewport.validate()?;
        Ok(viewport)
    }

    /// Grows each side by `fraction` of the corresponding extent.
    pub fn padded(&self, fraction: f64) -> Self {
        let dx = (self.x.1 - self.x.0) * fraction;
        let dy = (self.y.1 - self.y.0) * fraction;
        Viewport::new((self.x.0 - dx, self.x.1 + dx), (self.y.0 - dy, self.y.1 + dy))
    }

    pub fn contains(&self, p: &Point2) -> bool {
        (self.x.0..=self.x.1).contains(&p[0]) && (self.y.0..=self.y.1).contains(&p[1])
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |(lo, hi): (f64, f64)| lo.is_finite() && hi.is_finite() && hi > lo;
        if ok(self.x) && ok(self.y) {
            Ok(())
        } else {
            Err(ChaosError::InvalidArgument(format!(
                "viewport {:?} x {:?} has no area",
                self.x, self.y
            )))
        }
    }

    /// Pixel coordinates with the y axis pointing down, or `None` when the
    /// point falls outside the image or the image has no pixel grid that
    /// fits in `i32` coordinates.
    pub fn to_pixel(&self, p: &Point2, width: u32, height: u32) -> Option<(i32, i32)> {
        let right = i32::try_from(width.checked_sub(1)?).ok()?;
        let bottom = i32::try_from(height.checked_sub(1)?).ok()?;
        let [x, y] = *p;
        let fx = (x - self.x.0) / (self.x.1 - self.x.0);
        let fy = (y - self.y.0) / (self.y.1 - self.y.0);
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        // fx, fy in [0, 1] keep both products inside [0, right] and [0, bottom]
        let px = (fx * f64::from(right)).round() as i32;
        let py = (fy * f64::from(bottom)).round() as i32;
        Some((px, bottom - py))
    }
}

/// How hit pixels are shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// Solid label color, like a scatter plot.
    #[default]
    Flat,
    /// Label color faded by log hit count.
    Density,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub shading: Shading,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 800,
            height: 600,
            background: WHITE,
            shading: Shading::Flat,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ChaosError::InvalidArgument(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnimationConfig {
    /// Entries added to the picture per frame.
    pub points_per_frame: usize,
    /// Delay between frames in milliseconds.
    pub frame_delay: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            points_per_frame: 400,
            frame_delay: 20,
        }
    }
}

/// Per-pixel hit count and the color of the latest entry to land there.
#[derive(Debug, Default)]
pub struct Histogram {
    cells: HashMap<(i32, i32), (RGBColor, u32)>,
    max_hits: u32,
}

impl Histogram {
    pub fn add(&mut self, pixel: (i32, i32), color: RGBColor) {
        let cell = self.cells.entry(pixel).or_insert((color, 0));
        cell.0 = color;
        cell.1 += 1;
        self.max_hits = self.max_hits.max(cell.1);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn hits(&self, pixel: (i32, i32)) -> u32 {
        self.cells.get(&pixel).map_or(0, |&(_, hits)| hits)
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, plotters::coord::Shift>,
        shading: Shading,
    ) -> Result<()> {
        let max_hits = f64::from(self.max_hits.max(1));
        for (&pixel, &(color, hits)) in &self.cells {
            match shading {
                Shading::Flat => root.draw_pixel(pixel, &color),
                Shading::Density => {
                    let intensity = f64::from(hits).ln_1p() / max_hits.ln_1p();
                    root.draw_pixel(pixel, &color.mix(intensity))
                }
            }
            .map_err(ChaosError::render)?;
        }
        Ok(())
    }
}

fn accumulate<'a, L: 'a>(
    histogram: &mut Histogram,
    entries: impl IntoIterator<Item = &'a Entry<Point2, L>>,
    viewport: &Viewport,
    config: &RenderConfig,
    color: &impl Fn(&Tag<L>) -> RGBColor,
) {
    for entry in entries {
        if let Some(pixel) = viewport.to_pixel(&entry.point, config.width, config.height) {
            histogram.add(pixel, color(&entry.tag));
        }
    }
}

/// Builds the histogram of `entries` without drawing it.
pub fn histogram<'a, L: 'a>(
    entries: impl IntoIterator<Item = &'a Entry<Point2, L>>,
    viewport: &Viewport,
    config: &RenderConfig,
    color: impl Fn(&Tag<L>) -> RGBColor,
) -> Result<Histogram> {
    config.validate()?;
    viewport.validate()?;
    let mut histogram = Histogram::default();
    accumulate(&mut histogram, entries, viewport, config, &color);
    Ok(histogram)
}

/// Draws every entry as one pixel in its tag's color and writes a PNG.
pub fn render_png<L>(
    path: impl AsRef<Path>,
    entries: &[Entry<Point2, L>],
    viewport: &Viewport,
    config: &RenderConfig,
    color: impl Fn(&Tag<L>) -> RGBColor,
) -> Result<()> {
    let path = path.as_ref();
    let histogram = histogram(entries, viewport, config, color)?;
    debug!(
        path = %path.display(),
        entries = entries.len(),
        pixels = histogram.len(),
        "rendering image"
    );

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&config.background).map_err(ChaosError::render)?;
    histogram.draw(&root, config.shading)?;
    root.present().map_err(ChaosError::render)?;
    Ok(())
}

/// Writes an animated GIF in which the picture builds up
/// `points_per_frame` entries at a time, in generation order.
pub fn render_gif<L>(
    path: impl AsRef<Path>,
    entries: &[Entry<Point2, L>],
    viewport: &Viewport,
    config: &RenderConfig,
    animation: &AnimationConfig,
    color: impl Fn(&Tag<L>) -> RGBColor,
) -> Result<()> {
    config.validate()?;
    viewport.validate()?;
    if animation.points_per_frame == 0 {
        return Err(ChaosError::InvalidArgument(
            "points per frame must be positive".to_string(),
        ));
    }

    let path = path.as_ref();
    let frames = entries.len().div_ceil(animation.points_per_frame);
    debug!(
        path = %path.display(),
        entries = entries.len(),
        frames,
        "rendering animation"
    );

    let root = BitMapBackend::gif(path, (config.width, config.height), animation.frame_delay)
        .map_err(ChaosError::render)?
        .into_drawing_area();

    let mut histogram = Histogram::default();
    for chunk in entries.chunks(animation.points_per_frame) {
        accumulate(&mut histogram, chunk, viewport, config, &color);
        root.fill(&config.background).map_err(ChaosError::render)?;
        histogram.draw(&root, config.shading)?;
        root.present().map_err(ChaosError::render)?;
    }
    Ok(())
}
