//! 2D partial dependence heatmap renderer

use super::{draw_frame, value_to_heatmap_color, PlotConfig};
use crate::error::{PardepError, Result};
use crate::explainability::Pdp2dResult;
use image::RgbImage;

/// Renders the 2D interaction surface as a heatmap: feature 1 on the x
/// axis, feature 2 on the y axis (increasing upward), color by averaged
/// prediction.
pub struct HeatmapPlot {
    config: PlotConfig,
    /// Quantize colors into this many bands (0 = continuous)
    levels: usize,
}

impl Default for HeatmapPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatmapPlot {
    pub fn new() -> Self {
        Self {
            config: PlotConfig::default(),
            levels: 0,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config = PlotConfig::new(width, height);
        self
    }

    /// Band the colormap into discrete levels, contour-style
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    pub fn render(&self, surface: &Pdp2dResult) -> Result<RgbImage> {
        let n1 = surface.grid_values_1.len();
        let n2 = surface.grid_values_2.len();
        if n1 < 2 || n2 < 2 {
            return Err(PardepError::RenderError(
                "need at least a 2x2 grid to draw a heatmap".to_string(),
            ));
        }
        if surface.predictions.len() != n1 || surface.predictions.iter().any(|r| r.len() != n2) {
            return Err(PardepError::RenderError(
                "prediction grid shape disagrees with grid values".to_string(),
            ));
        }

        let (z_min, z_max) = z_range(&surface.predictions);
        let span = (z_max - z_min).max(1e-12);

        let mut img =
            RgbImage::from_pixel(self.config.width, self.config.height, self.config.background);
        let (px0, py0, px1, py1) = self.config.plot_area();

        for py in py0..py1 {
            // Screen y increases downward; feature 2 increases upward
            let v = 1.0 - (py - py0) as f64 / (py1 - py0).max(1) as f64;
            for px in px0..px1 {
                let u = (px - px0) as f64 / (px1 - px0).max(1) as f64;
                let z = bilinear(&surface.predictions, u, v);
                let mut t = (z - z_min) / span;
                if self.levels > 1 {
                    t = (t * self.levels as f64).floor() / (self.levels - 1) as f64;
                }
                img.put_pixel(px, py, value_to_heatmap_color(t));
            }
        }

        draw_frame(&mut img, &self.config, 5);

        Ok(img)
    }
}

// Bilinear interpolation over the (n1, n2) grid at unit coordinates.
fn bilinear(grid: &[Vec<f64>], u: f64, v: f64) -> f64 {
    let n1 = grid.len();
    let n2 = grid[0].len();

    let fi = u.clamp(0.0, 1.0) * (n1 - 1) as f64;
    let fj = v.clamp(0.0, 1.0) * (n2 - 1) as f64;
    let i = (fi.floor() as usize).min(n1 - 2);
    let j = (fj.floor() as usize).min(n2 - 2);
    let di = fi - i as f64;
    let dj = fj - j as f64;

    let top = grid[i][j] * (1.0 - di) + grid[i + 1][j] * di;
    let bottom = grid[i][j + 1] * (1.0 - di) + grid[i + 1][j + 1] * di;
    top * (1.0 - dj) + bottom * dj
}

fn z_range(grid: &[Vec<f64>]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for row in grid {
        for &v in row {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo, hi)
}
