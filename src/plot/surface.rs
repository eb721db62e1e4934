//! Manual 3D surface renderer
//!
//! Projects the 2D partial dependence grid through a fixed isometric
//! camera and paints cells back-to-front, colored by height with a simple
//! slope shade. No text or perspective — the heatmap carries exact values.

use super::{colors, draw_line, fill_triangle, interpolate_color, value_to_heatmap_color, PlotConfig};
use crate::error::{PardepError, Result};
use crate::explainability::Pdp2dResult;
use image::RgbImage;

const ISO_COS: f64 = 0.866;
const ISO_SIN: f64 = 0.5;

/// Renders the interaction surface in 3D.
pub struct SurfacePlot {
    config: PlotConfig,
    /// Vertical exaggeration of the height axis, in unit-square units
    height_scale: f64,
    /// Draw cell edges as a mesh
    draw_mesh: bool,
}

impl Default for SurfacePlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfacePlot {
    pub fn new() -> Self {
        Self {
            config: PlotConfig::default(),
            height_scale: 0.55,
            draw_mesh: true,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config = PlotConfig::new(width, height);
        self
    }

    pub fn with_height_scale(mut self, scale: f64) -> Self {
        self.height_scale = scale.max(0.0);
        self
    }

    pub fn with_mesh(mut self, draw_mesh: bool) -> Self {
        self.draw_mesh = draw_mesh;
        self
    }

    pub fn render(&self, surface: &Pdp2dResult) -> Result<RgbImage> {
        let n1 = surface.grid_values_1.len();
        let n2 = surface.grid_values_2.len();
        if n1 < 2 || n2 < 2 {
            return Err(PardepError::RenderError(
                "need at least a 2x2 grid to draw a surface".to_string(),
            ));
        }
        if surface.predictions.len() != n1 || surface.predictions.iter().any(|r| r.len() != n2) {
            return Err(PardepError::RenderError(
                "prediction grid shape disagrees with grid values".to_string(),
            ));
        }

        let (z_min, z_max) = z_range(&surface.predictions);
        let span = (z_max - z_min).max(1e-12);

        // Normalized heights
        let w: Vec<Vec<f64>> = surface
            .predictions
            .iter()
            .map(|row| row.iter().map(|&z| (z - z_min) / span).collect())
            .collect();

        // Project every vertex, then fit the projected cloud into the canvas
        let project = |i: usize, j: usize| -> (f64, f64) {
            let u = i as f64 / (n1 - 1) as f64;
            let v = j as f64 / (n2 - 1) as f64;
            let sx = (u - v) * ISO_COS;
            let sy = (u + v) * ISO_SIN - w[i][j] * self.height_scale;
            (sx, sy)
        };

        let mut sx_min = f64::INFINITY;
        let mut sx_max = f64::NEG_INFINITY;
        let mut sy_min = f64::INFINITY;
        let mut sy_max = f64::NEG_INFINITY;
        for i in 0..n1 {
            for j in 0..n2 {
                let (sx, sy) = project(i, j);
                sx_min = sx_min.min(sx);
                sx_max = sx_max.max(sx);
                sy_min = sy_min.min(sy);
                sy_max = sy_max.max(sy);
            }
        }

        let (px0, py0, px1, py1) = self.config.plot_area();
        let sx_span = (sx_max - sx_min).max(1e-12);
        let sy_span = (sy_max - sy_min).max(1e-12);
        let to_screen = |(sx, sy): (f64, f64)| -> (f64, f64) {
            (
                px0 as f64 + (sx - sx_min) / sx_span * (px1 - px0) as f64,
                py0 as f64 + (sy - sy_min) / sy_span * (py1 - py0) as f64,
            )
        };

        let mut img =
            RgbImage::from_pixel(self.config.width, self.config.height, self.config.background);

        // Painter's order: cells with larger u+v sit nearer the camera and
        // must be drawn last.
        let mut cells: Vec<(usize, usize)> = (0..n1 - 1)
            .flat_map(|i| (0..n2 - 1).map(move |j| (i, j)))
            .collect();
        cells.sort_by_key(|&(i, j)| i + j);

        for (i, j) in cells {
            let p00 = to_screen(project(i, j));
            let p10 = to_screen(project(i + 1, j));
            let p11 = to_screen(project(i + 1, j + 1));
            let p01 = to_screen(project(i, j + 1));

            let mean_w = (w[i][j] + w[i + 1][j] + w[i][j + 1] + w[i + 1][j + 1]) / 4.0;
            let base = value_to_heatmap_color(mean_w);

            // Lambert-ish shade from the cell's height gradients
            let dz_u = ((w[i + 1][j] + w[i + 1][j + 1]) - (w[i][j] + w[i][j + 1])) / 2.0
                * self.height_scale
                * (n1 - 1) as f64;
            let dz_v = ((w[i][j + 1] + w[i + 1][j + 1]) - (w[i][j] + w[i + 1][j])) / 2.0
                * self.height_scale
                * (n2 - 1) as f64;
            let norm = (dz_u * dz_u + dz_v * dz_v + 1.0).sqrt();
            let brightness = ((0.35 * dz_u - 0.2 * dz_v + 1.0) / norm).clamp(0.45, 1.0);
            let fill = interpolate_color(colors::BLACK, base, 0.35 + 0.65 * brightness);

            fill_triangle(&mut img, p00, p10, p11, fill);
            fill_triangle(&mut img, p00, p11, p01, fill);

            if self.draw_mesh {
                let edge = interpolate_color(colors::BLACK, base, 0.45);
                draw_line(&mut img, p00.0, p00.1, p10.0, p10.1, edge);
                draw_line(&mut img, p00.0, p00.1, p01.0, p01.1, edge);
                if i == n1 - 2 {
                    draw_line(&mut img, p10.0, p10.1, p11.0, p11.1, edge);
                }
                if j == n2 - 2 {
                    draw_line(&mut img, p01.0, p01.1, p11.0, p11.1, edge);
                }
            }
        }

        Ok(img)
    }
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
