//! Raster rendering of partial dependence results
//!
//! Charts are drawn directly onto RGB images: 1D curves with an ICE band,
//! a 2D heatmap, and a manually projected 3D surface. Numeric annotation
//! lives in the JSON the pipeline writes next to the images.

mod heatmap;
mod line;
mod surface;

pub use heatmap::HeatmapPlot;
pub use line::CurvePlot;
pub use surface::SurfacePlot;

use crate::error::Result;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Common color definitions
pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const AXIS_GRAY: Rgb<u8> = Rgb([90, 90, 90]);
    pub const GRID_GRAY: Rgb<u8> = Rgb([225, 225, 225]);
    pub const ICE_GRAY: Rgb<u8> = Rgb([190, 190, 190]);
    pub const CURVE_BLUE: Rgb<u8> = Rgb([33, 113, 181]);
    pub const BAND_BLUE: Rgb<u8> = Rgb([198, 219, 239]);
    pub const CURVE_ORANGE: Rgb<u8> = Rgb([230, 120, 30]);
}

/// Canvas configuration shared by all renderers
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub margin: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            background: colors::WHITE,
            margin: 48,
        }
    }
}

impl PlotConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Drawable area after margins: (x0, y0, x1, y1), y grows downward.
    pub(crate) fn plot_area(&self) -> (u32, u32, u32, u32) {
        (
            self.margin,
            self.margin,
            self.width.saturating_sub(self.margin),
            self.height.saturating_sub(self.margin),
        )
    }
}

/// Save an image as PNG, creating parent directories.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    Ok(())
}

/// Helper function to draw a vertical line
pub(crate) fn draw_vertical_line(img: &mut RgbImage, x: u32, y1: u32, y2: u32, color: Rgb<u8>) {
    let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    let img_height = img.height();
    let img_width = img.width();

    if x < img_width {
        for y in start..=end.min(img_height - 1) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Helper function to draw a horizontal line
pub(crate) fn draw_horizontal_line(img: &mut RgbImage, y: u32, x1: u32, x2: u32, color: Rgb<u8>) {
    let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let img_width = img.width();
    let img_height = img.height();

    if y < img_height {
        for x in start..=end.min(img_width - 1) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Draw an arbitrary line segment (DDA walk)
pub(crate) fn draw_line(img: &mut RgbImage, x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb<u8>) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let steps = dx.abs().max(dy.abs()).ceil() as usize;
    if steps == 0 {
        put_pixel_clipped(img, x1.round() as i64, y1.round() as i64, color);
        return;
    }
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let x = x1 + dx * t;
        let y = y1 + dy * t;
        put_pixel_clipped(img, x.round() as i64, y.round() as i64, color);
    }
}

/// Fill a triangle by scanline
pub(crate) fn fill_triangle(
    img: &mut RgbImage,
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    color: Rgb<u8>,
) {
    let min_y = p1.1.min(p2.1).min(p3.1).floor().max(0.0) as i64;
    let max_y = p1.1.max(p2.1).max(p3.1).ceil().min(img.height() as f64 - 1.0) as i64;

    for y in min_y..=max_y {
        let yc = y as f64 + 0.5;
        let mut xs: Vec<f64> = Vec::with_capacity(3);
        for (a, b) in [(p1, p2), (p2, p3), (p3, p1)] {
            let (ya, yb) = (a.1, b.1);
            if (ya <= yc && yb > yc) || (yb <= yc && ya > yc) {
                let t = (yc - ya) / (yb - ya);
                xs.push(a.0 + t * (b.0 - a.0));
            }
        }
        if xs.len() < 2 {
            continue;
        }
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let x_start = xs[0].floor().max(0.0) as i64;
        let x_end = xs[xs.len() - 1].ceil().min(img.width() as f64 - 1.0) as i64;
        for x in x_start..=x_end {
            put_pixel_clipped(img, x, y, color);
        }
    }
}

fn put_pixel_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Interpolate between two colors
pub(crate) fn interpolate_color(c1: Rgb<u8>, c2: Rgb<u8>, t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    Rgb([
        ((1.0 - t) * c1.0[0] as f64 + t * c2.0[0] as f64) as u8,
        ((1.0 - t) * c1.0[1] as f64 + t * c2.0[1] as f64) as u8,
        ((1.0 - t) * c1.0[2] as f64 + t * c2.0[2] as f64) as u8,
    ])
}

/// Color for a value in [0, 1]: dark blue through cyan and yellow to red
pub(crate) fn value_to_heatmap_color(value: f64) -> Rgb<u8> {
    let v = value.clamp(0.0, 1.0);

    if v < 0.25 {
        let t = v / 0.25;
        interpolate_color(Rgb([13, 8, 135]), Rgb([0, 140, 255]), t)
    } else if v < 0.5 {
        let t = (v - 0.25) / 0.25;
        interpolate_color(Rgb([0, 140, 255]), Rgb([0, 220, 180]), t)
    } else if v < 0.75 {
        let t = (v - 0.5) / 0.25;
        interpolate_color(Rgb([0, 220, 180]), Rgb([250, 220, 0]), t)
    } else {
        let t = (v - 0.75) / 0.25;
        interpolate_color(Rgb([250, 220, 0]), Rgb([220, 50, 30]), t)
    }
}

/// Axis frame with tick marks and faint gridlines
pub(crate) fn draw_frame(img: &mut RgbImage, config: &PlotConfig, n_ticks: u32) {
    let (x0, y0, x1, y1) = config.plot_area();

    for i in 1..n_ticks {
        let tx = x0 + (x1 - x0) * i / n_ticks;
        let ty = y0 + (y1 - y0) * i / n_ticks;
        draw_vertical_line(img, tx, y0, y1, colors::GRID_GRAY);
        draw_horizontal_line(img, ty, x0, x1, colors::GRID_GRAY);
    }

    draw_vertical_line(img, x0, y0, y1, colors::AXIS_GRAY);
    draw_horizontal_line(img, y1, x0, x1, colors::AXIS_GRAY);

    for i in 0..=n_ticks {
        let tx = x0 + (x1 - x0) * i / n_ticks;
        let ty = y0 + (y1 - y0) * i / n_ticks;
        draw_vertical_line(img, tx, y1, (y1 + 4).min(img.height() - 1), colors::AXIS_GRAY);
        draw_horizontal_line(img, ty, x0.saturating_sub(4), x0, colors::AXIS_GRAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_color() {
        let c1 = Rgb([0, 0, 0]);
        let c2 = Rgb([255, 255, 255]);

        let mid = interpolate_color(c1, c2, 0.5);
        assert_eq!(mid.0[0], 127);
        assert_eq!(mid.0[1], 127);
        assert_eq!(mid.0[2], 127);
    }

    #[test]
    fn test_heatmap_color_endpoints() {
        assert_eq!(value_to_heatmap_color(0.0), Rgb([13, 8, 135]));
        assert_eq!(value_to_heatmap_color(1.0), Rgb([220, 50, 30]));
    }

    #[test]
    fn test_fill_triangle_inside() {
        let mut img = RgbImage::from_pixel(20, 20, colors::WHITE);
        fill_triangle(&mut img, (2.0, 2.0), (17.0, 2.0), (2.0, 17.0), colors::BLACK);
        assert_eq!(*img.get_pixel(5, 5), colors::BLACK);
        assert_eq!(*img.get_pixel(18, 18), colors::WHITE);
    }

    #[test]
    fn test_draw_line_endpoints() {
        let mut img = RgbImage::from_pixel(10, 10, colors::WHITE);
        draw_line(&mut img, 1.0, 1.0, 8.0, 8.0, colors::BLACK);
        assert_eq!(*img.get_pixel(1, 1), colors::BLACK);
        assert_eq!(*img.get_pixel(8, 8), colors::BLACK);
    }
}
