//! Partial dependence curve renderer

use super::{colors, draw_frame, draw_line, draw_vertical_line, PlotConfig};
use crate::error::{PardepError, Result};
use crate::explainability::{IceResult, PdpResult};
use image::{Rgb, RgbImage};

/// Renders a 1D partial dependence curve with its spread band and an
/// optional sample of ICE curves behind it.
pub struct CurvePlot {
    config: PlotConfig,
    curve_color: Rgb<u8>,
    /// Maximum number of ICE curves drawn
    max_ice_curves: usize,
    /// Shade the mean ± std band
    draw_band: bool,
}

impl Default for CurvePlot {
    fn default() -> Self {
        Self::new()
    }
}

impl CurvePlot {
    pub fn new() -> Self {
        Self {
            config: PlotConfig::default(),
            curve_color: colors::CURVE_BLUE,
            max_ice_curves: 50,
            draw_band: true,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config = PlotConfig::new(width, height);
        self
    }

    pub fn with_curve_color(mut self, color: Rgb<u8>) -> Self {
        self.curve_color = color;
        self
    }

    pub fn with_max_ice_curves(mut self, n: usize) -> Self {
        self.max_ice_curves = n;
        self
    }

    pub fn with_band(mut self, draw_band: bool) -> Self {
        self.draw_band = draw_band;
        self
    }

    /// Render the curve; ICE curves are drawn behind the average when given.
    pub fn render(&self, pdp: &PdpResult, ice: Option<&IceResult>) -> Result<RgbImage> {
        let n_grid = pdp.grid_values.len();
        if n_grid < 2 {
            return Err(PardepError::RenderError(
                "need at least 2 grid points to draw a curve".to_string(),
            ));
        }
        if pdp.average_predictions.len() != n_grid || pdp.std_predictions.len() != n_grid {
            return Err(PardepError::RenderError(
                "grid and prediction lengths disagree".to_string(),
            ));
        }

        let mut img =
            RgbImage::from_pixel(self.config.width, self.config.height, self.config.background);

        let x_min = pdp.grid_values[0];
        let x_max = pdp.grid_values[n_grid - 1];
        let (y_min, y_max) = self.value_range(pdp, ice);

        let (px0, py0, px1, py1) = self.config.plot_area();
        let to_px = |v: f64| -> f64 {
            let t = if x_max > x_min { (v - x_min) / (x_max - x_min) } else { 0.5 };
            px0 as f64 + t * (px1 - px0) as f64
        };
        let to_py = |v: f64| -> f64 {
            let t = if y_max > y_min { (v - y_min) / (y_max - y_min) } else { 0.5 };
            py1 as f64 - t * (py1 - py0) as f64
        };

        draw_frame(&mut img, &self.config, 5);

        if self.draw_band {
            // Column-by-column fill between mean-std and mean+std
            for seg in 0..n_grid - 1 {
                let (xa, xb) = (pdp.grid_values[seg], pdp.grid_values[seg + 1]);
                let pxa = to_px(xa).round() as u32;
                let pxb = to_px(xb).round() as u32;
                for px in pxa..=pxb.min(px1) {
                    let t = if pxb > pxa {
                        (px - pxa) as f64 / (pxb - pxa) as f64
                    } else {
                        0.0
                    };
                    let mean = lerp(pdp.average_predictions[seg], pdp.average_predictions[seg + 1], t);
                    let std = lerp(pdp.std_predictions[seg], pdp.std_predictions[seg + 1], t);
                    let top = to_py(mean + std).round().max(py0 as f64) as u32;
                    let bottom = to_py(mean - std).round().min(py1 as f64) as u32;
                    draw_vertical_line(&mut img, px, top, bottom, colors::BAND_BLUE);
                }
            }
        }

        if let Some(ice) = ice {
            let n_curves = ice.individual_predictions.len();
            let stride = (n_curves / self.max_ice_curves.max(1)).max(1);
            for curve in ice.individual_predictions.iter().step_by(stride) {
                if curve.len() != n_grid {
                    continue;
                }
                for seg in 0..n_grid - 1 {
                    draw_line(
                        &mut img,
                        to_px(pdp.grid_values[seg]),
                        to_py(curve[seg]),
                        to_px(pdp.grid_values[seg + 1]),
                        to_py(curve[seg + 1]),
                        colors::ICE_GRAY,
                    );
                }
            }
        }

        // Average curve on top, thickened by a vertical neighbor pass
        for seg in 0..n_grid - 1 {
            let (xa, ya) = (to_px(pdp.grid_values[seg]), to_py(pdp.average_predictions[seg]));
            let (xb, yb) = (
                to_px(pdp.grid_values[seg + 1]),
                to_py(pdp.average_predictions[seg + 1]),
            );
            draw_line(&mut img, xa, ya, xb, yb, self.curve_color);
            draw_line(&mut img, xa, ya + 1.0, xb, yb + 1.0, self.curve_color);
        }

        Ok(img)
    }

    fn value_range(&self, pdp: &PdpResult, ice: Option<&IceResult>) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;

        for (avg, std) in pdp
            .average_predictions
            .iter()
            .zip(pdp.std_predictions.iter())
        {
            let band = if self.draw_band { *std } else { 0.0 };
            lo = lo.min(avg - band);
            hi = hi.max(avg + band);
        }
        if let Some(ice) = ice {
            for curve in &ice.individual_predictions {
                for &v in curve {
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
            }
        }

        // 5% headroom so curves stay off the frame
        let pad = (hi - lo).abs().max(1e-12) * 0.05;
        (lo - pad, hi + pad)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pdp() -> PdpResult {
        PdpResult {
            feature_index: 0,
            feature_name: Some("MedInc".to_string()),
            grid_values: (0..20).map(|i| i as f64 * 0.5).collect(),
            average_predictions: (0..20).map(|i| (i as f64 * 0.3).sin() + 2.0).collect(),
            std_predictions: vec![0.2; 20],
        }
    }

    #[test]
    fn test_render_dimensions() {
        let plot = CurvePlot::new().with_size(320, 240);
        let img = plot.render(&sample_pdp(), None).unwrap();
        assert_eq!(img.width(), 320);
        assert_eq!(img.height(), 240);
    }

    #[test]
    fn test_render_draws_curve() {
        let img = CurvePlot::new().render(&sample_pdp(), None).unwrap();
        let blue = img
            .pixels()
            .filter(|p| **p == colors::CURVE_BLUE)
            .count();
        assert!(blue > 100, "curve pixels missing: {}", blue);
    }

    #[test]
    fn test_render_with_ice() {
        let pdp = sample_pdp();
        let ice = IceResult {
            feature_index: 0,
            feature_name: pdp.feature_name.clone(),
            grid_values: pdp.grid_values.clone(),
            individual_predictions: (0..30)
                .map(|k| {
                    pdp.average_predictions
                        .iter()
                        .map(|v| v + (k as f64 - 15.0) * 0.02)
                        .collect()
                })
                .collect(),
        };
        let img = CurvePlot::new().render(&pdp, Some(&ice)).unwrap();
        let gray = img.pixels().filter(|p| **p == colors::ICE_GRAY).count();
        assert!(gray > 0, "ICE curves missing");
    }

    #[test]
    fn test_degenerate_grid_rejected() {
        let pdp = PdpResult {
            feature_index: 0,
            feature_name: None,
            grid_values: vec![1.0],
            average_predictions: vec![1.0],
            std_predictions: vec![0.0],
        };
        assert!(CurvePlot::new().render(&pdp, None).is_err());
    }
}
