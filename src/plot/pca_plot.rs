//! PC1/PC2 scatter plot of samples, rendered to SVG

use std::f64::consts::PI;
use std::path::Path;

use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use super::aesthetics::TreatmentAesthetic;
use super::palette::{FillMode, Geometry, PaletteColor};
use crate::data::SampleMetadata;
use crate::error::{DgeError, Result};
use crate::model::PcaResult;

/// Plot appearance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Marker radius in pixels
    pub point_size: i32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: "PCA of transformed expression".to_string(),
            width: 800,
            height: 600,
            point_size: 7,
        }
    }
}

impl PlotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width < 100 || self.height < 100 || self.point_size <= 0 {
            return Err(DgeError::InvalidConfig {
                reason: format!(
                    "plot must be at least 100x100 with positive point size, got {}x{} size {}",
                    self.width, self.height, self.point_size
                ),
            });
        }
        Ok(())
    }
}

/// Axis title, e.g. `PC1: 42% variance`
pub fn axis_label(component: usize, fraction: f64) -> String {
    format!("PC{}: {}% variance", component, (fraction * 100.0).round())
}

/// One row of the PCA coordinates output
#[derive(Debug, Clone, Serialize)]
pub struct PcaPoint {
    pub sample: String,
    pub condition: String,
    #[serde(rename = "PC1")]
    pub pc1: f64,
    #[serde(rename = "PC2")]
    pub pc2: f64,
}

/// Join PCA coordinates with sample conditions
pub fn pca_points(pca: &PcaResult, samples: &SampleMetadata) -> Result<Vec<PcaPoint>> {
    pca.sample_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let condition = samples.condition_of(id).ok_or_else(|| DgeError::SampleMismatch {
                reason: format!("PCA sample '{}' is not in the metadata", id),
            })?;
            Ok(PcaPoint {
                sample: id.clone(),
                condition: condition.to_string(),
                pc1: pca.pc1[i],
                pc2: pca.pc2[i],
            })
        })
        .collect()
}

fn marker_vertices(geometry: Geometry, size: i32) -> Vec<(i32, i32)> {
    let s = size as f64;
    let polar = |n: usize, offset: f64| -> Vec<(i32, i32)> {
        (0..n)
            .map(|k| {
                let angle = offset + 2.0 * PI * k as f64 / n as f64;
                ((s * angle.cos()).round() as i32, (s * angle.sin()).round() as i32)
            })
            .collect()
    };
    match geometry {
        Geometry::Circle => polar(24, 0.0),
        Geometry::Square => vec![(-size, -size), (size, -size), (size, size), (-size, size)],
        // pixel y grows downward, so -PI/2 puts the apex on top
        Geometry::Triangle => polar(3, -PI / 2.0),
        Geometry::Diamond => polar(4, -PI / 2.0),
    }
}

fn rgb(color: &PaletteColor) -> RGBColor {
    RGBColor(color.rgb.0, color.rgb.1, color.rgb.2)
}

fn marker_styles(aes: &TreatmentAesthetic) -> (ShapeStyle, ShapeStyle) {
    let outline = rgb(&aes.outline);
    let fill = match aes.shape.fill_mode {
        FillMode::Open => TRANSPARENT.filled(),
        FillMode::Solid => outline.filled(),
        FillMode::Fillable => rgb(&aes.fill).filled(),
    };
    (fill, outline.stroke_width(1))
}

fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return -1.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.1 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

fn plot_error<E: std::fmt::Display>(e: E) -> DgeError {
    DgeError::Plot {
        reason: e.to_string(),
    }
}

/// Render the PCA scatter to an SVG file, one legend entry per treatment
pub fn render_pca_plot<P: AsRef<Path>>(
    pca: &PcaResult,
    samples: &SampleMetadata,
    aesthetics: &[TreatmentAesthetic],
    config: &PlotConfig,
    path: P,
) -> Result<()> {
    let points = pca_points(pca, samples)?;

    let root = SVGBackend::new(path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(
            padded_range(points.iter().map(|p| p.pc1)),
            padded_range(points.iter().map(|p| p.pc2)),
        )
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(axis_label(1, pca.percent_variance[0]))
        .y_desc(axis_label(2, pca.percent_variance[1]))
        .draw()
        .map_err(plot_error)?;

    for aes in aesthetics {
        let coords: Vec<(f64, f64)> = points
            .iter()
            .filter(|p| p.condition == aes.label)
            .map(|p| (p.pc1, p.pc2))
            .collect();
        if coords.is_empty() {
            continue;
        }

        let vertices = marker_vertices(aes.shape.geometry, config.point_size);
        let mut outline_path = vertices.clone();
        outline_path.push(vertices[0]);
        let (fill_style, outline_style) = marker_styles(aes);

        let legend_vertices = marker_vertices(aes.shape.geometry, 5);
        let mut legend_path = legend_vertices.clone();
        legend_path.push(legend_vertices[0]);

        chart
            .draw_series(coords.into_iter().map(|c| {
                EmptyElement::at(c)
                    + Polygon::new(vertices.clone(), fill_style)
                    + PathElement::new(outline_path.clone(), outline_style)
            }))
            .map_err(plot_error)?
            .label(aes.label.clone())
            .legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + Polygon::new(legend_vertices.clone(), fill_style)
                    + PathElement::new(legend_path.clone(), outline_style)
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    log::info!("Wrote PCA plot to {}", path.as_ref().display());
    Ok(())
}
