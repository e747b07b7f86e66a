//! Treatment aesthetics and the PCA scatter plot

mod aesthetics;
mod palette;
mod pca_plot;

pub use aesthetics::{build_aesthetics, AestheticRecord, TreatmentAesthetic, TreatmentStyle, TreatmentStyles};
pub use palette::{
    color_by_name, shape_by_description, FillMode, Geometry, MarkerShape, PaletteColor, COLOR_PALETTE,
    SHAPE_PALETTE,
};
pub use pca_plot::{axis_label, pca_points, render_pca_plot, PcaPoint, PlotConfig};
