//! Fixed color and marker-shape palettes

use serde::Serialize;

use crate::error::{DgeError, Result};

/// A named color from [`COLOR_PALETTE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteColor {
    pub id: usize,
    pub name: &'static str,
    pub rgb: (u8, u8, u8),
}

impl PaletteColor {
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.rgb.0, self.rgb.1, self.rgb.2)
    }
}

/// Outline geometry of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    Circle,
    Square,
    Triangle,
    Diamond,
}

/// How a marker takes its colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Outline only
    Open,
    /// Interior painted with the outline color
    Solid,
    /// Interior painted with the fill color, border with the outline color
    Fillable,
}

/// A marker from [`SHAPE_PALETTE`]; ids follow R's `pch` numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerShape {
    pub id: u8,
    pub description: &'static str,
    pub geometry: Geometry,
    pub fill_mode: FillMode,
}

pub const COLOR_PALETTE: &[(usize, &str, (u8, u8, u8))] = &[
    (1, "white", (255, 255, 255)),
    (2, "black", (0, 0, 0)),
    (3, "red", (255, 0, 0)),
    (4, "green", (0, 255, 0)),
    (5, "blue", (0, 0, 255)),
    (6, "purple", (160, 32, 240)),
    (7, "orange", (255, 165, 0)),
    (8, "grey", (190, 190, 190)),
    (9, "darkgreen", (0, 100, 0)),
    (10, "firebrick", (178, 34, 34)),
    (11, "steelblue", (70, 130, 180)),
    (12, "gold", (255, 215, 0)),
    (13, "cyan", (0, 255, 255)),
    (14, "magenta", (255, 0, 255)),
    (15, "brown", (165, 42, 42)),
    (16, "navy", (0, 0, 128)),
];

pub const SHAPE_PALETTE: &[MarkerShape] = &[
    MarkerShape { id: 0, description: "square", geometry: Geometry::Square, fill_mode: FillMode::Open },
    MarkerShape { id: 1, description: "circle", geometry: Geometry::Circle, fill_mode: FillMode::Open },
    MarkerShape { id: 2, description: "triangle", geometry: Geometry::Triangle, fill_mode: FillMode::Open },
    MarkerShape { id: 5, description: "diamond", geometry: Geometry::Diamond, fill_mode: FillMode::Open },
    MarkerShape { id: 15, description: "filled square", geometry: Geometry::Square, fill_mode: FillMode::Solid },
    MarkerShape { id: 16, description: "filled circle", geometry: Geometry::Circle, fill_mode: FillMode::Solid },
    MarkerShape { id: 17, description: "filled triangle", geometry: Geometry::Triangle, fill_mode: FillMode::Solid },
    MarkerShape { id: 18, description: "filled diamond", geometry: Geometry::Diamond, fill_mode: FillMode::Solid },
    MarkerShape { id: 21, description: "fillable circle", geometry: Geometry::Circle, fill_mode: FillMode::Fillable },
    MarkerShape { id: 22, description: "fillable square", geometry: Geometry::Square, fill_mode: FillMode::Fillable },
    MarkerShape { id: 23, description: "fillable diamond", geometry: Geometry::Diamond, fill_mode: FillMode::Fillable },
    MarkerShape { id: 24, description: "fillable triangle", geometry: Geometry::Triangle, fill_mode: FillMode::Fillable },
];

/// Look up a color by name, ignoring case
pub fn color_by_name(name: &str) -> Result<PaletteColor> {
    COLOR_PALETTE
        .iter()
        .find(|(_, n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|&(id, name, rgb)| PaletteColor { id, name, rgb })
        .ok_or_else(|| DgeError::Palette {
            reason: format!("unknown color '{}'", name),
        })
}

/// Look up a marker by its description, ignoring case
pub fn shape_by_description(description: &str) -> Result<MarkerShape> {
    SHAPE_PALETTE
        .iter()
        .find(|s| s.description.eq_ignore_ascii_case(description.trim()))
        .copied()
        .ok_or_else(|| DgeError::Palette {
            reason: format!("unknown marker shape '{}'", description),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        let purple = color_by_name("Purple").unwrap();
        assert_eq!(purple.hex(), "#A020F0");
        assert_eq!(shape_by_description("fillable triangle").unwrap().id, 24);
        assert!(color_by_name("chartreuse-ish").is_err());
        assert!(shape_by_description("star").is_err());
    }

    #[test]
    fn test_palette_ids_unique() {
        for (i, (id, name, _)) in COLOR_PALETTE.iter().enumerate() {
            assert!(COLOR_PALETTE[..i].iter().all(|(other, n, _)| other != id && n != name));
        }
        for (i, shape) in SHAPE_PALETTE.iter().enumerate() {
            assert!(SHAPE_PALETTE[..i].iter().all(|s| s.id != shape.id));
        }
    }
}
