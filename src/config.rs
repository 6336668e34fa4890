use serde::Deserialize;
use std::path::Path;
use std::fs;
use anyhow::{Context, Result};

/// Layout and styling of the rendered figure.
///
/// Every field is optional in the TOML file; missing ones fall back to the
/// values of the published hackaviz figure.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
    /// Initial view, Web Mercator metres.
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub fill_alpha: f64,
    pub line_color: String,
    pub line_width: f64,
    pub tile_url: String,
    /// Device pixels per CSS pixel of the tiles served at `tile_url`.
    pub tile_pixel_ratio: u32,
    pub tile_attribution: String,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 550,
            height: 500,
            x_range: [-40000.0, 640000.0],
            y_range: [5300000.0, 5500000.0],
            fill_alpha: 0.5,
            line_color: "black".to_string(),
            line_width: 0.7,
            tile_url: "https://tiles.basemaps.cartocdn.com/light_all/{z}/{x}/{y}@2x.png".to_string(),
            tile_pixel_ratio: 2,
            tile_attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors, &copy; <a href=\"https://carto.com/attributions\">CARTO</a>".to_string(),
        }
    }
}

impl FigureConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: FigureConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Uses the file when one is given, the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}
