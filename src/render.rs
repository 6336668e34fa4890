use crate::config::FigureConfig;
use crate::language::Language;
use crate::types::Commune;
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// ColorBrewer YlOrRd, 9 classes, darkest first.
pub const PALETTE: [&str; 9] = [
    "#800026", "#bd0026", "#e31a1c", "#fc4e2a", "#fd8d3c",
    "#feb24c", "#fed976", "#ffeda0", "#ffffcc",
];

/// Linear mapping of a value in `[low, high]` onto `PALETTE`.
#[derive(Debug, Clone, Copy)]
pub struct ColorMapper {
    pub low: f64,
    pub high: f64,
}

impl ColorMapper {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn index_for(&self, value: f64) -> usize {
        let last = PALETTE.len() - 1;
        // `high` itself (and a degenerate range) falls in the last bin.
        if value >= self.high {
            return last;
        }
        if value <= self.low {
            return 0;
        }
        let normed = (value - self.low) / (self.high - self.low);
        ((normed * PALETTE.len() as f64).floor() as usize).min(last)
    }

    pub fn color_for(&self, value: f64) -> &'static str {
        PALETTE[self.index_for(value)]
    }

    /// Lower bound of each palette bin.
    pub fn bins(&self) -> Vec<(f64, &'static str)> {
        let step = (self.high - self.low) / PALETTE.len() as f64;
        PALETTE.iter()
            .enumerate()
            .map(|(i, color)| (self.low + step * i as f64, *color))
            .collect()
    }
}

/// GeoJSON of the projected communes, carrying the properties read from the
/// input plus the computed statistics and fill color.
pub fn build_feature_collection(communes: &[Commune], mapper: &ColorMapper) -> FeatureCollection {
    let features = communes.iter().map(|commune| {
        let stats = &commune.stats;
        let mut properties: JsonObject = commune.properties.clone();
        properties.insert("commune_name".to_string(), json!(commune.name));
        properties.insert("transaction_number".to_string(), json!(stats.transaction_number));
        properties.insert("house_number".to_string(), json!(stats.house_number));
        properties.insert("indus_number".to_string(), json!(stats.indus_number));
        properties.insert("app_number".to_string(), json!(stats.app_number));
        properties.insert("mean_value".to_string(), json!(stats.mean_value_label()));
        properties.insert(
            "fill_color".to_string(),
            json!(mapper.color_for(stats.transaction_number as f64)),
        );

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&commune.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }).collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn render_html(
    communes: &[Commune],
    max_transaction: u32,
    language: Language,
    config: &FigureConfig,
) -> Result<String> {
    let mapper = ColorMapper::new(0.0, max_transaction as f64);
    let collection = build_feature_collection(communes, &mapper);

    let data = serde_json::to_string(&collection)
        .context("Failed to serialize communes to GeoJSON")?;

    let settings = json!({
        "tooltips": language.tooltips(),
        "size": [config.width, config.height],
        "fill_alpha": config.fill_alpha,
        "line_color": config.line_color,
        "line_width": config.line_width,
        "tile_url": config.tile_url,
        "tile_pixel_ratio": config.tile_pixel_ratio,
        "tile_attribution": config.tile_attribution,
        "extent": [config.x_range[0], config.y_range[0], config.x_range[1], config.y_range[1]],
    });
    let settings = serde_json::to_string(&settings)
        .context("Failed to serialize figure settings")?;

    let title = escape_html(language.title());
    let width = config.width.to_string();
    let height = config.height.to_string();
    let legend = legend_html(&mapper);
    let settings = escape_script(&settings);
    let data = escape_script(&data);

    let html = fill_template(PAGE_TEMPLATE, &[
        ("{{LANG}}", language.code()),
        ("{{TITLE}}", title.as_str()),
        ("{{WIDTH}}", width.as_str()),
        ("{{HEIGHT}}", height.as_str()),
        ("{{LEGEND}}", legend.as_str()),
        ("{{SETTINGS}}", settings.as_str()),
        ("{{DATA}}", data.as_str()),
    ]);

    Ok(html)
}

/// Substitutes every placeholder in a single scan of `template`, so inserted
/// values are never searched for placeholders themselves.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut html = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        html.push_str(&rest[..start]);
        rest = &rest[start..];
        match values.iter().find(|(placeholder, _)| rest.starts_with(*placeholder)) {
            Some((placeholder, value)) => {
                html.push_str(value);
                rest = &rest[placeholder.len()..];
            }
            None => {
                html.push_str("{{");
                rest = &rest[2..];
            }
        }
    }
    html.push_str(rest);
    html
}

/// Writes the page in one go, creating or truncating `path`.
pub fn write_figure(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html)
        .with_context(|| format!("Failed to write figure: {:?}", path))?;
    info!("Figure saved to {:?}", path);
    Ok(())
}

pub fn figure_path(fn_figure: &str) -> PathBuf {
    PathBuf::from(format!("{}.html", fn_figure))
}

fn legend_html(mapper: &ColorMapper) -> String {
    mapper.bins()
        .iter()
        .rev()
        .map(|(lower, color)| format!(
            "<div class=\"legend-row\"><span class=\"swatch\" style=\"background:{}\"></span><span>{}</span></div>",
            color,
            format_tick(*lower)
        ))
        .collect::<Vec<_>>()
        .join("\n      ")
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keeps inline JSON from closing the surrounding `<script>` element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="{{LANG}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/ol@v9.2.4/ol.css" />
  <script src="https://cdn.jsdelivr.net/npm/ol@v9.2.4/dist/ol.js"></script>
  <style>
    body { font-family: Helvetica, Arial, sans-serif; margin: 8px; }
    h3 { font-size: 13px; margin: 0 0 6px 0; }
    .figure { display: flex; align-items: center; gap: 12px; }
    #map { width: {{WIDTH}}px; height: {{HEIGHT}}px; position: relative; }
    .legend { font-size: 11px; }
    .legend-row { display: flex; align-items: center; gap: 6px; height: 22px; }
    .swatch { display: inline-block; width: 18px; height: 22px; }
    #tooltip {
      position: absolute; display: none; pointer-events: none; z-index: 10;
      background: #fff; border: 1px solid #ccc; padding: 6px 8px;
      font-size: 11px; max-width: 320px; box-shadow: 0 1px 4px rgba(0, 0, 0, 0.25);
    }
  </style>
</head>
<body>
  <h3>{{TITLE}}</h3>
  <div class="figure">
    <div id="map"><div id="tooltip"></div></div>
    <div class="legend">
      {{LEGEND}}
    </div>
  </div>
  <script>
    const settings = {{SETTINGS}};
    const data = {{DATA}};

    const format = new ol.format.GeoJSON();
    const source = new ol.source.Vector({
      features: format.readFeatures(data, { dataProjection: 'EPSG:3857', featureProjection: 'EPSG:3857' }),
    });

    const communes = new ol.layer.Vector({
      source,
      style: (feature) => {
        const fill = ol.color.asArray(feature.get('fill_color')).slice();
        fill[3] = settings.fill_alpha;
        return new ol.style.Style({
          fill: new ol.style.Fill({ color: fill }),
          stroke: new ol.style.Stroke({ color: settings.line_color, width: settings.line_width }),
        });
      },
    });

    const map = new ol.Map({
      target: 'map',
      layers: [
        new ol.layer.Tile({
          source: new ol.source.XYZ({
            url: settings.tile_url,
            tilePixelRatio: settings.tile_pixel_ratio,
            attributions: settings.tile_attribution,
          }),
        }),
        communes,
      ],
      view: new ol.View({ projection: 'EPSG:3857' }),
    });
    map.getView().fit(settings.extent, { size: settings.size });

    const tooltip = document.getElementById('tooltip');
    map.on('pointermove', (evt) => {
      const feature = map.forEachFeatureAtPixel(evt.pixel, (f) => f, { layerFilter: (l) => l === communes });
      if (!feature) {
        tooltip.style.display = 'none';
        return;
      }
      tooltip.replaceChildren(...settings.tooltips.map(([label, field]) => {
        const row = document.createElement('div');
        const name = document.createElement('b');
        name.textContent = label + ': ';
        row.append(name, String(feature.get(field)));
        return row;
      }));
      tooltip.style.left = (evt.pixel[0] + 12) + 'px';
      tooltip.style.top = (evt.pixel[1] + 12) + 'px';
      tooltip.style.display = 'block';
    });
  </script>
</body>
</html>
"#;
