use crate::types::{Commune, CommuneStats, Transaction};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use geo::{Geometry, Polygon};
use geojson::{Feature, GeoJson};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub const QP_FILE: &str = "qp.csv";
pub const TRANSACTIONS_FILE: &str = "foncier_qp.csv";
pub const COMMUNES_FILE: &str = "communes.geojson";

#[derive(Debug)]
pub struct InputData {
    pub qp_rows: usize,
    pub transactions: Vec<Transaction>,
    pub communes: Vec<Commune>,
}

pub fn load_data(data_folder: &Path) -> Result<InputData> {
    info!("Loading data from {:?}...", data_folder);

    let qp_rows = count_records(&data_folder.join(QP_FILE))?;

    let transactions = load_transactions(&data_folder.join(TRANSACTIONS_FILE))?;
    info!("Loaded {} transactions", transactions.len());

    let communes = load_communes(&data_folder.join(COMMUNES_FILE))?;
    info!("Loaded geometry for {} communes", communes.len());

    Ok(InputData { qp_rows, transactions, communes })
}

/// Reads every record of a CSV file, returning how many there were.
pub fn count_records(path: &Path) -> Result<usize> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);

    let mut rows = 0;
    for result in rdr.records() {
        result.with_context(|| format!("Failed to parse CSV file: {:?}", path))?;
        rows += 1;
    }
    Ok(rows)
}

pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);

    rdr.deserialize()
        .collect::<Result<Vec<Transaction>, _>>()
        .with_context(|| format!("Failed to parse transactions from {:?}", path))
}

pub fn load_communes(path: &Path) -> Result<Vec<Commune>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let reader = BufReader::new(file);

    let geojson = GeoJson::from_reader(reader)
        .with_context(|| format!("Failed to parse GeoJSON: {:?}", path))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    collection.features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| commune_from_feature(feature).with_context(|| format!("Invalid feature #{}", i)))
        .collect()
}

fn commune_from_feature(feature: Feature) -> Result<Commune> {
    let properties = feature.properties.unwrap_or_default();

    let name = match properties.get("nom_commune") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Err(anyhow!("Feature has no 'nom_commune' property")),
    };

    let geometry = feature.geometry
        .ok_or_else(|| anyhow!("Commune '{}' has no geometry", name))?;
    let geometry: Geometry<f64> = geometry.value.try_into()
        .map_err(|e| anyhow!("Failed to convert geojson geometry of '{}': {:?}", name, e))?;

    let geometry = single_ring_polygon(&name, geometry)?;

    Ok(Commune {
        name,
        geometry,
        properties,
        stats: CommuneStats::default(),
    })
}

/// Only one polygon with one outer ring and no holes is supported.
fn single_ring_polygon(name: &str, geometry: Geometry<f64>) -> Result<Polygon<f64>> {
    let polygon = match geometry {
        Geometry::Polygon(p) => p,
        Geometry::MultiPolygon(mp) => {
            let parts = mp.0.len();
            let mut polygons = mp.0.into_iter();
            match (polygons.next(), parts) {
                (Some(p), 1) => p,
                _ => return Err(anyhow!(
                    "Commune '{}' has a MultiPolygon with {} parts, only single-ring polygons are supported",
                    name, parts
                )),
            }
        }
        _ => return Err(anyhow!("Commune '{}' geometry is not a polygon", name)),
    };

    if !polygon.interiors().is_empty() {
        return Err(anyhow!(
            "Commune '{}' has {} holes, only single-ring polygons are supported",
            name, polygon.interiors().len()
        ));
    }

    Ok(polygon)
}
