use geo::Polygon;
use geojson::JsonObject;
use serde::{de, Deserialize, Deserializer};

/// `type_local` values of the DVF extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum PropertyType {
    House,
    Apartment,
    Industrial,
    Other,
}

impl PropertyType {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Maison" => PropertyType::House,
            "Appartement" => PropertyType::Apartment,
            "Local industriel. commercial ou assimilé" => PropertyType::Industrial,
            _ => PropertyType::Other,
        }
    }
}

impl From<Option<String>> for PropertyType {
    fn from(label: Option<String>) -> Self {
        label.as_deref().map_or(PropertyType::Other, PropertyType::from_label)
    }
}

/// One row of `foncier_qp.csv`. Other columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub nom_commune: String,
    pub type_local: PropertyType,
    #[serde(default, deserialize_with = "deserialize_sale_value")]
    pub valeur_fonciere: Option<f64>,
}

/// Cell contents read as "no value", as pandas' `read_csv` does.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Missing markers and non-finite numbers become `None`; anything else
/// that is not a number is an error.
fn deserialize_sale_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) if MISSING_MARKERS.contains(&raw) => return Ok(None),
        Some(raw) => raw,
    };
    let value: f64 = raw.parse()
        .map_err(|_| de::Error::custom(format!("invalid sale value '{}'", raw)))?;
    Ok(Some(value).filter(|v| v.is_finite()))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommuneStats {
    pub transaction_number: u32,
    pub house_number: u32,
    pub indus_number: u32,
    pub app_number: u32,
    /// Mean over the rows that carry a value; 0 when none do.
    pub mean_value: f64,
}

impl CommuneStats {
    /// Rounded half to even, then suffixed with the euro sign.
    pub fn mean_value_label(&self) -> String {
        format!("{}€", self.mean_value.round_ties_even() as i64)
    }
}

#[derive(Debug, Clone)]
pub struct Commune {
    pub name: String,
    /// Single outer ring, lon/lat until projected, Web Mercator after.
    pub geometry: Polygon<f64>,
    /// Properties as read from the GeoJSON feature.
    pub properties: JsonObject,
    pub stats: CommuneStats,
}
