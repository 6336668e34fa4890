use crate::types::Commune;
use geo::{Coord, MapCoordsInPlace};
use std::f64::consts::PI;
use tracing::info;

/// WGS84 semi-major axis, metres.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Spherical Web Mercator (EPSG:3857) from longitude/latitude degrees.
/// Poles are not special-cased.
pub fn lon_lat_to_web_mercator(coord: Coord<f64>) -> Coord<f64> {
    let k = EARTH_RADIUS;
    Coord {
        x: coord.x * (k * PI / 180.0),
        y: ((90.0 + coord.y) * PI / 360.0).tan().ln() * k,
    }
}

pub fn project_commune(commune: &mut Commune) {
    commune.geometry.map_coords_in_place(lon_lat_to_web_mercator);
}

pub fn project_communes(communes: &mut [Commune]) {
    info!("Reprojecting {} communes to Web Mercator...", communes.len());
    for commune in communes.iter_mut() {
        project_commune(commune);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommuneStats;
    use geo::polygon;
    use geojson::JsonObject;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "{} != {}", actual, expected);
    }

    #[test]
    fn test_origin() {
        let p = lon_lat_to_web_mercator(Coord { x: 0.0, y: 0.0 });
        assert_close(p.x, 0.0);
        assert_close(p.y, 0.0);
    }

    #[test]
    fn test_equator_maps_to_zero_northing() {
        for lon in [-180.0, -3.5, 1.44, 90.0] {
            assert_close(lon_lat_to_web_mercator(Coord { x: lon, y: 0.0 }).y, 0.0);
        }
    }

    #[test]
    fn test_known_values() {
        // Antimeridian and Toulouse, checked against EPSG:3857.
        let p = lon_lat_to_web_mercator(Coord { x: 180.0, y: 0.0 });
        assert!((p.x - 20037508.342789244).abs() < 1e-6);

        let p = lon_lat_to_web_mercator(Coord { x: 1.444, y: 43.6045 });
        assert!((p.x - 160745.3447).abs() < 0.001, "{}", p.x);
        assert!((p.y - 5404440.2561).abs() < 0.001, "{}", p.y);
    }

    #[test]
    fn test_deterministic() {
        let c = Coord { x: 2.3522, y: 48.8566 };
        assert_eq!(lon_lat_to_web_mercator(c), lon_lat_to_web_mercator(c));
    }

    #[test]
    fn test_symmetric_about_equator() {
        let north = lon_lat_to_web_mercator(Coord { x: 3.0, y: 45.0 });
        let south = lon_lat_to_web_mercator(Coord { x: 3.0, y: -45.0 });
        assert!((north.y + south.y).abs() < 1e-6);
    }

    #[test]
    fn test_project_commune_moves_every_vertex() {
        let mut commune = Commune {
            name: "A".to_string(),
            geometry: polygon![(x: 1.0, y: 43.0), (x: 1.5, y: 43.0), (x: 1.5, y: 43.5)],
            properties: JsonObject::new(),
            stats: CommuneStats::default(),
        };
        let original: Vec<Coord<f64>> = commune.geometry.exterior().0.clone();

        project_commune(&mut commune);

        let projected = &commune.geometry.exterior().0;
        assert_eq!(projected.len(), original.len());
        for (p, o) in projected.iter().zip(&original) {
            assert_eq!(*p, lon_lat_to_web_mercator(*o));
        }
    }
}
