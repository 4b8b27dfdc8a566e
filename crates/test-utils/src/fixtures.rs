//! Common test fixtures: watched points and point files on disk.

use std::io::Write;
use std::path::PathBuf;

use radar_common::GeoPoint;
use tempfile::TempDir;

/// Known locations in and around the Czech composite.
pub mod places {
    pub const PRAHA: (f64, f64) = (50.0877, 14.4213);
    pub const BRNO: (f64, f64) = (49.1951, 16.6068);
    pub const OSTRAVA: (f64, f64) = (49.8209, 18.2625);
    pub const PLZEN: (f64, f64) = (49.7384, 13.3736);
    /// Budapest, south of the composite
    pub const BUDAPEST: (f64, f64) = (47.4979, 19.0402);
    /// Berlin, north of the composite
    pub const BERLIN: (f64, f64) = (52.52, 13.405);
}

/// The four Czech cities, ids 1 through 4.
pub fn czech_cities() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(1, "Praha", places::PRAHA.0, places::PRAHA.1),
        GeoPoint::new(2, "Brno", places::BRNO.0, places::BRNO.1),
        GeoPoint::new(3, "Ostrava", places::OSTRAVA.0, places::OSTRAVA.1),
        GeoPoint::new(4, "Plzeň", places::PLZEN.0, places::PLZEN.1),
    ]
}

/// Point file contents in the `id;name;lat;lon` layout, no header.
pub fn points_csv(points: &[GeoPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{};{};{};{}\n", p.id, p.name, p.lat, p.lon))
        .collect()
}

/// Writes `contents` to `points.csv` inside a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the file is needed.
pub fn write_points_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("points.csv");
    let mut file = std::fs::File::create(&path).expect("create points file");
    file.write_all(contents.as_bytes())
        .expect("write points file");
    (dir, path)
}
