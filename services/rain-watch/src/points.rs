//! Loading of the watched point list.
//!
//! The file has no header and one point per row: `id;name;lat;lon`.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use radar_common::{GeoPoint, RadarError, RadarResult};
use tracing::{info, warn};

/// Read points from a delimited file.
pub fn load_points(path: &Path, delimiter: char) -> RadarResult<Arc<[GeoPoint]>> {
    let file = std::fs::File::open(path)
        .map_err(|e| RadarError::Points(format!("{}: {}", path.display(), e)))?;

    let points = read_points(file, delimiter)
        .map_err(|e| RadarError::Points(format!("{}: {}", path.display(), e)))?;

    info!(path = %path.display(), count = points.len(), "Loaded watched points");
    Ok(points.into())
}

/// Parse points from any reader. Any malformed row fails the whole load.
pub fn read_points<R: Read>(reader: R, delimiter: char) -> RadarResult<Vec<GeoPoint>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    let mut seen = HashSet::new();

    for record in csv_reader.deserialize::<GeoPoint>() {
        let point = record.map_err(|e| RadarError::Points(e.to_string()))?;

        if !point.lat.is_finite() || !point.lon.is_finite() {
            return Err(RadarError::Points(format!(
                "point {} ({}) has non-finite coordinates",
                point.id, point.name
            )));
        }
        if !seen.insert(point.id) {
            warn!(id = point.id, name = %point.name, "Duplicate point id");
        }

        points.push(point);
    }

    if points.is_empty() {
        warn!("Point list is empty, nothing will be watched");
    }

    Ok(points)
}
