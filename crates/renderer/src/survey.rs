//! Classification of every watched point against one radar image.

use tracing::{debug, info, warn};

use radar_common::{GeoPoint, ObservedPoint, PixelCoord, RadarError, RasterBounds};

use crate::annotate::{annotate, Marker};
use crate::sampling::sample;
use crate::Raster;

/// Outcome of classifying all points against one raster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyReport {
    /// Points where the sampled color is not black
    pub raining: Vec<ObservedPoint>,
    /// Number of points sampled as black
    pub clear: usize,
    /// Ids of points whose sampling window falls outside the raster
    pub out_of_bounds: Vec<i64>,
}

impl SurveyReport {
    /// Points that were actually sampled.
    pub fn checked(&self) -> usize {
        self.raining.len() + self.clear
    }
}

/// Classify every point and paint its marker onto the raster.
///
/// All points are sampled before any marker is drawn, so a marker can never
/// bleed into the sampling window of a neighboring point. Points that cannot
/// be sampled are skipped and left unmarked.
pub fn survey(raster: &mut Raster, bounds: &RasterBounds, points: &[GeoPoint]) -> SurveyReport {
    let (width, height) = raster.dimensions();
    let mut report = SurveyReport::default();
    let mut markers: Vec<(PixelCoord, Marker)> = Vec::with_capacity(points.len());

    for point in points {
        let at = bounds.project(point.lat, point.lon, width, height);

        let color = match sample(raster, at) {
            Ok(color) => color,
            Err(RadarError::OutOfBounds { x, y }) => {
                warn!(
                    point = %point.name,
                    id = point.id,
                    x = x,
                    y = y,
                    "Point falls outside the raster, skipping"
                );
                report.out_of_bounds.push(point.id);
                continue;
            }
            Err(e) => {
                warn!(point = %point.name, id = point.id, error = %e, "Sampling failed, skipping");
                continue;
            }
        };

        let marker = Marker::from_sample(color);
        match marker {
            Marker::Raining(c) => {
                info!(
                    point = %point.name,
                    id = point.id,
                    r = c.r,
                    g = c.g,
                    b = c.b,
                    "It's raining"
                );
                report.raining.push(ObservedPoint::new(point, c));
            }
            Marker::Clear => {
                debug!(point = %point.name, id = point.id, "Clear");
                report.clear += 1;
            }
        }
        markers.push((at, marker));
    }

    for (at, marker) in markers {
        annotate(raster, at, marker);
    }

    if report.raining.is_empty() {
        info!(checked = report.checked(), "It looks like it's not raining anywhere");
    }

    report
}
