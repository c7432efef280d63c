use geo::{Coord, coord};
use geojson::{PolygonType, Position, Value};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Approximate center of a raw GeoJSON geometry as (x = lon, y = lat).
///
/// Null, unparsable or unsupported geometry gives (0, 0).
pub fn estimate_centroid(raw: Option<&JsonValue>) -> Coord<f64> {
    let Some(raw) = raw.filter(|v| !v.is_null()) else {
        return zero();
    };

    match read_geometry(raw) {
        Ok(Some(value)) => centroid_of(&value).unwrap_or_else(zero),
        Ok(None) => zero(),
        Err(e) => {
            log::debug!("Unreadable geometry, using zero centroid: {}", e);
            zero()
        }
    }
}

/// Deserialize only the coordinates of supported kinds, straight from the
/// borrowed document. Other kinds give `Ok(None)` without touching them.
fn read_geometry(raw: &JsonValue) -> serde_json::Result<Option<Value>> {
    let coordinates = &raw["coordinates"];
    let value = match raw.get("type").and_then(JsonValue::as_str) {
        Some("Point") => Value::Point(Position::deserialize(coordinates)?),
        Some("Polygon") => Value::Polygon(PolygonType::deserialize(coordinates)?),
        Some("MultiPolygon") => {
            Value::MultiPolygon(Vec::<PolygonType>::deserialize(coordinates)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Vertex-average centroid for the geometry kinds we support
///
/// # Algorithm
/// - Point: the position itself
/// - Polygon: mean of the outer ring's vertices, closing vertex included
/// - MultiPolygon: unweighted mean of each polygon's outer-ring centroid
///
/// Returns `None` for other kinds or when no vertex is usable.
pub fn centroid_of(value: &Value) -> Option<Coord<f64>> {
    match value {
        Value::Point(position) => position_to_coord(position),
        Value::Polygon(rings) => polygon_centroid(rings),
        Value::MultiPolygon(polygons) => {
            // Degenerate polygons are left out rather than dragging the mean to 0
            let centroids: Vec<Coord<f64>> = polygons.iter().filter_map(polygon_centroid).collect();
            mean(&centroids)
        }
        _ => None,
    }
}

/// Reorder a (lon, lat) coordinate into the `[lat, lon]` pair used by `center`
pub fn to_lat_lon(c: Coord<f64>) -> [f64; 2] {
    [c.y, c.x]
}

fn polygon_centroid(rings: &PolygonType) -> Option<Coord<f64>> {
    let outer = rings.first()?;
    let ring: Vec<Coord<f64>> = outer.iter().filter_map(position_to_coord).collect();
    mean(&ring)
}

fn position_to_coord(position: &Position) -> Option<Coord<f64>> {
    match position.as_slice() {
        [x, y, ..] => Some(coord! { x: *x, y: *y }),
        _ => None,
    }
}

fn mean(coords: &[Coord<f64>]) -> Option<Coord<f64>> {
    if coords.is_empty() {
        return None;
    }
    let sum = coords.iter().fold(zero(), |acc, &c| acc + c);
    Some(sum / coords.len() as f64)
}

fn zero() -> Coord<f64> {
    coord! { x: 0.0, y: 0.0 }
}
