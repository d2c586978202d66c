//! Coordinate extraction from upstream location blocks.

use serde_json::Value;

use crate::models::GeoCoordinates;
use crate::utils::json;

/// Extract `GeoCoordinates` from a location's `coords` field.
///
/// `coords` may be a single `{lat, lng}` object or a list of them, in which
/// case the first one is used. Anything else, including a list whose first
/// entry carries no usable number, yields `None`.
pub fn extract_geo(location: &Value) -> Option<GeoCoordinates> {
    let coords = json::first(location, "coords")?;

    let latitude = json::number(coords, "lat");
    let longitude = json::number(coords, "lng");
    if latitude.is_none() && longitude.is_none() {
        return None;
    }

    Some(GeoCoordinates::new(latitude, longitude))
}
