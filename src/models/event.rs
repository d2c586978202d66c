//! schema.org Event data structures.
//!
//! These types serialize straight to the JSON-LD written to disk. Absent
//! values serialize as `null`, except `offers` which is omitted entirely.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A raw upstream record. No schema is enforced by the source.
pub type RawEvent = Value;

/// A normalized schema.org `Event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    #[serde(rename = "@context")]
    pub context: String,

    #[serde(rename = "@type")]
    pub kind: String,

    pub name: String,

    /// Passed through verbatim from the source, whatever its JSON type
    pub start_date: Option<Value>,

    /// Passed through verbatim from the source, whatever its JSON type
    pub end_date: Option<Value>,

    pub location: Place,

    pub description: String,

    /// Booking URL when available, otherwise the event website
    pub url: Option<String>,

    pub image: Option<String>,

    pub organizer: Organization,

    pub is_accessible_for_free: bool,

    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offers: Option<Offer>,
}

impl NormalizedEvent {
    pub const CONTEXT: &'static str = "https://schema.org";
    pub const TYPE: &'static str = "Event";
}

/// A schema.org `Place`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(rename = "@type")]
    pub kind: String,

    pub name: String,

    /// `None` is written as `{}` so "no address" stays distinguishable
    /// from a default-locality address.
    #[serde(serialize_with = "empty_object_if_none", deserialize_with = "none_if_empty")]
    pub address: Option<PostalAddress>,

    pub geo: Option<GeoCoordinates>,
}

impl Place {
    pub fn new(
        name: impl Into<String>,
        address: Option<PostalAddress>,
        geo: Option<GeoCoordinates>,
    ) -> Self {
        Self {
            kind: "Place".to_string(),
            name: name.into(),
            address,
            geo,
        }
    }
}

/// A schema.org `PostalAddress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(rename = "@type")]
    pub kind: String,

    pub street_address: String,

    pub address_locality: String,

    pub address_region: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    pub address_country: String,
}

impl PostalAddress {
    pub const REGION: &'static str = "ON";
    pub const COUNTRY: &'static str = "CA";

    /// Build an Ontario, Canada address.
    pub fn new(
        street: impl Into<String>,
        locality: impl Into<String>,
        postal_code: Option<String>,
    ) -> Self {
        Self {
            kind: "PostalAddress".to_string(),
            street_address: street.into(),
            address_locality: locality.into(),
            address_region: Self::REGION.to_string(),
            postal_code,
            address_country: Self::COUNTRY.to_string(),
        }
    }
}

/// A schema.org `GeoCoordinates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    #[serde(rename = "@type")]
    pub kind: String,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,
}

impl GeoCoordinates {
    pub fn new(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            kind: "GeoCoordinates".to_string(),
            latitude,
            longitude,
        }
    }
}

/// A schema.org `Organization`, used as the event organizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(rename = "@type")]
    pub kind: String,

    pub name: String,

    pub email: Option<String>,

    pub telephone: Option<String>,
}

impl Organization {
    pub fn new(name: impl Into<String>, email: Option<String>, telephone: Option<String>) -> Self {
        Self {
            kind: "Organization".to_string(),
            name: name.into(),
            email,
            telephone,
        }
    }
}

/// A schema.org `Offer` (price and/or ticketing URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(rename = "@type")]
    pub kind: String,

    /// Number or string, exactly as the source gave it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Offer {
    pub const CURRENCY: &'static str = "CAD";
}

fn empty_object_if_none<S: Serializer>(
    address: &Option<PostalAddress>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match address {
        Some(address) => address.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

fn none_if_empty<'de, D>(deserializer: D) -> Result<Option<PostalAddress>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::Object(ref map) if map.is_empty() => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
