// src/services/transformer.rs

//! Raw record → schema.org `Event` transformation.
//!
//! Pure and deterministic: no I/O, and every nested block (location, dates,
//! cost, image, reservation) may be missing without failing the record.

use serde_json::Value;
use url::Url;

use crate::error::{Result, TransformError};
use crate::models::{
    NormalizedEvent, Organization, Place, PostalAddress, RawEvent, TransformConfig,
};
use crate::services::address::{KNOWN_LOCALITIES, flat_address, parse_address};
use crate::services::{build_offer, extract_geo};
use crate::utils::{decode_entities, json, resolve_url};

/// Maps raw upstream records onto [`NormalizedEvent`].
#[derive(Debug, Clone)]
pub struct EventTransformer {
    image_base: Url,
    parse_addresses: bool,
}

impl EventTransformer {
    /// Create a transformer from configuration.
    pub fn new(config: &TransformConfig) -> Result<Self> {
        Ok(Self {
            image_base: Url::parse(&config.image_base_url)?,
            parse_addresses: config.parse_addresses,
        })
    }

    /// Transform a single raw record.
    ///
    /// Fails only when the record is structurally unusable (not an object,
    /// or no `calEvent` wrapper).
    pub fn transform(&self, raw: &RawEvent) -> std::result::Result<NormalizedEvent, TransformError> {
        if !raw.is_object() {
            return Err(TransformError::NotAnObject {
                found: json_kind(raw),
            });
        }
        let evt = json::object(raw, "calEvent").ok_or(TransformError::MissingEvent)?;

        let location = json::first(evt, "locations").unwrap_or(&Value::Null);
        let dates = json::first(evt, "dates").unwrap_or(&Value::Null);
        let reservation = json::object(evt, "reservation").unwrap_or(&Value::Null);

        let place = Place::new(
            json::text(location, "locationName")
                .map(|n| decode_entities(&n))
                .unwrap_or_else(|| KNOWN_LOCALITIES[0].to_string()),
            self.address(location),
            extract_geo(location),
        );

        let organizer = Organization::new(
            decode_entities(&json::text_or_empty(evt, "orgName")),
            json::text(evt, "orgEmail"),
            json::text(evt, "orgPhone"),
        );

        Ok(NormalizedEvent {
            context: NormalizedEvent::CONTEXT.to_string(),
            kind: NormalizedEvent::TYPE.to_string(),
            name: decode_entities(&json::text_or_empty(evt, "eventName")),
            start_date: json::raw(dates, "startDateTime"),
            end_date: json::raw(dates, "endDateTime"),
            location: place,
            description: decode_entities(&json::text_or_empty(evt, "description")),
            url: json::text(reservation, "website").or_else(|| json::text(evt, "eventWebsite")),
            image: self.image_url(evt),
            organizer,
            is_accessible_for_free: is_free(evt),
            keywords: keywords(evt),
            offers: build_offer(evt),
        })
    }

    fn address(&self, location: &Value) -> Option<PostalAddress> {
        let raw = json::text_or_empty(location, "address");
        if self.parse_addresses {
            parse_address(&raw)
        } else {
            Some(flat_address(&raw))
        }
    }

    /// Image URL, resolving site-relative paths against the image base.
    fn image_url(&self, evt: &Value) -> Option<String> {
        let url = json::object(evt, "image").and_then(|image| json::text(image, "url"))?;
        if url.starts_with("http") {
            Some(url)
        } else {
            Some(resolve_url(&self.image_base, &url))
        }
    }
}

/// `freeEvent` is a free-text flag; only "yes" (any case, any padding) counts.
fn is_free(evt: &Value) -> bool {
    evt.get("freeEvent")
        .and_then(Value::as_str)
        .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("yes"))
}

/// Comma-separated categories, trimmed and decoded, empties dropped.
fn keywords(evt: &Value) -> Vec<String> {
    json::text_or_empty(evt, "categoryString")
        .split(',')
        .map(|piece| decode_entities(piece.trim()).trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
