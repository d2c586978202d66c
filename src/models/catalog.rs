//! CKAN catalog response shapes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Envelope returned by `package_show`.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageShowResponse {
    pub result: Package,
}

/// A CKAN package (dataset).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Package {
    /// First resource that is a plain file download rather than a
    /// datastore-backed query endpoint.
    pub fn downloadable_resource(&self) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|r| !r.datastore_active && r.url.as_deref().is_some_and(|u| !u.is_empty()))
    }
}

/// A CKAN resource (file or API endpoint) inside a package.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub url: Option<String>,

    /// Read with loose truthiness, since catalogs are not consistent about
    /// the flag's type: missing, `null`, `false`, `0`, `""` and empty
    /// collections are all false.
    #[serde(default, deserialize_with = "truthy")]
    pub datastore_active: bool,
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    })
}
