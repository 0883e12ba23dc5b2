//! GeoJSON boundary collection.
//!
//! Only the parts the binder needs are typed. Geometry and any other member
//! of a feature or of the collection are kept as raw JSON and written back
//! untouched; property order follows the source document.

use crate::error::{RegionMapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property key holding the bound numeric value.
pub const VALUE_PROPERTY: &str = "_value";
/// Property key holding the extracted, trimmed region name.
pub const DISPLAY_NAME_PROPERTY: &str = "_display_name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<BoundaryFeature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFeature {
    #[serde(rename = "type", default = "feature_kind")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Value,
    /// `null` in the source document is read as an empty map.
    #[serde(default, deserialize_with = "nullable_map")]
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn feature_kind() -> String {
    "Feature".to_string()
}

fn nullable_map<'de, D>(de: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(de)?.unwrap_or_default())
}

impl BoundaryCollection {
    /// Parse a GeoJSON document, rejecting anything but a `FeatureCollection`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let c: BoundaryCollection = serde_json::from_str(s)?;
        c.validate()?;
        Ok(c)
    }

    pub fn from_value(v: Value) -> Result<Self> {
        let c: BoundaryCollection = serde_json::from_value(v)?;
        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.kind != "FeatureCollection" {
            return Err(RegionMapError::InvalidGeometry {
                message: format!("expected a FeatureCollection, found `{}`", self.kind),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl BoundaryFeature {
    /// The name-field value as text, trimmed. Non-string primitives are
    /// rendered with their JSON text; a missing key or `null` gives `""`.
    pub fn name_value(&self, name_field: &str) -> String {
        match self.properties.get(name_field) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string().trim().to_string(),
        }
    }

    pub fn resolved_value(&self) -> Option<f64> {
        self.properties.get(VALUE_PROPERTY).and_then(Value::as_f64)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.properties
            .get(DISPLAY_NAME_PROPERTY)
            .and_then(Value::as_str)
    }

    pub(crate) fn annotate(&mut self, display_name: &str, value: f64) {
        self.properties.insert(
            DISPLAY_NAME_PROPERTY.to_string(),
            Value::String(display_name.to_string()),
        );
        self.properties
            .insert(VALUE_PROPERTY.to_string(), serde_json::json!(value));
    }
}
