// src/packages/descriptor.rs

//! JSON package descriptor

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Metadata parsed from the descriptor file inside an archive
///
/// Unknown fields are ignored and every field is optional on input, so a
/// descriptor missing `version` parses with an empty version (which then
/// never wins a newest-version comparison).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Semantic version without a leading `v`
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,

    /// Human-readable name; overrides `name` for display when non-empty
    #[serde(rename = "ccmodHumanName", default, deserialize_with = "null_as_default")]
    pub display_name: String,

    /// Dependency name to version constraint
    #[serde(
        rename = "ccmodDependencies",
        default,
        deserialize_with = "null_as_default"
    )]
    pub dependencies: BTreeMap<String, String>,
}

impl PackageDescriptor {
    /// Parse a descriptor from raw JSON bytes
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| Error::DecodeError(format!("Invalid package descriptor: {e}")))
    }

    /// Name to show users: the display name if set, otherwise the package name
    pub fn display_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_full_descriptor() {
        let json = br#"{
            "name": "cc-world-map-overhaul",
            "version": "1.1.0",
            "ccmodHumanName": "World Map Overhaul",
            "ccmodDependencies": {"ccloader": "^2.14.0"},
            "description": "ignored"
        }"#;

        let desc = PackageDescriptor::from_json(json).unwrap();
        assert_eq!(desc.name, "cc-world-map-overhaul");
        assert_eq!(desc.version, "1.1.0");
        assert_eq!(desc.display_name(), "World Map Overhaul");
        assert_eq!(desc.dependencies["ccloader"], "^2.14.0");
    }

    #[test]
    fn test_display_name_precedence() {
        let desc = PackageDescriptor {
            name: "core".to_string(),
            display_name: "Core Mod".to_string(),
            ..Default::default()
        };
        assert_eq!(desc.display_name(), "Core Mod");

        let desc = PackageDescriptor {
            name: "core".to_string(),
            ..Default::default()
        };
        assert_eq!(desc.display_name(), "core");
    }

    #[test]
    fn test_minimal_descriptor() {
        let desc = PackageDescriptor::from_json(br#"{"name":"x"}"#).unwrap();
        assert_eq!(desc.version, "");
        assert!(desc.dependencies.is_empty());
    }

    #[test]
    fn test_null_optional_fields() {
        let desc = PackageDescriptor::from_json(
            br#"{"name":"n","version":"1.0.0","ccmodHumanName":null,"ccmodDependencies":null}"#,
        )
        .unwrap();
        assert_eq!(desc.display_name(), "n");
        assert!(desc.dependencies.is_empty());

        let desc = PackageDescriptor::from_json(br#"{"name":null,"version":null}"#).unwrap();
        assert_eq!(desc, PackageDescriptor::default());
    }

    #[test]
    fn test_malformed_descriptor() {
        let err = PackageDescriptor::from_json(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = PackageDescriptor::from_json(br#"{"version": 3}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_serializes_wire_names() {
        let desc = PackageDescriptor::from_json(
            br#"{"name":"a","version":"1.0.0","ccmodHumanName":"A"}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["ccmodHumanName"], "A");
        assert!(json["ccmodDependencies"].is_object());
    }
}
