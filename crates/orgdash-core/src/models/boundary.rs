//! Geographic boundary types.
//!
//! Boundaries form a two-level hierarchy: states (level 1) and
//! districts (level 2), each district carrying the id of its parent
//! state. Cached snapshots are GeoJSON-shaped feature collections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Hierarchy level of a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryLevel {
    State,
    District,
}

impl BoundaryLevel {
    /// Numeric level code as used by the external API.
    pub fn code(self) -> u32 {
        match self {
            BoundaryLevel::State => 1,
            BoundaryLevel::District => 2,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(BoundaryLevel::State),
            2 => Some(BoundaryLevel::District),
            _ => None,
        }
    }
}

/// Raw geometry: a GeoJSON type tag plus coordinate data.
///
/// Coordinates are kept opaque — their nesting depth varies by
/// geometry type and nothing here ever inspects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: serde_json::Value,
}

/// One flat boundary record as returned by the external API client.
#[derive(Debug, Clone)]
pub struct BoundaryRecord {
    /// External boundary id (e.g. an OSM id).
    pub boundary_id: String,
    pub name: String,
    pub level: BoundaryLevel,
    /// Id of the parent state; set for districts.
    pub parent_id: Option<String>,
    pub geometry: Geometry,
}

/// Properties carried by each cached feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub name: String,
    /// External boundary id.
    pub id: String,
    pub level: u32,
}

/// A single GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl From<&BoundaryRecord> for Feature {
    fn from(record: &BoundaryRecord) -> Self {
        Feature {
            kind: "Feature".into(),
            geometry: record.geometry.clone(),
            properties: FeatureProperties {
                name: record.name.clone(),
                id: record.boundary_id.clone(),
                level: record.level.code(),
            },
        }
    }
}

/// A named set of features at one hierarchy level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BoundaryRecord>) -> Self {
        FeatureCollection {
            kind: "FeatureCollection".into(),
            features: records.into_iter().map(Feature::from).collect(),
        }
    }
}

/// An org's cached boundary snapshot: the build timestamp plus the
/// per-key feature collections (one level-1 entry, zero or more
/// level-2 entries keyed by parent id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedBoundaries {
    /// Build time in Unix milliseconds.
    pub time: i64,
    pub results: BTreeMap<String, FeatureCollection>,
}
