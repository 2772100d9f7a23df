//! Star-system records and the name-keyed dataset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single star system from the bulk dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub id: u64,
    /// Unique within the dataset; used as the map key.
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Attributes the route math does not interpret (region, security, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StarSystem {
    /// Euclidean distance to another system.
    pub fn distance_to(&self, other: &StarSystem) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Mapping from system name to record, built once from the decoded dataset.
pub type KeyedDataset = HashMap<String, StarSystem>;

/// Reduce a decoded record sequence into a name-keyed dataset.
///
/// Duplicate names are last-write-wins: a later record in the sequence
/// overwrites an earlier entry.
pub fn key_by_name(records: Vec<StarSystem>) -> KeyedDataset {
    let mut dataset = HashMap::with_capacity(records.len());
    for record in records {
        dataset.insert(record.name.clone(), record);
    }
    dataset
}
