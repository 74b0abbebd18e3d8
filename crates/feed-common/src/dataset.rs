//! Dataset identifiers and the source registry.
//!
//! Live sources come from two providers: an external realtime API (bearer
//! authenticated) and our own backend components. Both endpoint tables are
//! static; the catalog flattens them into immutable descriptors at startup.

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, FeedResult};

/// Closed enumeration of every known live data source.
///
/// Keeping this closed gives compile-time coverage checks in the style
/// resolver instead of a stringly-keyed lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetId {
    Stib,
    Sncb,
    Telraam,
    SensorCommunity,
    Opensky,
}

impl DatasetId {
    /// Stable string key, also used as the endpoint-table and style key.
    pub fn key(&self) -> &'static str {
        match self {
            DatasetId::Stib => "stib",
            DatasetId::Sncb => "sncb",
            DatasetId::Telraam => "telraam",
            DatasetId::SensorCommunity => "sensor-community",
            DatasetId::Opensky => "opensky",
        }
    }

    /// Parse a catalog key. Fails with `UnknownSource` for anything not in
    /// either endpoint table.
    pub fn from_key(key: &str) -> FeedResult<Self> {
        match key {
            "stib" => Ok(DatasetId::Stib),
            "sncb" => Ok(DatasetId::Sncb),
            "telraam" => Ok(DatasetId::Telraam),
            "sensor-community" => Ok(DatasetId::SensorCommunity),
            "opensky" => Ok(DatasetId::Opensky),
            other => Err(FeedError::UnknownSource(other.to_string())),
        }
    }

    pub fn all() -> &'static [DatasetId] {
        &[
            DatasetId::Stib,
            DatasetId::Sncb,
            DatasetId::Telraam,
            DatasetId::SensorCommunity,
            DatasetId::Opensky,
        ]
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Which provider serves a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// External realtime provider, bearer-token authenticated.
    ExternalRealtime,
    /// Internal backend component.
    BackendComponent,
}

/// Immutable description of one live data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub id: DatasetId,
    pub name: String,
    pub description: String,
    pub source_type: SourceType,
    /// Provider-relative endpoint path.
    pub endpoint: String,
}

/// External realtime provider paths, per source key.
const EXTERNAL_REALTIME: &[(DatasetId, &str, &str)] = &[
    (
        DatasetId::Stib,
        "/stib/vehicle-position",
        "Live STIB/MIVB vehicle positions",
    ),
    (
        DatasetId::Sncb,
        "/sncb/vehicle-position",
        "Live SNCB/NMBS train positions",
    ),
    (
        DatasetId::Telraam,
        "/traffic/telraam",
        "Telraam citizen traffic counters",
    ),
];

/// Backend component paths, per source key.
const BACKEND_COMPONENT: &[(DatasetId, &str, &str)] = &[
    (
        DatasetId::SensorCommunity,
        "api/sensor-community",
        "Sensor.Community air quality stations",
    ),
    (
        DatasetId::Opensky,
        "api/opensky",
        "OpenSky aircraft state vectors",
    ),
];

/// Static catalog mapping dataset keys to fetch strategy and endpoint.
#[derive(Debug, Clone)]
pub struct Catalog {
    datasets: Vec<DatasetDescriptor>,
}

impl Catalog {
    /// Build the catalog by flattening both endpoint tables.
    pub fn new() -> Self {
        let mut datasets = Vec::new();
        for (id, endpoint, description) in EXTERNAL_REALTIME {
            datasets.push(DatasetDescriptor {
                id: *id,
                name: humanize(id.key()),
                description: description.to_string(),
                source_type: SourceType::ExternalRealtime,
                endpoint: endpoint.to_string(),
            });
        }
        for (id, endpoint, description) in BACKEND_COMPONENT {
            datasets.push(DatasetDescriptor {
                id: *id,
                name: humanize(id.key()),
                description: description.to_string(),
                source_type: SourceType::BackendComponent,
                endpoint: endpoint.to_string(),
            });
        }
        Self { datasets }
    }

    /// Pure lookup. Fails with `UnknownSource` if the key is in neither table.
    pub fn resolve(&self, key: &str) -> FeedResult<&DatasetDescriptor> {
        self.datasets
            .iter()
            .find(|d| d.id.key() == key)
            .ok_or_else(|| FeedError::UnknownSource(key.to_string()))
    }

    pub fn get(&self, id: DatasetId) -> &DatasetDescriptor {
        // Catalog::new lists every DatasetId variant, so this cannot miss.
        self.datasets
            .iter()
            .find(|d| d.id == id)
            .unwrap_or(&self.datasets[0])
    }

    pub fn datasets(&self) -> &[DatasetDescriptor] {
        &self.datasets
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a display name from a source key: spaces before capitals, dashes to
/// spaces, first letter capitalized.
fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c == '-' || c == '_' {
            out.push(' ');
        } else if c.is_uppercase() && i > 0 {
            out.push(' ');
            out.push(c);
        } else if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
