use serde::{Deserialize, Serialize};

use crate::error::NarrativeError;

/// One country's generated story, as returned by the narrative backend.
///
/// Field names follow the backend's camelCase JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryNarrative {
    pub name: String,
    pub capital: String,
    /// `[longitude, latitude]` in degrees.
    pub coordinates: [f64; 2],
    pub facts: Vec<String>,
    pub description: String,
    /// Visual description feeding the cinematic video prompt.
    pub landscape_description: String,
    /// Short phrase shown under the country name.
    pub cultural_essence: String,
}

impl CountryNarrative {
    pub fn longitude_deg(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude_deg(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Parse a narrative response body. Surrounding whitespace is tolerated;
/// anything that does not match the schema is a transient failure (the
/// backend occasionally wraps or truncates its JSON).
pub fn parse_narrative(body: &str) -> Result<CountryNarrative, NarrativeError> {
    serde_json::from_str(body.trim()).map_err(|e| NarrativeError::Transient(e.to_string()))
}
