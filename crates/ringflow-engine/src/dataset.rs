//! JSON mine dataset: the records an ingestion run would leave in the
//! store, plus the schedules to simulate against them.

use std::path::Path;

use ringflow_core::ScenarioRequest;
use ringflow_store::{BlockRepository, MemoryStore, RingRepository, SequenceLinkRepository};
use ringflow_types::{Block, ProductionRing, ScheduleRow, SequenceLink};
use serde::Deserialize;
use tracing::info;

use crate::error::EngineError;

/// Default dataset path, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "ringflow-dataset.json";

/// Everything the engine needs for one batch.
#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    /// Planning blocks.
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Production rings as recorded on site.
    #[serde(default)]
    pub rings: Vec<ProductionRing>,
    /// Upstream sequencing hints.
    #[serde(default)]
    pub links: Vec<SequenceLink>,
    /// Uploaded schedules.
    #[serde(default)]
    pub scenarios: Vec<ScenarioInput>,
}

/// One uploaded schedule.
#[derive(Debug, Deserialize)]
pub struct ScenarioInput {
    /// Scenario name.
    pub name: String,
    /// Uploading user.
    #[serde(default)]
    pub owner: Option<String>,
    /// Validated schedule rows.
    pub rows: Vec<ScheduleRow>,
}

impl Dataset {
    /// Read and parse a dataset file.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a dataset from a JSON string.
    pub fn parse(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the mine records into `store` and return the scenario
    /// requests.
    pub fn load_into(self, store: &MemoryStore) -> Result<Vec<ScenarioRequest>, EngineError> {
        let levels = store.upsert_blocks(self.blocks)?;
        let rings = self.rings.len();
        store.upsert_rings(self.rings)?;
        let links = self.links.len();
        store.insert_links(self.links)?;
        info!(levels = levels.len(), rings, links, "Dataset loaded");

        Ok(self
            .scenarios
            .into_iter()
            .map(|s| ScenarioRequest::new(s.name, s.owner, s.rows))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const SAMPLE: &str = r#"{
        "blocks": [
            {
                "id": "0190f6c8-3a6e-7c3b-9c4a-2f1f3f6b8a10",
                "level": 5,
                "description": "A1",
                "position": { "x": "0", "y": "0", "z": "0" },
                "blastsolids_id": "A1-0"
            },
            {
                "id": "0190f6c8-3a6e-7c3b-9c4a-2f1f3f6b8a11",
                "level": 5,
                "description": "A1",
                "position": { "x": "5", "y": "0", "z": "0" },
                "blastsolids_id": "A1-1"
            }
        ],
        "scenarios": [
            {
                "name": "April",
                "rows": [
                    {
                        "blastsolids_id": "A1-1",
                        "start": "2025-04-01T07:00:00Z",
                        "finish": "2025-04-02T07:00:00Z",
                        "level": 5
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn parse_sample_dataset() {
        let dataset = Dataset::parse(SAMPLE).unwrap();
        assert_eq!(dataset.blocks.len(), 2);
        assert!(dataset.rings.is_empty());
        assert!(dataset.links.is_empty());
        assert_eq!(dataset.scenarios.len(), 1);
        assert!(dataset.blocks.iter().all(|b| b.is_active));
    }

    #[test]
    fn load_into_store() {
        let store = MemoryStore::new();
        let requests = Dataset::parse(SAMPLE).unwrap().load_into(&store).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests.first().unwrap().scenario.name, "April");
        assert_eq!(store.blocks().unwrap().len(), 2);
    }

    #[test]
    fn malformed_dataset_is_a_json_error() {
        let err = Dataset::parse("{ \"blocks\": 3 }").unwrap_err();
        assert!(matches!(err, EngineError::Json { .. }));
    }
}
