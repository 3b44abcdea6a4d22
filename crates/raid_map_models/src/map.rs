use indexmap::{IndexMap, IndexSet};
use miette::{Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};

use crate::difficulty::{MapDifficulty, NORMAL_DIFFICULTY};

/// A whole map document: difficulties in document order, each with its floors and markers.
/// There is always a `normal` difficulty, even when the document does not have one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawMapData")]
pub struct MapData {
    pub map_name: String,
    difficulties: IndexMap<String, MapDifficulty>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawMapData {
    map_name: String,
    difficulties: IndexMap<String, MapDifficulty>,
}

impl From<RawMapData> for MapData {
    fn from(raw: RawMapData) -> Self {
        let mut map = Self {
            map_name: raw.map_name,
            difficulties: raw.difficulties,
        };
        map.ensure_normal();
        map
    }
}

impl MapData {
    /// an empty shell: just the `normal` difficulty without any level
    pub fn new(map_name: impl Into<String>) -> Self {
        let mut map = Self {
            map_name: map_name.into(),
            difficulties: IndexMap::new(),
        };
        map.ensure_normal();
        map
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .into_diagnostic()
            .wrap_err("failed to deserialize map document")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .into_diagnostic()
            .wrap_err("failed to serialize map document")
    }

    fn ensure_normal(&mut self) {
        if !self.difficulties.contains_key(NORMAL_DIFFICULTY) {
            self.difficulties.shift_insert(
                0,
                NORMAL_DIFFICULTY.to_string(),
                MapDifficulty::new(NORMAL_DIFFICULTY),
            );
        }
    }

    /// replaces any difficulty stored under the same name
    pub fn add_difficulty(&mut self, difficulty: MapDifficulty) {
        self.difficulties.insert(difficulty.name.clone(), difficulty);
    }

    pub fn difficulty(&self, name: &str) -> Option<&MapDifficulty> {
        self.difficulties.get(name)
    }

    pub fn difficulty_mut(&mut self, name: &str) -> Option<&mut MapDifficulty> {
        self.difficulties.get_mut(name)
    }

    pub fn has_difficulty(&self, name: &str) -> bool {
        self.difficulties.contains_key(name)
    }

    pub fn difficulties(&self) -> impl Iterator<Item = (&str, &MapDifficulty)> {
        self.difficulties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn difficulty_names(&self) -> impl Iterator<Item = &str> {
        self.difficulties.keys().map(String::as_str)
    }

    /// types of one difficulty, empty when the difficulty does not exist
    pub fn all_types(&self, difficulty: &str) -> IndexSet<String> {
        self.difficulty(difficulty)
            .map(MapDifficulty::all_types)
            .unwrap_or_default()
    }

    pub fn total_markers(&self) -> usize {
        self.difficulties.values().map(MapDifficulty::marker_count).sum()
    }
}
