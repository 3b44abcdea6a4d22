use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::level::MapLevel;
use crate::marker::MapMarker;

pub const NORMAL_DIFFICULTY: &str = "normal";
pub const LOCKDOWN_DIFFICULTY: &str = "lockdown";
pub const FORBIDDEN_DIFFICULTY: &str = "forbidden";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapDifficulty {
    pub name: String,
    pub levels: Vec<MapLevel>,
}

impl Default for MapDifficulty {
    fn default() -> Self {
        Self::new(NORMAL_DIFFICULTY)
    }
}

impl MapDifficulty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: Vec::new(),
        }
    }

    pub fn add_level(&mut self, level: MapLevel) {
        self.levels.push(level);
    }

    /// first level with that floor number
    pub fn level_by_floor(&self, floor: i32) -> Option<&MapLevel> {
        self.levels.iter().find(|l| l.floor == floor)
    }

    pub fn level_by_floor_mut(&mut self, floor: i32) -> Option<&mut MapLevel> {
        self.levels.iter_mut().find(|l| l.floor == floor)
    }

    pub fn markers(&self) -> impl Iterator<Item = &MapMarker> {
        self.levels.iter().flat_map(|l| l.markers.iter())
    }

    /// distinct marker types across every level, in the order they first show up
    pub fn all_types(&self) -> IndexSet<String> {
        self.markers().map(|m| m.marker_type.clone()).collect()
    }

    /// distinct floors, lowest first
    pub fn floors(&self) -> Vec<i32> {
        self.levels.iter().map(|l| l.floor).sorted().dedup().collect()
    }

    pub fn marker_count(&self) -> usize {
        self.levels.iter().map(|l| l.markers.len()).sum()
    }
}
