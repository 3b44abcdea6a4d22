use serde::{Deserialize, Serialize};

use crate::marker::MapMarker;

pub const DEFAULT_MAP_IMAGE: &str = "map.png";

/// One floor of a map. floor 0 is the ground level, basements are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapLevel {
    pub name: String,
    pub floor: i32,
    pub map_image: String,
    pub markers: Vec<MapMarker>,
}

impl Default for MapLevel {
    fn default() -> Self {
        Self {
            name: String::new(),
            floor: 0,
            map_image: DEFAULT_MAP_IMAGE.to_string(),
            markers: Vec::new(),
        }
    }
}

impl MapLevel {
    pub fn new(name: impl Into<String>, floor: i32) -> Self {
        Self {
            name: name.into(),
            floor,
            ..Default::default()
        }
    }

    pub fn with_map_image(mut self, map_image: impl Into<String>) -> Self {
        self.map_image = map_image.into();
        self
    }

    pub fn add_marker(&mut self, marker: MapMarker) {
        self.markers.push(marker);
    }

    /// out of range indices are ignored
    pub fn remove_marker(&mut self, index: usize) -> Option<MapMarker> {
        (index < self.markers.len()).then(|| self.markers.remove(index))
    }

    pub fn markers_by_type<'a>(
        &'a self,
        marker_type: &'a str,
    ) -> impl Iterator<Item = &'a MapMarker> + 'a {
        self.markers
            .iter()
            .filter(move |m| m.marker_type == marker_type)
    }
}
