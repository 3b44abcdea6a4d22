use indexmap::IndexMap;
use miette::{Context, IntoDiagnostic, Result};
use raid_map_models::{validate_map_document, MapData, MapSummary};
use tracing::{info, info_span, warn};

use crate::source::MapSource;

/// Maps that were found and passed validation, in candidate order.
#[derive(Debug, Default)]
pub struct MapCatalog {
    maps: IndexMap<String, MapSummary>,
}

impl MapCatalog {
    /// Tries every candidate name. Unreachable or malformed documents are logged and left out.
    pub fn discover<S: AsRef<str>>(source: &dyn MapSource, candidates: &[S]) -> Self {
        let span = info_span!("map discovery", source = %source.describe());
        let _enter = span.enter();
        let mut maps = IndexMap::new();
        for candidate in candidates {
            let candidate = candidate.as_ref();
            match Self::summarize(source, candidate) {
                Ok(summary) => {
                    maps.insert(candidate.to_string(), summary);
                }
                Err(e) => warn!(?e, map_name = candidate, "map not available, skipping"),
            }
        }
        info!(found = maps.len(), candidates = candidates.len(), "map discovery finished");
        Self { maps }
    }

    fn summarize(source: &dyn MapSource, map_name: &str) -> Result<MapSummary> {
        let json = source.fetch(map_name)?;
        let doc: serde_json::Value = serde_json::from_str(&json)
            .into_diagnostic()
            .wrap_err("map document is not json")?;
        validate_map_document(&doc)?;
        let map: MapData = serde_json::from_value(doc)
            .into_diagnostic()
            .wrap_err("failed to deserialize map document")?;
        Ok(MapSummary::from_map(&map))
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn map_names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    pub fn summary(&self, map_name: &str) -> Option<&MapSummary> {
        self.maps.get(map_name)
    }

    pub fn summaries(&self) -> impl Iterator<Item = &MapSummary> {
        self.maps.values()
    }

    pub fn first(&self) -> Option<&str> {
        self.map_names().next()
    }

    /// sum of markers over every listed map
    pub fn total_markers(&self) -> usize {
        self.maps.values().map(|s| s.total_markers).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryMapSource;
    use similar_asserts::assert_eq;

    const FARM: &str = r#"{
        "mapName": "farm",
        "difficulties": {
            "normal": {
                "name": "normal",
                "levels": [
                    {"name": "Fields", "floor": 0, "mapImage": "farm.png", "markers": [
                        {"name": "Barn", "type": "loot", "position": {"x": 5, "y": 5}}
                    ]}
                ]
            }
        }
    }"#;

    #[test]
    fn only_valid_maps_are_listed() {
        let source = MemoryMapSource::new()
            .with_document("farm", FARM)
            .with_document("valley", r#"{"mapName": "valley", "difficulties": {}}"#)
            .with_document("factory", "<html>404</html>");
        let catalog = MapCatalog::discover(&source, &["valley", "farm", "factory", "armory"]);
        assert_eq!(catalog.map_names().collect::<Vec<_>>(), vec!["farm"]);
        assert_eq!(catalog.first(), Some("farm"));
        let farm = catalog.summary("farm").unwrap();
        assert_eq!(farm.display_name, "Farm");
        assert_eq!(farm.image, "farm.png");
        assert_eq!(catalog.total_markers(), 1);
    }

    #[test]
    fn nothing_found_is_an_empty_catalog() {
        let catalog = MapCatalog::discover(&MemoryMapSource::new(), &["armory".to_string()]);
        assert!(catalog.is_empty());
        assert_eq!(catalog.first(), None);
    }
}
