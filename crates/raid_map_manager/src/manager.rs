use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use miette::{miette, Result};
use raid_core::{KeyValueStore, Vector2};
use raid_map_models::{MapData, MapLevel, MapMarker, Rarity, DEFAULT_MAP_IMAGE, NORMAL_DIFFICULTY};
use tracing::{debug, info, info_span, warn};

use crate::source::MapSource;
use crate::user_markers::{UserMarkerKey, UserMarkerStore};

/// Which user marker slot an add or remove goes to. Unset parts use the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerTarget {
    pub map_name: Option<String>,
    pub difficulty: Option<String>,
    pub floor: Option<i32>,
}

impl MarkerTarget {
    pub fn current() -> Self {
        Self::default()
    }
    pub fn floor(floor: i32) -> Self {
        Self {
            floor: Some(floor),
            ..Default::default()
        }
    }
}

/// Loaded map plus what the user currently looks at: difficulty, floor and marker filters.
/// Every query is total, a missing map, difficulty or floor just yields nothing.
pub struct MapDataManager {
    source: Arc<dyn MapSource>,
    user_markers: UserMarkerStore,
    map_data: Option<MapData>,
    current_difficulty: String,
    current_floor: i32,
    enabled_types: IndexSet<String>,
    enabled_rarities: IndexSet<Rarity>,
}

impl MapDataManager {
    pub fn new(source: Arc<dyn MapSource>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            source,
            user_markers: UserMarkerStore::new(storage),
            map_data: None,
            current_difficulty: NORMAL_DIFFICULTY.to_string(),
            current_floor: 0,
            enabled_types: Default::default(),
            enabled_rarities: Rarity::ALL.into_iter().collect(),
        }
    }

    /// Fetches `map_name` from the source and makes it the current map.
    /// Never fails: a map that cannot be fetched or parsed becomes an empty map of that name.
    pub fn load_map_data(&mut self, map_name: &str) -> &MapData {
        let span = info_span!("load_map_data", map_name);
        let _enter = span.enter();

        let mut map = match self.fetch(map_name) {
            Ok(map) => {
                info!(
                    difficulties = map.difficulty_names().count(),
                    markers = map.total_markers(),
                    "map loaded"
                );
                map
            }
            Err(e) => {
                warn!(?e, source = %self.source.describe(), "failed to load map, using an empty one");
                MapData::new(map_name)
            }
        };
        // user markers and session data are keyed by the requested name
        if map.map_name != map_name {
            if !map.map_name.is_empty() {
                info!(
                    document_name = %map.map_name,
                    "map document names itself differently, using the requested name"
                );
            }
            map.map_name = map_name.to_string();
        }

        self.user_markers.load_map(map_name);
        if !map.has_difficulty(&self.current_difficulty) {
            debug!(
                difficulty = %self.current_difficulty,
                "difficulty not present in new map, falling back to normal"
            );
            self.current_difficulty = NORMAL_DIFFICULTY.to_string();
        }
        self.enabled_types = map.all_types(&self.current_difficulty);
        self.map_data.insert(map)
    }

    fn fetch(&self, map_name: &str) -> Result<MapData> {
        let json = self.source.fetch(map_name)?;
        MapData::from_json(&json)
    }

    pub fn map_data(&self) -> Option<&MapData> {
        self.map_data.as_ref()
    }

    pub fn map_name(&self) -> Option<&str> {
        self.map_data
            .as_ref()
            .map(|m| m.map_name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// pretty json of the loaded document, user markers not included
    pub fn map_data_json(&self) -> Result<Option<String>> {
        self.map_data.as_ref().map(MapData::to_json_pretty).transpose()
    }

    pub fn current_difficulty(&self) -> &str {
        &self.current_difficulty
    }

    pub fn current_floor(&self) -> i32 {
        self.current_floor
    }

    /// Switches difficulty when the loaded map has it and enables every type found in it.
    pub fn set_difficulty(&mut self, name: &str) -> bool {
        let Some(map) = &self.map_data else {
            return false;
        };
        if !map.has_difficulty(name) {
            debug!(difficulty = name, "ignoring unknown difficulty");
            return false;
        }
        self.current_difficulty = name.to_string();
        self.enabled_types = map.all_types(name);
        true
    }

    /// not checked against the floors of the map
    pub fn set_floor(&mut self, floor: i32) {
        self.current_floor = floor;
    }

    /// floors of the current difficulty, lowest first
    pub fn available_floors(&self) -> Vec<i32> {
        self.map_data
            .as_ref()
            .and_then(|m| m.difficulty(&self.current_difficulty))
            .map(|d| d.floors())
            .unwrap_or_default()
    }

    /// Steps up (positive) or down (negative) through the available floors, stopping at either end.
    /// Returns the floor selected afterwards.
    pub fn change_floor(&mut self, direction: i32) -> i32 {
        let floors = self.available_floors();
        if floors.is_empty() || direction == 0 {
            return self.current_floor;
        }
        let last = floors.len() as i64 - 1;
        let index = match floors.binary_search(&self.current_floor) {
            Ok(index) => index as i64 + i64::from(direction),
            // between two floors, the first step lands on the neighbour in that direction
            Err(insert_at) if direction > 0 => insert_at as i64 + i64::from(direction) - 1,
            Err(insert_at) => insert_at as i64 + i64::from(direction),
        };
        self.current_floor = floors[index.clamp(0, last) as usize];
        self.current_floor
    }

    pub fn current_level(&self) -> Option<&MapLevel> {
        self.map_data
            .as_ref()?
            .difficulty(&self.current_difficulty)?
            .level_by_floor(self.current_floor)
    }

    pub fn current_map_image(&self) -> &str {
        self.current_level()
            .map(|l| l.map_image.as_str())
            .unwrap_or(DEFAULT_MAP_IMAGE)
    }

    /// types of the current difficulty in first-appearance order
    pub fn all_types(&self) -> IndexSet<String> {
        self.map_data
            .as_ref()
            .map(|m| m.all_types(&self.current_difficulty))
            .unwrap_or_default()
    }

    pub fn enabled_types(&self) -> &IndexSet<String> {
        &self.enabled_types
    }

    pub fn is_type_enabled(&self, marker_type: &str) -> bool {
        self.enabled_types.contains(marker_type)
    }

    pub fn toggle_type(&mut self, marker_type: &str) {
        let enabled = self.is_type_enabled(marker_type);
        self.set_type_enabled(marker_type, !enabled);
    }

    pub fn set_type_enabled(&mut self, marker_type: &str, enabled: bool) {
        if enabled {
            self.enabled_types.insert(marker_type.to_string());
        } else {
            self.enabled_types.shift_remove(marker_type);
        }
    }

    pub fn enable_all_types(&mut self) {
        self.enabled_types = self.all_types();
    }

    pub fn disable_all_types(&mut self) {
        self.enabled_types.clear();
    }

    pub fn rarity_enabled(&self, rarity: Rarity) -> bool {
        self.enabled_rarities.contains(&rarity)
    }

    pub fn toggle_rarity(&mut self, rarity: Rarity) {
        if !self.enabled_rarities.shift_remove(&rarity) {
            self.enabled_rarities.insert(rarity);
        }
    }

    fn passes_filters(&self, marker: &MapMarker) -> bool {
        self.is_type_enabled(&marker.marker_type)
            && marker
                .kind
                .container()
                .map(|c| self.rarity_enabled(c.rarity))
                .unwrap_or(true)
    }

    /// Static markers of the current floor that pass the filters, then the user markers of the same slot.
    pub fn visible_markers(&self) -> Vec<&MapMarker> {
        let Some(level) = self.current_level() else {
            return Vec::new();
        };
        let mut markers: Vec<&MapMarker> = level
            .markers
            .iter()
            .filter(|m| self.passes_filters(m))
            .collect();
        if let Some(key) = self.current_key() {
            markers.extend(self.user_markers.markers(&key));
        }
        markers
    }

    /// Visible markers whose name, description or type contains `query`, ignoring case.
    /// An empty query matches everything visible.
    pub fn search(&self, query: &str) -> Vec<&MapMarker> {
        let needle = query.trim().to_lowercase();
        let visible = self.visible_markers();
        if needle.is_empty() {
            return visible;
        }
        visible
            .into_iter()
            .filter(|m| m.matches_lowercase(&needle))
            .collect()
    }

    /// number of static markers per type on the current floor, filters ignored
    pub fn type_counts(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for marker in self.current_level().map(|l| l.markers.as_slice()).unwrap_or_default() {
            *counts.entry(marker.marker_type.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn current_key(&self) -> Option<UserMarkerKey> {
        self.resolve(&MarkerTarget::current())
    }

    fn resolve(&self, target: &MarkerTarget) -> Option<UserMarkerKey> {
        let map_name = target
            .map_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.map_name())?;
        let difficulty = target
            .difficulty
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.current_difficulty);
        Some(UserMarkerKey::new(
            map_name,
            difficulty,
            target.floor.unwrap_or(self.current_floor),
        ))
    }

    pub fn user_markers(&self, key: &UserMarkerKey) -> &[MapMarker] {
        self.user_markers.markers(key)
    }

    /// Stores `marker` as user created and persists it. False when there is no map to key it under.
    pub fn add_user_marker(&mut self, marker: MapMarker, target: MarkerTarget) -> bool {
        let Some(key) = self.resolve(&target) else {
            warn!("no map loaded and no map name given, dropping user marker");
            return false;
        };
        self.user_markers.add(key, marker);
        true
    }

    pub fn remove_user_marker(&mut self, index: usize, target: MarkerTarget) -> bool {
        let Some(key) = self.resolve(&target) else {
            return false;
        };
        self.user_markers.remove(&key, index).is_some()
    }

    /// Drops every user marker of the target slot and persists. Returns how many were removed.
    pub fn clear_user_markers(&mut self, target: MarkerTarget) -> usize {
        let Some(key) = self.resolve(&target) else {
            return 0;
        };
        self.user_markers.clear(&key)
    }

    /// The stored user markers of `map_name`, or of the loaded map, as a json object keyed by slot.
    pub fn export_user_markers(&mut self, map_name: Option<&str>) -> Result<String> {
        let map_name = match map_name.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self
                .map_name()
                .map(str::to_string)
                .ok_or_else(|| miette!("no map loaded to export user markers of"))?,
        };
        self.user_markers.export(&map_name)
    }

    /// removes the first user marker of the current slot within `tolerance` pixels of `position`
    pub fn remove_user_marker_near(&mut self, position: Vector2, tolerance: f64) -> Option<MapMarker> {
        let key = self.current_key()?;
        self.user_markers.remove_near(&key, position, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryMapSource;
    use crate::user_markers::DEFAULT_REMOVE_TOLERANCE;
    use raid_core::MemoryStore;
    use raid_map_models::{ContainerDetails, MarkerKind};
    use rstest::{fixture, rstest};
    use similar_asserts::assert_eq;

    const ARMORY: &str = r#"{
        "mapName": "armory",
        "difficulties": {
            "normal": {
                "name": "normal",
                "levels": [
                    {
                        "name": "Ground",
                        "floor": 0,
                        "mapImage": "armory_ground.png",
                        "markers": [
                            {"name": "Spawn West", "type": "spawn", "position": {"x": 100, "y": 200}},
                            {"name": "Gun Rack", "type": "loot", "description": "weapons on the wall", "position": {"x": 300, "y": 400}},
                            {"name": "Main Gate", "type": "extraction", "position": {"x": 500, "y": 600}}
                        ]
                    },
                    {
                        "name": "Basement",
                        "floor": -1,
                        "mapImage": "armory_basement.png",
                        "markers": [
                            {"name": "Locker", "type": "loot", "position": {"x": 10, "y": 20}},
                            {"name": "Safe", "type": "safe", "kind": "container", "rarity": "legendary", "position": {"x": 30, "y": 40}}
                        ]
                    }
                ]
            },
            "lockdown": {
                "name": "lockdown",
                "levels": [
                    {
                        "name": "Ground",
                        "floor": 0,
                        "markers": [
                            {"name": "Boss", "type": "boss", "position": {"x": 1, "y": 1}}
                        ]
                    }
                ]
            }
        }
    }"#;

    #[fixture]
    fn manager() -> MapDataManager {
        let source = MemoryMapSource::new()
            .with_document("armory", ARMORY)
            .with_document("broken", "{ not json");
        let mut manager = MapDataManager::new(Arc::new(source), Arc::new(MemoryStore::new()));
        manager.load_map_data("armory");
        manager
    }

    fn names<'a>(markers: impl IntoIterator<Item = &'a MapMarker>) -> Vec<&'a str> {
        markers.into_iter().map(|m| m.name.as_str()).collect()
    }

    #[rstest]
    fn loading_enables_every_type_of_the_difficulty(manager: MapDataManager) {
        let enabled: Vec<&str> = manager.enabled_types().iter().map(String::as_str).collect();
        assert_eq!(enabled, vec!["spawn", "loot", "extraction", "safe"]);
        assert_eq!(manager.current_map_image(), "armory_ground.png");
        assert_eq!(
            names(manager.visible_markers()),
            vec!["Spawn West", "Gun Rack", "Main Gate"]
        );
    }

    #[rstest]
    #[case("nonexistent")]
    #[case("broken")]
    fn failed_load_is_an_empty_map(mut manager: MapDataManager, #[case] map_name: &str) {
        let map = manager.load_map_data(map_name);
        assert_eq!(map, &MapData::new(map_name));
        assert!(manager.visible_markers().is_empty());
        assert!(manager.enabled_types().is_empty());
        assert_eq!(manager.current_map_image(), DEFAULT_MAP_IMAGE);
    }

    #[rstest]
    fn switching_floor_shows_only_that_floor(mut manager: MapDataManager) {
        manager.set_floor(-1);
        assert_eq!(names(manager.visible_markers()), vec!["Locker", "Safe"]);
        manager.set_floor(7);
        assert!(manager.visible_markers().is_empty());
    }

    #[rstest]
    fn visible_markers_only_have_enabled_types(mut manager: MapDataManager) {
        manager.toggle_type("loot");
        assert!(!manager.is_type_enabled("loot"));
        let visible = manager.visible_markers();
        assert_eq!(names(visible.iter().copied()), vec!["Spawn West", "Main Gate"]);
        assert!(visible.iter().all(|m| manager.is_type_enabled(&m.marker_type)));
        manager.toggle_type("loot");
        assert_eq!(manager.visible_markers().len(), 3);
        manager.disable_all_types();
        assert!(manager.visible_markers().is_empty());
        manager.enable_all_types();
        assert_eq!(manager.visible_markers().len(), 3);
    }

    #[rstest]
    fn containers_are_filtered_by_rarity(mut manager: MapDataManager) {
        manager.set_floor(-1);
        manager.toggle_rarity(Rarity::Legendary);
        assert!(!manager.rarity_enabled(Rarity::Legendary));
        assert_eq!(names(manager.visible_markers()), vec!["Locker"]);
        manager.toggle_rarity(Rarity::Legendary);
        assert_eq!(manager.visible_markers().len(), 2);
    }

    #[rstest]
    fn difficulty_switch_is_idempotent(mut manager: MapDataManager) {
        assert!(manager.set_difficulty("lockdown"));
        let once = manager.enabled_types().clone();
        assert!(manager.set_difficulty("lockdown"));
        assert_eq!(manager.enabled_types(), &once);
        assert_eq!(names(manager.visible_markers()), vec!["Boss"]);
    }

    #[rstest]
    fn unknown_difficulty_is_ignored(mut manager: MapDataManager) {
        manager.toggle_type("spawn");
        assert!(!manager.set_difficulty("forbidden"));
        assert_eq!(manager.current_difficulty(), "normal");
        assert!(!manager.is_type_enabled("spawn"));
    }

    #[rstest]
    fn missing_difficulty_falls_back_to_normal_on_load(mut manager: MapDataManager) {
        manager.set_difficulty("lockdown");
        manager.load_map_data("nonexistent");
        assert_eq!(manager.current_difficulty(), "normal");
    }

    #[rstest]
    fn user_markers_follow_static_ones(mut manager: MapDataManager) {
        let before: Vec<MapMarker> = manager.visible_markers().into_iter().cloned().collect();
        assert!(manager.add_user_marker(
            MapMarker::new("my stash", "note", Vector2::new(42.0, 42.0)),
            MarkerTarget::current(),
        ));
        let visible = manager.visible_markers();
        assert_eq!(visible.len(), 4);
        assert_eq!(visible[3].name, "my stash");
        assert!(visible[3].is_user_created);

        assert!(manager.remove_user_marker(0, MarkerTarget::current()));
        let after: Vec<MapMarker> = manager.visible_markers().into_iter().cloned().collect();
        assert_eq!(after, before);
        assert!(!manager.remove_user_marker(0, MarkerTarget::current()));
    }

    #[rstest]
    fn user_markers_on_another_floor(mut manager: MapDataManager) {
        manager.add_user_marker(
            MapMarker::new("down here", "note", Vector2::ZERO),
            MarkerTarget::floor(-1),
        );
        assert_eq!(manager.visible_markers().len(), 3);
        manager.set_floor(-1);
        assert_eq!(
            names(manager.visible_markers()),
            vec!["Locker", "Safe", "down here"]
        );
        let key = UserMarkerKey::new("armory", "normal", -1);
        assert_eq!(manager.user_markers(&key).len(), 1);
    }

    #[test]
    fn user_markers_need_a_map_name() {
        let mut manager =
            MapDataManager::new(Arc::new(MemoryMapSource::new()), Arc::new(MemoryStore::new()));
        assert!(!manager.add_user_marker(MapMarker::default(), MarkerTarget::current()));
        assert!(manager.add_user_marker(
            MapMarker::default(),
            MarkerTarget {
                map_name: Some("farm".to_string()),
                ..Default::default()
            }
        ));
    }

    #[test]
    fn user_markers_are_reloaded_with_the_map() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let source: Arc<dyn MapSource> =
            Arc::new(MemoryMapSource::new().with_document("armory", ARMORY));
        let mut first = MapDataManager::new(source.clone(), storage.clone());
        first.load_map_data("armory");
        first.add_user_marker(
            MapMarker::new("kept", "note", Vector2::new(7.0, 7.0)),
            MarkerTarget::current(),
        );

        let mut second = MapDataManager::new(source, storage);
        second.load_map_data("armory");
        assert_eq!(second.visible_markers().last().unwrap().name, "kept");
        assert_eq!(
            second
                .remove_user_marker_near(Vector2::new(9.0, 3.0), DEFAULT_REMOVE_TOLERANCE)
                .unwrap()
                .name,
            "kept"
        );
        assert_eq!(second.visible_markers().len(), 3);
    }

    #[rstest]
    fn search_looks_at_name_description_and_type(manager: MapDataManager) {
        assert_eq!(names(manager.search("WEAPONS")), vec!["Gun Rack"]);
        assert_eq!(names(manager.search("extr")), vec!["Main Gate"]);
        assert_eq!(manager.search("  ").len(), 3);
        assert!(manager.search("helicopter").is_empty());
    }

    #[rstest]
    fn floors_step_and_stop_at_the_ends(mut manager: MapDataManager) {
        assert_eq!(manager.available_floors(), vec![-1, 0]);
        assert_eq!(manager.change_floor(1), 0);
        assert_eq!(manager.change_floor(-1), -1);
        assert_eq!(manager.change_floor(-1), -1);
        assert_eq!(manager.current_map_image(), "armory_basement.png");
        manager.set_floor(5);
        assert_eq!(manager.change_floor(-1), 0);
    }

    #[rstest]
    fn type_counts_of_the_current_floor(mut manager: MapDataManager) {
        manager.set_floor(-1);
        let counts: Vec<(String, usize)> = manager.type_counts().into_iter().collect();
        assert_eq!(
            counts,
            vec![("loot".to_string(), 1), ("safe".to_string(), 1)]
        );
    }

    #[rstest]
    fn document_json_is_available(manager: MapDataManager) {
        let json = manager.map_data_json().unwrap().unwrap();
        let parsed = MapData::from_json(&json).unwrap();
        assert_eq!(Some(&parsed), manager.map_data());
        let safe = &parsed.difficulty("normal").unwrap().levels[1].markers[1];
        assert_eq!(
            safe.kind,
            MarkerKind::Container(ContainerDetails {
                rarity: Rarity::Legendary,
                ..Default::default()
            })
        );
    }

    #[test]
    fn document_name_does_not_split_user_markers() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let source: Arc<dyn MapSource> = Arc::new(
            MemoryMapSource::new()
                .with_document("armory", ARMORY.replacen("\"armory\"", "\"Armory\"", 1)),
        );
        let mut first = MapDataManager::new(source.clone(), storage.clone());
        assert_eq!(first.load_map_data("armory").map_name, "armory");
        first.add_user_marker(
            MapMarker::new("mine", "note", Vector2::ZERO),
            MarkerTarget::current(),
        );

        let mut second = MapDataManager::new(source, storage.clone());
        second.load_map_data("armory");
        assert_eq!(second.visible_markers().last().unwrap().name, "mine");
        assert!(storage.get("map_user_markers_armory").unwrap().is_some());
        assert!(storage.get("map_user_markers_Armory").unwrap().is_none());
    }

    #[test]
    fn markers_of_another_map_are_appended_to_its_stored_ones() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let source: Arc<dyn MapSource> =
            Arc::new(MemoryMapSource::new().with_document("armory", ARMORY));
        let farm = || MarkerTarget {
            map_name: Some("farm".to_string()),
            ..Default::default()
        };
        let mut first = MapDataManager::new(source.clone(), storage.clone());
        first.add_user_marker(MapMarker::new("one", "note", Vector2::ZERO), farm());
        first.add_user_marker(MapMarker::new("two", "note", Vector2::ZERO), farm());

        let mut second = MapDataManager::new(source.clone(), storage.clone());
        second.load_map_data("armory");
        second.add_user_marker(MapMarker::new("new", "note", Vector2::ZERO), farm());

        let mut third = MapDataManager::new(source, storage);
        third.load_map_data("farm");
        let key = UserMarkerKey::new("farm", "normal", 0);
        assert_eq!(names(third.user_markers(&key)), vec!["one", "two", "new"]);
    }

    #[test]
    fn user_markers_on_a_difficulty_with_underscores() {
        let hard_mode = ARMORY.replace("\"lockdown\"", "\"hard_mode\"");
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let source: Arc<dyn MapSource> =
            Arc::new(MemoryMapSource::new().with_document("armory", hard_mode));
        let mut first = MapDataManager::new(source.clone(), storage.clone());
        first.load_map_data("armory");
        assert!(first.set_difficulty("hard_mode"));
        first.add_user_marker(
            MapMarker::new("mine", "note", Vector2::ZERO),
            MarkerTarget::current(),
        );
        assert_eq!(first.visible_markers().len(), 2);

        let mut second = MapDataManager::new(source, storage);
        second.load_map_data("armory");
        second.set_difficulty("hard_mode");
        assert_eq!(names(second.visible_markers()), vec!["Boss", "mine"]);
    }

    #[rstest]
    fn cleared_markers_stay_gone(mut manager: MapDataManager) {
        manager.add_user_marker(
            MapMarker::new("a", "note", Vector2::ZERO),
            MarkerTarget::current(),
        );
        manager.add_user_marker(
            MapMarker::new("b", "note", Vector2::ZERO),
            MarkerTarget::floor(-1),
        );
        assert_eq!(manager.clear_user_markers(MarkerTarget::current()), 1);
        assert_eq!(manager.visible_markers().len(), 3);

        let exported: serde_json::Value =
            serde_json::from_str(&manager.export_user_markers(None).unwrap()).unwrap();
        let slots: Vec<&String> = exported.as_object().unwrap().keys().collect();
        assert_eq!(slots, vec!["armory_normal_-1"]);
        assert_eq!(exported["armory_normal_-1"][0]["name"], "b");
        assert_eq!(manager.export_user_markers(Some("farm")).unwrap(), "{}");
    }

    #[test]
    fn export_needs_a_map() {
        let mut manager =
            MapDataManager::new(Arc::new(MemoryMapSource::new()), Arc::new(MemoryStore::new()));
        assert!(manager.export_user_markers(None).is_err());
    }
}
