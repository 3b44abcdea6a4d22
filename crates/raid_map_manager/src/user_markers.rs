use std::{fmt, sync::Arc};

use indexmap::{IndexMap, IndexSet};
use miette::{IntoDiagnostic, Result};
use raid_core::{storage, KeyValueStore, Vector2};
use raid_map_models::MapMarker;
use tracing::{error, info, warn};

pub const USER_MARKERS_KEY_PREFIX: &str = "map_user_markers_";
/// pixels on each axis within which a click hits a user marker
pub const DEFAULT_REMOVE_TOLERANCE: f64 = 5.0;

/// `(map, difficulty, floor)` slot of user markers, written as `<map>_<difficulty>_<floor>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserMarkerKey {
    pub map_name: String,
    pub difficulty: String,
    pub floor: i32,
}

impl UserMarkerKey {
    pub fn new(map_name: impl Into<String>, difficulty: impl Into<String>, floor: i32) -> Self {
        Self {
            map_name: map_name.into(),
            difficulty: difficulty.into(),
            floor,
        }
    }

    /// Reads back a slot stored under `map_name`.
    /// Map and difficulty names may both contain `_`: the map prefix is known, the floor is after the last `_`.
    pub fn parse_for_map(map_name: &str, raw: &str) -> Result<Self, String> {
        let rest = raw
            .strip_prefix(map_name)
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or_else(|| format!("user marker key {raw} does not belong to map {map_name}"))?;
        let Some((difficulty, floor)) = rest.rsplit_once('_') else {
            return Err(format!("user marker key {raw} is not <map>_<difficulty>_<floor>"));
        };
        if difficulty.is_empty() {
            return Err(format!("user marker key {raw} has no difficulty"));
        }
        let floor = floor
            .parse()
            .map_err(|e| format!("user marker key {raw} has an invalid floor: {e}"))?;
        Ok(Self::new(map_name, difficulty, floor))
    }
}

impl fmt::Display for UserMarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.map_name, self.difficulty, self.floor)
    }
}

/// Markers placed by the user, kept apart from the static map tree.
/// Every change is written back right away under `map_user_markers_<map>`.
pub struct UserMarkerStore {
    storage: Arc<dyn KeyValueStore>,
    markers: IndexMap<UserMarkerKey, Vec<MapMarker>>,
    /// maps whose stored slots are already in memory
    loaded: IndexSet<String>,
}

impl UserMarkerStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            markers: Default::default(),
            loaded: Default::default(),
        }
    }

    pub fn storage_key(map_name: &str) -> String {
        format!("{USER_MARKERS_KEY_PREFIX}{map_name}")
    }

    /// Pulls the persisted markers of one map into memory.
    /// Slots in storage replace the in-memory ones, slots of other maps stay untouched.
    pub fn load_map(&mut self, map_name: &str) {
        self.loaded.insert(map_name.to_string());
        let key = Self::storage_key(map_name);
        let Some(stored) =
            storage::load_json::<IndexMap<String, Vec<MapMarker>>>(self.storage.as_ref(), &key)
        else {
            return;
        };
        let mut count = 0;
        for (slot, markers) in stored {
            match UserMarkerKey::parse_for_map(map_name, &slot) {
                Ok(slot) => {
                    count += markers.len();
                    self.markers.insert(slot, markers);
                }
                Err(e) => warn!(%e, "skipping stored user markers"),
            }
        }
        info!(map_name, count, "loaded user markers");
    }

    /// Changes are written per map, so a map must be read before its first change.
    fn ensure_loaded(&mut self, map_name: &str) {
        if !self.loaded.contains(map_name) {
            self.load_map(map_name);
        }
    }

    pub fn markers(&self, key: &UserMarkerKey) -> &[MapMarker] {
        self.markers.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn add(&mut self, key: UserMarkerKey, mut marker: MapMarker) {
        marker.is_user_created = true;
        let map_name = key.map_name.clone();
        self.ensure_loaded(&map_name);
        self.markers.entry(key).or_default().push(marker);
        self.persist(&map_name);
    }

    /// out of range is a no-op
    pub fn remove(&mut self, key: &UserMarkerKey, index: usize) -> Option<MapMarker> {
        self.ensure_loaded(&key.map_name);
        let markers = self.markers.get_mut(key)?;
        if index >= markers.len() {
            return None;
        }
        let removed = markers.remove(index);
        self.persist(&key.map_name);
        Some(removed)
    }

    /// removes the first marker of the slot within `tolerance` pixels of `position` on both axes
    pub fn remove_near(
        &mut self,
        key: &UserMarkerKey,
        position: Vector2,
        tolerance: f64,
    ) -> Option<MapMarker> {
        self.ensure_loaded(&key.map_name);
        let index = self
            .markers(key)
            .iter()
            .position(|m| m.position.is_near(&position, tolerance))?;
        self.remove(key, index)
    }

    /// Drops every marker of the slot. Returns how many were removed.
    pub fn clear(&mut self, key: &UserMarkerKey) -> usize {
        self.ensure_loaded(&key.map_name);
        let Some(removed) = self.markers.shift_remove(key) else {
            return 0;
        };
        self.persist(&key.map_name);
        info!(slot = %key, count = removed.len(), "cleared user markers");
        removed.len()
    }

    /// All user markers of `map_name` as the pretty printed json object they are stored as.
    pub fn export(&mut self, map_name: &str) -> Result<String> {
        self.ensure_loaded(map_name);
        serde_json::to_string_pretty(&self.slots_of(map_name)).into_diagnostic()
    }

    fn slots_of(&self, map_name: &str) -> IndexMap<String, &Vec<MapMarker>> {
        self.markers
            .iter()
            .filter(|(key, _)| key.map_name == map_name)
            .map(|(key, markers)| (key.to_string(), markers))
            .collect()
    }

    /// Writes every slot of `map_name`. Failures are logged, the in-memory state stays authoritative.
    fn persist(&self, map_name: &str) {
        let slots = self.slots_of(map_name);
        let key = Self::storage_key(map_name);
        if let Err(e) = storage::save_json(self.storage.as_ref(), &key, &slots) {
            error!(?e, map_name, "failed to save user markers");
        }
    }
}
