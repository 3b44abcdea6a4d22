use std::{sync::Arc, time::Instant};

use indexmap::IndexMap;
use miette::{IntoDiagnostic, Result};
use raid_core::{storage, KeyValueStore};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, error};

use crate::user_markers::UserMarkerStore;

pub const SELECTED_MAP_KEY: &str = "selectedMap";
pub const SELECTED_DIFFICULTY_KEY: &str = "selectedDifficulty";

fn current_floor_key(map_name: &str) -> String {
    format!("current_floor_{map_name}")
}
fn visit_count_key(map_name: &str) -> String {
    format!("visit_count_{map_name}")
}
fn last_visited_key(map_name: &str) -> String {
    format!("last_visited_{map_name}")
}
fn time_spent_key(map_name: &str) -> String {
    format!("time_spent_{map_name}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStats {
    pub user_marker_count: usize,
    pub visit_count: u64,
    pub time_spent_ms: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_visited: Option<OffsetDateTime>,
}

/// Selection handed from the map picker to the viewer, and per map visit bookkeeping.
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
    visit: Option<(String, Instant)>,
}

impl Session {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            visit: None,
        }
    }

    pub fn selected_map(&self) -> Option<String> {
        storage::load_json::<String>(self.storage.as_ref(), SELECTED_MAP_KEY)
            .filter(|name| !name.is_empty())
    }

    pub fn select_map(&self, map_name: &str) -> Result<()> {
        storage::save_json(self.storage.as_ref(), SELECTED_MAP_KEY, map_name)
    }

    pub fn selected_difficulty(&self) -> Option<String> {
        storage::load_json::<String>(self.storage.as_ref(), SELECTED_DIFFICULTY_KEY)
            .filter(|name| !name.is_empty())
    }

    pub fn select_difficulty(&self, difficulty: &str) -> Result<()> {
        storage::save_json(self.storage.as_ref(), SELECTED_DIFFICULTY_KEY, difficulty)
    }

    /// floor the user last looked at on that map
    pub fn saved_floor(&self, map_name: &str) -> Option<i32> {
        storage::load_json(self.storage.as_ref(), &current_floor_key(map_name))
    }

    pub fn save_floor(&self, map_name: &str, floor: i32) -> Result<()> {
        storage::save_json(self.storage.as_ref(), &current_floor_key(map_name), &floor)
    }

    /// Counts a visit of `map_name` and starts timing it. A visit still running is closed first.
    pub fn begin_visit(&mut self, map_name: &str) -> Result<()> {
        self.end_visit()?;
        let count_key = visit_count_key(map_name);
        let visits: u64 = storage::load_json(self.storage.as_ref(), &count_key).unwrap_or_default();
        storage::save_json(self.storage.as_ref(), &count_key, &(visits + 1))?;
        let now = OffsetDateTime::now_utc().format(&Rfc3339).into_diagnostic()?;
        storage::save_json(self.storage.as_ref(), &last_visited_key(map_name), &now)?;
        self.visit = Some((map_name.to_string(), Instant::now()));
        Ok(())
    }

    /// Adds the time since [Self::begin_visit] to the map's total.
    pub fn end_visit(&mut self) -> Result<()> {
        let Some((map_name, started)) = self.visit.take() else {
            return Ok(());
        };
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let key = time_spent_key(&map_name);
        let total: u64 = storage::load_json(self.storage.as_ref(), &key).unwrap_or_default();
        debug!(%map_name, elapsed, "visit ended");
        storage::save_json(self.storage.as_ref(), &key, &total.saturating_add(elapsed))
    }

    pub fn stats(&self, map_name: &str) -> MapStats {
        let store = self.storage.as_ref();
        let user_marker_count = storage::load_json::<IndexMap<String, Vec<serde_json::Value>>>(
            store,
            &UserMarkerStore::storage_key(map_name),
        )
        .map(|slots| slots.values().map(Vec::len).sum())
        .unwrap_or_default();
        let last_visited = storage::load_json::<String>(store, &last_visited_key(map_name))
            .and_then(|raw| match OffsetDateTime::parse(&raw, &Rfc3339) {
                Ok(at) => Some(at),
                Err(e) => {
                    error!(?e, map_name, "invalid last visit timestamp");
                    None
                }
            });
        MapStats {
            user_marker_count,
            visit_count: storage::load_json(store, &visit_count_key(map_name)).unwrap_or_default(),
            time_spent_ms: storage::load_json(store, &time_spent_key(map_name)).unwrap_or_default(),
            last_visited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_markers::UserMarkerKey;
    use raid_core::{MemoryStore, Vector2};
    use raid_map_models::MapMarker;
    use similar_asserts::assert_eq;

    fn session() -> (Arc<dyn KeyValueStore>, Session) {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        (storage.clone(), Session::new(storage))
    }

    #[test]
    fn selection_is_handed_over() {
        let (storage, session) = session();
        assert_eq!(session.selected_map(), None);
        session.select_map("valley").unwrap();
        session.select_difficulty("lockdown").unwrap();
        let next_page = Session::new(storage);
        assert_eq!(next_page.selected_map().as_deref(), Some("valley"));
        assert_eq!(next_page.selected_difficulty().as_deref(), Some("lockdown"));
    }

    #[test]
    fn floor_is_remembered_per_map() {
        let (_, session) = session();
        session.save_floor("armory", -1).unwrap();
        assert_eq!(session.saved_floor("armory"), Some(-1));
        assert_eq!(session.saved_floor("farm"), None);
    }

    #[test]
    fn visits_are_counted_and_timed() {
        let (storage, mut session) = session();
        session.begin_visit("farm").unwrap();
        session.begin_visit("farm").unwrap();
        session.end_visit().unwrap();
        let mut markers = UserMarkerStore::new(storage.clone());
        markers.add(
            UserMarkerKey::new("farm", "normal", 0),
            MapMarker::new("note", "note", Vector2::ZERO),
        );

        let stats = session.stats("farm");
        assert_eq!(stats.visit_count, 2);
        assert_eq!(stats.user_marker_count, 1);
        assert!(stats.last_visited.is_some());
        assert!(storage.get("time_spent_farm").unwrap().is_some());
        assert_eq!(
            session.stats("valley"),
            MapStats {
                user_marker_count: 0,
                visit_count: 0,
                time_spent_ms: 0,
                last_visited: None,
            }
        );
    }

    #[test]
    fn broken_timestamp_is_ignored() {
        let (storage, session) = session();
        storage.set("last_visited_farm", "\"yesterday\"").unwrap();
        assert_eq!(session.stats("farm").last_visited, None);
    }
}
