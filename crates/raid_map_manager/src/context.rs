use std::sync::Arc;

use cap_std::fs_utf8::Dir;
use miette::Result;
use raid_core::{DirStore, KeyValueStore, Vector2, ViewerConfig};
use tracing::{error, info};

use crate::catalog::MapCatalog;
use crate::grid::GridReference;
use crate::manager::MapDataManager;
use crate::session::Session;
use crate::source::{map_source_from_config, MapSource};
use crate::transform::{LatLng, MapTransform};
use crate::viewport::Viewport;

pub const STORAGE_DIR_NAME: &str = "storage";

/// Live cursor position as shown in the coordinate box.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorReadout {
    pub pixel: Vector2,
    pub grid_cell: String,
}

/// Everything one viewer window needs, built once at startup and passed around by reference.
pub struct MapViewerContext {
    pub config: ViewerConfig,
    pub manager: MapDataManager,
    pub session: Session,
    pub transform: MapTransform,
    pub grid: GridReference,
    pub viewport: Viewport,
    source: Arc<dyn MapSource>,
}

impl MapViewerContext {
    pub fn new(
        config: ViewerConfig,
        source: Arc<dyn MapSource>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let dimensions = config.map_dimensions;
        Self {
            manager: MapDataManager::new(source.clone(), storage.clone()),
            session: Session::new(storage),
            transform: MapTransform::from_config(&config),
            grid: GridReference::new(config.grid_size),
            viewport: Viewport::new(dimensions.width, dimensions.height),
            source,
            config,
        }
    }

    /// Storage goes to `storage/` and maps come from wherever the config points, both inside `root_dir`.
    pub fn from_data_dir(root_dir: &Dir, config: ViewerConfig) -> Result<Self> {
        let storage = DirStore::open_in(root_dir, STORAGE_DIR_NAME)?;
        let source = map_source_from_config(&config.map_source, root_dir)?;
        Ok(Self::new(config, source, Arc::new(storage)))
    }

    pub fn discover_maps(&self) -> MapCatalog {
        MapCatalog::discover(self.source.as_ref(), self.config.candidate_maps.as_slice())
    }

    /// The map picked last time, else the first discovered one, else the configured default.
    pub fn initial_map(&self, catalog: &MapCatalog) -> String {
        self.session
            .selected_map()
            .or_else(|| catalog.first().map(str::to_string))
            .unwrap_or_else(|| self.config.default_map.clone())
    }

    /// Loads `map_name`, restores the difficulty and floor the user had, and starts a visit.
    pub fn open_map(&mut self, map_name: &str) {
        if let Err(e) = self.session.begin_visit(map_name) {
            error!(?e, map_name, "failed to record map visit");
        }
        if let Err(e) = self.session.select_map(map_name) {
            error!(?e, map_name, "failed to remember selected map");
        }
        self.manager.load_map_data(map_name);

        if let Some(difficulty) = self.session.selected_difficulty() {
            self.manager.set_difficulty(&difficulty);
        }
        let floors = self.manager.available_floors();
        let floor = self
            .session
            .saved_floor(map_name)
            .filter(|floor| floors.contains(floor))
            .or_else(|| floors.contains(&0).then_some(0))
            .or_else(|| floors.first().copied())
            .unwrap_or(0);
        self.manager.set_floor(floor);
        self.viewport.reset();
        info!(
            map_name,
            difficulty = self.manager.current_difficulty(),
            floor,
            "map opened"
        );
    }

    pub fn set_difficulty(&mut self, difficulty: &str) -> bool {
        if !self.manager.set_difficulty(difficulty) {
            return false;
        }
        if let Err(e) = self.session.select_difficulty(difficulty) {
            error!(?e, difficulty, "failed to remember selected difficulty");
        }
        true
    }

    pub fn set_floor(&mut self, floor: i32) {
        self.manager.set_floor(floor);
        self.remember_floor();
    }

    pub fn change_floor(&mut self, direction: i32) -> i32 {
        let floor = self.manager.change_floor(direction);
        self.remember_floor();
        floor
    }

    fn remember_floor(&self) {
        let Some(map_name) = self.manager.map_name() else {
            return;
        };
        if let Err(e) = self.session.save_floor(map_name, self.manager.current_floor()) {
            error!(?e, map_name, "failed to remember floor");
        }
    }

    pub fn cursor_readout(&self, latlng: LatLng) -> CursorReadout {
        let pixel = self.transform.to_game_pixel(latlng);
        CursorReadout {
            pixel,
            grid_cell: self.grid.to_grid(pixel),
        }
    }

    /// "go to X,Y": where the viewport should center for a typed game position
    pub fn go_to(&self, position: Vector2) -> LatLng {
        self.transform.to_viewport(position)
    }

    /// Closes the running visit so its time is counted.
    pub fn close(&mut self) {
        if let Err(e) = self.session.end_visit() {
            error!(?e, "failed to record time spent on map");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryMapSource;
    use cap_std::ambient_authority;
    use cap_std::fs_utf8::camino::Utf8Path;
    use raid_core::MemoryStore;
    use similar_asserts::assert_eq;

    const VALLEY: &str = r#"{
        "mapName": "valley",
        "difficulties": {
            "normal": {"name": "normal", "levels": [
                {"name": "Ground", "floor": 0, "markers": [
                    {"name": "Bridge", "type": "extraction", "position": {"x": 250, "y": 150}}
                ]},
                {"name": "Bunker", "floor": -2, "markers": []}
            ]},
            "lockdown": {"name": "lockdown", "levels": [
                {"name": "Ground", "floor": 0, "markers": []}
            ]}
        }
    }"#;

    fn context(storage: Arc<dyn KeyValueStore>) -> MapViewerContext {
        let source = MemoryMapSource::new().with_document("valley", VALLEY);
        MapViewerContext::new(ViewerConfig::default(), Arc::new(source), storage)
    }

    #[test]
    fn selection_and_floor_survive_a_restart() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut first = context(storage.clone());
        let catalog = first.discover_maps();
        assert_eq!(first.initial_map(&catalog), "valley");
        first.open_map("valley");
        assert!(first.set_difficulty("lockdown"));
        assert!(!first.set_difficulty("forbidden"));
        first.set_difficulty("normal");
        assert_eq!(first.change_floor(-1), -2);
        first.close();

        let mut second = context(storage);
        let catalog = MapCatalog::default();
        assert_eq!(second.initial_map(&catalog), "valley");
        second.open_map("valley");
        assert_eq!(second.manager.current_difficulty(), "normal");
        assert_eq!(second.manager.current_floor(), -2);
        assert_eq!(second.session.stats("valley").visit_count, 2);
    }

    #[test]
    fn default_map_when_nothing_is_known() {
        let context = context(Arc::new(MemoryStore::new()));
        assert_eq!(context.initial_map(&MapCatalog::default()), "armory");
    }

    #[test]
    fn cursor_readout_names_the_cell() {
        let context = context(Arc::new(MemoryStore::new()));
        let latlng = context.go_to(Vector2::new(250.0, 150.0));
        assert_eq!(
            context.cursor_readout(latlng),
            CursorReadout {
                pixel: Vector2::new(250.0, 150.0),
                grid_cell: "B3".to_string(),
            }
        );
    }

    #[test]
    fn data_dir_context_reads_maps_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let root =
            Dir::open_ambient_dir(Utf8Path::from_path(tmp.path()).unwrap(), ambient_authority())
                .unwrap();
        let mut context = MapViewerContext::from_data_dir(&root, ViewerConfig::default()).unwrap();
        root.write("maps/valley.json", VALLEY).unwrap();
        context.open_map("valley");
        assert_eq!(context.manager.map_data().unwrap().total_markers(), 1);
        assert_eq!(context.manager.visible_markers().len(), 1);
        assert!(root.exists("storage/selectedMap.json"));
    }
}
