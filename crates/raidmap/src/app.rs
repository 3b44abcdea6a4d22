use std::sync::Arc;

use cap_std::fs_utf8::Dir;
use raid_core::{
    init::{get_raidmap_dir, get_raidmap_path},
    trace::install_tracing,
    MemoryStore, ViewerConfig,
};
use raid_map_manager::{MapCatalog, MapViewerContext, MemoryMapSource};
use tracing::{error, info, info_span, warn};

/// Opens the context on the data directory. When its storage cannot be opened the viewer still runs,
/// but nothing is remembered and no map can be found.
fn build_context(raidmap_dir: &Dir, config: ViewerConfig) -> MapViewerContext {
    match MapViewerContext::from_data_dir(raidmap_dir, config.clone()) {
        Ok(context) => context,
        Err(e) => {
            error!(?e, "failed to open raidmap data directory, running without persistence");
            MapViewerContext::new(
                config,
                Arc::new(MemoryMapSource::new()),
                Arc::new(MemoryStore::new()),
            )
        }
    }
}

fn log_catalog(catalog: &MapCatalog) {
    if catalog.is_empty() {
        warn!("no map document found, check map_source in viewer.toml");
        return;
    }
    for summary in catalog.summaries() {
        info!(
            map_name = %summary.map_name,
            display_name = %summary.display_name,
            rating = ?summary.rating,
            features = ?summary.features,
            markers = summary.total_markers,
            difficulties = ?summary.difficulties,
            "available map"
        );
    }
    info!(
        maps = catalog.len(),
        markers = catalog.total_markers(),
        "map catalog ready"
    );
}

/// What a front end would draw for the current selection.
fn log_current_view(context: &MapViewerContext) {
    let manager = &context.manager;
    let span = info_span!(
        "current view",
        difficulty = manager.current_difficulty(),
        floor = manager.current_floor()
    );
    let _enter = span.enter();
    info!(
        image = manager.current_map_image(),
        floors = ?manager.available_floors(),
        types = ?manager.type_counts(),
        "level"
    );
    for marker in manager.visible_markers() {
        let readout = context.cursor_readout(context.go_to(marker.position));
        info!(
            name = %marker.name,
            marker_type = %marker.marker_type,
            position = %marker.position,
            grid_cell = %readout.grid_cell,
            user_created = marker.is_user_created,
            "marker"
        );
    }
}

pub fn start_raidmap() {
    let raidmap_path = match get_raidmap_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("failed to find raidmap data path: {e:?}");
            return;
        }
    };
    let raidmap_dir = match get_raidmap_dir(&raidmap_path) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("failed to create raidmap dir: {e:?}");
            return;
        }
    };
    let log_file_flush_guard = match install_tracing(&raidmap_path) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to install tracing: {e:?}");
            return;
        }
    };
    info!(%raidmap_path, "starting raidmap");

    let config = ViewerConfig::load_or_default(&raidmap_dir);
    let mut context = build_context(&raidmap_dir, config);
    let catalog = context.discover_maps();
    log_catalog(&catalog);

    let map_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| context.initial_map(&catalog));
    context.open_map(&map_name);
    log_current_view(&context);
    if let Some(stats) = context.manager.map_name().map(|name| context.session.stats(name)) {
        info!(
            visits = stats.visit_count,
            time_spent_ms = stats.time_spent_ms,
            user_markers = stats.user_marker_count,
            "map stats"
        );
    }

    context.close();
    info!("exiting raidmap");
    std::mem::drop(log_file_flush_guard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_std::ambient_authority;
    use cap_std::fs_utf8::camino::Utf8Path;
    use similar_asserts::assert_eq;

    #[test]
    fn context_on_a_fresh_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root =
            Dir::open_ambient_dir(Utf8Path::from_path(tmp.path()).unwrap(), ambient_authority())
                .unwrap();
        let config = ViewerConfig::load_or_default(&root);
        let mut context = build_context(&root, config);
        let catalog = context.discover_maps();
        assert!(catalog.is_empty());
        let map_name = context.initial_map(&catalog);
        assert_eq!(map_name, "armory");
        context.open_map(&map_name);
        assert_eq!(context.manager.map_name(), Some("armory"));
        assert!(context.manager.visible_markers().is_empty());
        context.close();
        assert!(root.exists("viewer.toml"));
        assert!(root.exists("maps"));
    }
}
