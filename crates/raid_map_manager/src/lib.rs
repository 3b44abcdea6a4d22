/*
Runtime side of the viewer:
1. fetch map documents (http or a directory) and list the maps that validate
2. track the current map, difficulty, floor and marker filters, and merge user markers into what is visible
3. convert between game pixels, viewport coordinates, grid cells and canvas points
4. remember selections and visits across sessions
*/

pub mod catalog;
pub mod context;
pub mod grid;
pub mod manager;
pub mod session;
pub mod source;
pub mod transform;
pub mod user_markers;
pub mod viewport;

pub use catalog::MapCatalog;
pub use context::{CursorReadout, MapViewerContext};
pub use grid::GridReference;
pub use manager::{MapDataManager, MarkerTarget};
pub use session::{MapStats, Session};
pub use source::{DirMapSource, HttpMapSource, MapSource, MemoryMapSource};
pub use transform::{LatLng, MapTransform, ViewportBounds};
pub use user_markers::{UserMarkerKey, UserMarkerStore};
pub use viewport::Viewport;
