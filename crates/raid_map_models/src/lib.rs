//! Map document model of the viewer.
//! A map holds difficulties (game modes), a difficulty holds levels (floors) and a level holds markers.
//! Nothing in here does any io, loading and persistence live in `raid_map_manager`.

mod difficulty;
mod level;
mod map;
mod marker;
pub mod summary;

pub use difficulty::{MapDifficulty, FORBIDDEN_DIFFICULTY, LOCKDOWN_DIFFICULTY, NORMAL_DIFFICULTY};
pub use level::{MapLevel, DEFAULT_MAP_IMAGE};
pub use map::MapData;
pub use marker::{
    ContainerDetails, MapMarker, MarkerKind, Rarity, DEFAULT_MARKER_COLOR,
    DEFAULT_MARKER_FALLBACK_COLOR, DEFAULT_MARKER_ICON, DEFAULT_MARKER_TYPE, DEFAULT_RESPAWN_SECS,
};
pub use summary::{validate_map_document, MapRating, MapSummary};
