/*
shared plumbing of raidmap crates:
1. serde helpers for glam types used in map documents
2. durable key/value storage (what the browser viewer kept in localStorage)
3. data directory, configuration and tracing setup used by the launcher
*/

pub mod config;
pub mod init;
pub mod serde_glam;
pub mod storage;
pub mod trace;

pub use config::{MapDimensions, MapSourceConfig, ViewerConfig};
pub use serde_glam::Vector2;
pub use storage::{DirStore, KeyValueStore, MemoryStore};
