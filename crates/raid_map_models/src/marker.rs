use std::str::FromStr;

use raid_core::Vector2;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_MARKER_TYPE: &str = "default";
pub const DEFAULT_MARKER_ICON: &str = "test.png";
pub const DEFAULT_MARKER_COLOR: &str = "#808080";
pub const DEFAULT_MARKER_FALLBACK_COLOR: &str = "#606060";
pub const DEFAULT_RESPAWN_SECS: u32 = 600;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub fn color(&self) -> &'static str {
        match self {
            Self::Common => "#9E9E9E",
            Self::Uncommon => "#4CAF50",
            Self::Rare => "#2196F3",
            Self::Epic => "#9C27B0",
            Self::Legendary => "#FF9800",
        }
    }
}

impl FromStr for Rarity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "common" => Self::Common,
            "uncommon" => Self::Uncommon,
            "rare" => Self::Rare,
            "epic" => Self::Epic,
            "legendary" => Self::Legendary,
            _ => return Err("unknown rarity"),
        })
    }
}

impl AsRef<str> for Rarity {
    fn as_ref(&self) -> &str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDetails {
    pub rarity: Rarity,
    pub respawn_secs: u32,
    pub contents: Vec<String>,
}

impl Default for ContainerDetails {
    fn default() -> Self {
        Self {
            rarity: Rarity::default(),
            respawn_secs: DEFAULT_RESPAWN_SECS,
            contents: Vec::new(),
        }
    }
}

/// What a marker stands for.
/// Category markers are points of interest (spawns, extractions, loot areas...),
/// container markers are lootable objects and carry what they hold.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerKind {
    Category { loot_quality: Option<String> },
    Container(ContainerDetails),
}

impl Default for MarkerKind {
    fn default() -> Self {
        Self::Category { loot_quality: None }
    }
}

impl MarkerKind {
    pub fn container(&self) -> Option<&ContainerDetails> {
        match self {
            Self::Container(details) => Some(details),
            Self::Category { .. } => None,
        }
    }
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }
}

/// Leaf of the map tree. `marker_type` is the filter category shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMarker", into = "RawMarker")]
pub struct MapMarker {
    pub name: String,
    pub marker_type: String,
    pub icon: String,
    pub color: String,
    pub fallback_color: String,
    pub description: String,
    pub position: Vector2,
    pub is_user_created: bool,
    pub kind: MarkerKind,
}

impl Default for MapMarker {
    fn default() -> Self {
        Self {
            name: String::new(),
            marker_type: DEFAULT_MARKER_TYPE.to_string(),
            icon: DEFAULT_MARKER_ICON.to_string(),
            color: DEFAULT_MARKER_COLOR.to_string(),
            fallback_color: DEFAULT_MARKER_FALLBACK_COLOR.to_string(),
            description: String::new(),
            position: Vector2::ZERO,
            is_user_created: false,
            kind: MarkerKind::default(),
        }
    }
}

impl MapMarker {
    pub fn new(name: impl Into<String>, marker_type: impl Into<String>, position: Vector2) -> Self {
        Self {
            name: name.into(),
            marker_type: marker_type.into(),
            position,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_kind(mut self, kind: MarkerKind) -> Self {
        self.kind = kind;
        self
    }

    /// case insensitive match on name, description or type. `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.marker_type.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawMarkerKind {
    Category,
    Container,
}

/// On disk layout of a marker, every field optional.
/// Empty strings count as missing, like the authored documents expect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawMarker {
    name: Option<String>,
    #[serde(rename = "type")]
    marker_type: Option<String>,
    icon: Option<String>,
    color: Option<String>,
    fallback_color: Option<String>,
    description: Option<String>,
    position: Option<Vector2>,
    is_user_created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<RawMarkerKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loot_quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    respawn_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contents: Option<Vec<String>>,
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl From<RawMarker> for MapMarker {
    fn from(raw: RawMarker) -> Self {
        let kind = match raw.kind {
            Some(RawMarkerKind::Container) => {
                let rarity = match raw.rarity.as_deref().map(Rarity::from_str) {
                    Some(Ok(rarity)) => rarity,
                    Some(Err(_)) => {
                        warn!(rarity = ?raw.rarity, "unknown container rarity, using common");
                        Rarity::Common
                    }
                    None => Rarity::Common,
                };
                MarkerKind::Container(ContainerDetails {
                    rarity,
                    respawn_secs: raw.respawn_time.unwrap_or(DEFAULT_RESPAWN_SECS),
                    contents: raw.contents.unwrap_or_default(),
                })
            }
            Some(RawMarkerKind::Category) | None => MarkerKind::Category {
                loot_quality: raw.loot_quality.filter(|s| !s.is_empty()),
            },
        };
        Self {
            name: raw.name.unwrap_or_default(),
            marker_type: non_empty_or(raw.marker_type, DEFAULT_MARKER_TYPE),
            icon: non_empty_or(raw.icon, DEFAULT_MARKER_ICON),
            color: non_empty_or(raw.color, DEFAULT_MARKER_COLOR),
            fallback_color: non_empty_or(raw.fallback_color, DEFAULT_MARKER_FALLBACK_COLOR),
            description: raw.description.unwrap_or_default(),
            position: raw.position.unwrap_or_default(),
            is_user_created: raw.is_user_created.unwrap_or_default(),
            kind,
        }
    }
}

impl From<MapMarker> for RawMarker {
    fn from(marker: MapMarker) -> Self {
        let mut raw = RawMarker {
            name: Some(marker.name),
            marker_type: Some(marker.marker_type),
            icon: Some(marker.icon),
            color: Some(marker.color),
            fallback_color: Some(marker.fallback_color),
            description: Some(marker.description),
            position: Some(marker.position),
            is_user_created: Some(marker.is_user_created),
            ..Default::default()
        };
        match marker.kind {
            MarkerKind::Category { loot_quality } => {
                raw.kind = Some(RawMarkerKind::Category);
                raw.loot_quality = loot_quality;
            }
            MarkerKind::Container(details) => {
                raw.kind = Some(RawMarkerKind::Container);
                raw.rarity = Some(details.rarity.to_string());
                raw.respawn_time = Some(details.respawn_secs);
                raw.contents = Some(details.contents);
            }
        }
        raw
    }
}
