use miette::{miette, Result};
use serde::Serialize;
use serde_json::Value;

use crate::difficulty::{FORBIDDEN_DIFFICULTY, LOCKDOWN_DIFFICULTY, NORMAL_DIFFICULTY};
use crate::level::DEFAULT_MAP_IMAGE;
use crate::map::MapData;

const MAX_FEATURES: usize = 3;
const FILLER_FEATURES: [&str; 5] = ["Combat Zone", "Tactical", "Strategic", "Balanced", "Updated"];

/// Checks the shape of a raw map document before it is listed in the catalog.
/// Deserializing into [MapData] is lenient, this is not: every level and marker must be complete.
pub fn validate_map_document(doc: &Value) -> Result<()> {
    let map_name = doc.get("mapName").and_then(Value::as_str).unwrap_or_default();
    if map_name.is_empty() {
        return Err(miette!("map document has no mapName"));
    }
    let difficulties = doc
        .get("difficulties")
        .and_then(Value::as_object)
        .ok_or_else(|| miette!("map {map_name} has no difficulties object"))?;
    if difficulties.is_empty() {
        return Err(miette!("map {map_name} has no difficulty"));
    }
    for (difficulty_name, difficulty) in difficulties {
        if !is_non_empty_str(difficulty.get("name")) {
            return Err(miette!("difficulty {difficulty_name} of {map_name} has no name"));
        }
        let levels = difficulty
            .get("levels")
            .and_then(Value::as_array)
            .ok_or_else(|| miette!("difficulty {difficulty_name} of {map_name} has no levels array"))?;
        for (level_index, level) in levels.iter().enumerate() {
            let floor_ok = level.get("floor").map(Value::is_number).unwrap_or_default();
            let markers = level.get("markers").and_then(Value::as_array);
            let (true, true, Some(markers)) = (floor_ok, is_non_empty_str(level.get("name")), markers)
            else {
                return Err(miette!(
                    "level {level_index} of {map_name}/{difficulty_name} needs a numeric floor, a name and a markers array"
                ));
            };
            for (marker_index, marker) in markers.iter().enumerate() {
                let position_ok = marker
                    .get("position")
                    .map(|p| {
                        p.get("x").map(Value::is_number).unwrap_or_default()
                            && p.get("y").map(Value::is_number).unwrap_or_default()
                    })
                    .unwrap_or_default();
                if !(position_ok
                    && is_non_empty_str(marker.get("name"))
                    && is_non_empty_str(marker.get("type")))
                {
                    return Err(miette!(
                        "marker {marker_index} of {map_name}/{difficulty_name}/level {level_index} needs a name, a type and a numeric position"
                    ));
                }
            }
        }
    }
    Ok(())
}

fn is_non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .map(|s| !s.is_empty())
        .unwrap_or_default()
}

/// kebab-case to Title Case: `arena-breakout` -> `Arena Breakout`
pub fn format_map_name(map_name: &str) -> String {
    map_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapRating {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl MapRating {
    pub fn rate(difficulties: &[String], total_markers: usize) -> Self {
        let has = |name: &str| difficulties.iter().any(|d| d == name);
        if has(FORBIDDEN_DIFFICULTY) {
            Self::Extreme
        } else if has(LOCKDOWN_DIFFICULTY) || total_markers > 40 {
            Self::Hard
        } else if total_markers > 20 {
            Self::Medium
        } else {
            Self::Easy
        }
    }
}

/// hand written blurbs for the maps that ship with the viewer
fn known_map_profile(map_name: &str) -> Option<(&'static str, &'static str)> {
    match map_name {
        "armory" => Some((
            "Armory",
            "Industrial weapons facility with dense CQB areas",
        )),
        "arena-breakout" => Some((
            "Arena Breakout",
            "Main battle arena with tactical combat zones",
        )),
        _ => None,
    }
}

/// What the map picker shows for one map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSummary {
    pub map_name: String,
    pub display_name: String,
    pub description: String,
    pub rating: MapRating,
    pub features: Vec<String>,
    pub image: String,
    pub total_markers: usize,
    pub difficulties: Vec<String>,
    pub levels: usize,
}

impl MapSummary {
    pub fn from_map(map: &MapData) -> Self {
        let difficulties: Vec<String> = map.difficulty_names().map(str::to_string).collect();
        let total_markers = map.total_markers();
        let multi_level = map.difficulties().any(|(_, d)| d.levels.len() > 1);
        let mut types = indexmap::IndexSet::new();
        for (_, difficulty) in map.difficulties() {
            types.extend(difficulty.all_types());
        }
        let has_type = |t: &str| types.contains(t);

        let mut features = Vec::new();
        if has_type("loot") || has_type("weapons") {
            features.push("High Loot");
        }
        for (marker_type, feature) in [
            ("spawn", "Spawn Points"),
            ("extraction", "Extraction"),
            ("vehicle", "Vehicles"),
            ("medical", "Medical"),
            ("objective", "Objectives"),
        ] {
            if has_type(marker_type) {
                features.push(feature);
            }
        }
        if multi_level {
            features.push("Multi-Level");
        }
        if map.has_difficulty(FORBIDDEN_DIFFICULTY) {
            features.push("Extreme Mode");
        } else if map.has_difficulty(LOCKDOWN_DIFFICULTY) {
            features.push("Lockdown Mode");
        }
        for filler in FILLER_FEATURES {
            if features.len() >= MAX_FEATURES {
                break;
            }
            if !features.contains(&filler) {
                features.push(filler);
            }
        }
        features.truncate(MAX_FEATURES);

        // a synthesized normal has no levels, so take the first difficulty that has some
        let first_levels = map
            .difficulty(NORMAL_DIFFICULTY)
            .map(|d| d.levels.as_slice())
            .filter(|levels| !levels.is_empty())
            .or_else(|| {
                map.difficulties()
                    .map(|(_, d)| d.levels.as_slice())
                    .find(|levels| !levels.is_empty())
            })
            .unwrap_or_default();
        let image = first_levels
            .first()
            .map(|l| l.map_image.clone())
            .filter(|image| !image.is_empty())
            .unwrap_or_else(|| DEFAULT_MAP_IMAGE.to_string());
        let levels = first_levels.len().max(1);

        let (display_name, description) = match known_map_profile(&map.map_name) {
            Some((display, description)) => (display.to_string(), description.to_string()),
            None => (
                format_map_name(&map.map_name),
                format!("Interactive map for {}", map.map_name),
            ),
        };

        Self {
            map_name: map.map_name.clone(),
            display_name,
            description,
            rating: MapRating::rate(&difficulties, total_markers),
            features: features.into_iter().map(str::to_string).collect(),
            image,
            total_markers,
            difficulties,
            levels,
        }
    }
}
