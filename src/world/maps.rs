//! Map document parsing.
//!
//! The map source is a Tiled-style JSON document with named object layers.
//! We consume three of them: `npc` (placements + custom properties),
//! `obstacles` (solid rectangles), and `spawn` (player spawn point).
//! Unknown or missing layers and properties fall back to documented
//! defaults; a missing or malformed document degrades to an empty map with
//! a log line, never a fatal error.

use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

use crate::shared::*;

// ─── Raw document shape ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MapDocument {
    #[serde(default)]
    layers: Vec<MapLayer>,
}

#[derive(Debug, Deserialize)]
struct MapLayer {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    objects: Vec<MapObject>,
}

#[derive(Debug, Deserialize)]
struct MapObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: Option<String>,
    /// Tiled emits `class` or `type` depending on version; accept both.
    #[serde(default)]
    class: Option<String>,
    #[serde(default, rename = "type")]
    type_field: Option<String>,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    properties: Vec<ObjectProperty>,
}

#[derive(Debug, Deserialize)]
struct ObjectProperty {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
}

// ─── Parsed output ───────────────────────────────────────────────────────────

/// One NPC placement from the map document, with property defaults applied
/// (`movement = static`, `dialogue_id = None`, `speed = 2`).
#[derive(Debug, Clone, PartialEq)]
pub struct NpcSpawn {
    pub position: Vec2,
    pub npc_type: String,
    pub display_name: String,
    pub movement: MovementKind,
    pub dialogue_id: Option<DialogueId>,
    pub speed: f32,
}

/// Everything the world and npcs domains need from one map document.
#[derive(Resource, Debug, Clone, Default)]
pub struct LoadedMap {
    pub npcs: Vec<NpcSpawn>,
    /// Solid tiles in grid coordinates, from the `obstacles` layer.
    pub solid_tiles: Vec<(i32, i32)>,
    pub player_spawn: Option<Vec2>,
}

/// Load a map document. Missing file → empty map + warning; malformed
/// JSON → empty map + error. The game stays playable either way.
pub fn load(path: impl AsRef<Path>) -> LoadedMap {
    let path = path.as_ref();

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                "[World] Map {} not found ({err}) — no NPCs or obstacles loaded",
                path.display()
            );
            return LoadedMap::default();
        }
    };

    match from_json_str(&raw) {
        Ok(map) => {
            info!(
                "[World] Loaded map {}: {} NPCs, {} solid tiles",
                path.display(),
                map.npcs.len(),
                map.solid_tiles.len()
            );
            map
        }
        Err(err) => {
            error!(
                "[World] Map {} is not valid JSON ({err}) — no NPCs or obstacles loaded",
                path.display()
            );
            LoadedMap::default()
        }
    }
}

/// Parse a map from an in-memory JSON string (kept separate for tests).
pub fn from_json_str(raw: &str) -> Result<LoadedMap, serde_json::Error> {
    let doc: MapDocument = serde_json::from_str(raw)?;
    let mut map = LoadedMap::default();

    for layer in &doc.layers {
        if layer.kind != "objectgroup" {
            continue;
        }
        match layer.name.as_str() {
            "npc" => {
                for obj in &layer.objects {
                    map.npcs.push(parse_npc(obj));
                }
            }
            "obstacles" => {
                for obj in &layer.objects {
                    collect_solid_tiles(obj, &mut map.solid_tiles);
                }
            }
            "spawn" => {
                if let Some(obj) = layer.objects.first() {
                    map.player_spawn = Some(map_to_world(obj.x, obj.y));
                }
            }
            other => {
                debug!("[World] Ignoring unknown object layer '{}'", other);
            }
        }
    }

    Ok(map)
}

/// Map documents use y-down pixel coordinates; the world uses y-up.
fn map_to_world(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, -y)
}

fn parse_npc(obj: &MapObject) -> NpcSpawn {
    let npc_type = obj
        .class
        .clone()
        .or_else(|| obj.type_field.clone())
        .unwrap_or_else(|| "villager".to_string());

    let display_name = obj
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("NPC_{}", obj.id));

    let mut spawn = NpcSpawn {
        position: map_to_world(obj.x, obj.y),
        npc_type,
        display_name,
        movement: MovementKind::Static,
        dialogue_id: None,
        speed: 2.0,
    };

    for prop in &obj.properties {
        match prop.name.as_str() {
            "movement" => {
                if let Some(value) = prop.value.as_str() {
                    spawn.movement = match value {
                        "patrol" => MovementKind::Patrol,
                        "wander" => MovementKind::Wander,
                        "static" => MovementKind::Static,
                        other => {
                            warn!(
                                "[World] NPC '{}' has unknown movement '{}' — using static",
                                spawn.display_name, other
                            );
                            MovementKind::Static
                        }
                    };
                }
            }
            "dialogue_id" => {
                spawn.dialogue_id = prop.value.as_str().map(str::to_string);
            }
            "speed" => {
                if let Some(value) = prop.value.as_f64() {
                    spawn.speed = value as f32;
                }
            }
            other => {
                debug!(
                    "[World] Ignoring unknown NPC property '{}' on '{}'",
                    other, spawn.display_name
                );
            }
        }
    }

    spawn
}

/// Expand an obstacle rectangle (map pixels) into the grid tiles it covers.
fn collect_solid_tiles(obj: &MapObject, out: &mut Vec<(i32, i32)>) {
    let tiles_w = ((obj.width / TILE_SIZE).ceil() as i32).max(1);
    let tiles_h = ((obj.height / TILE_SIZE).ceil() as i32).max(1);
    let origin = map_to_world(obj.x, obj.y);
    let base_x = (origin.x / TILE_SIZE).floor() as i32;
    let base_y = (origin.y / TILE_SIZE).floor() as i32;

    for dy in 0..tiles_h {
        for dx in 0..tiles_w {
            // Map y grows downward, world y upward.
            out.push((base_x + dx, base_y - dy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "layers": [
            { "name": "npc", "type": "objectgroup", "objects": [
                { "id": 1, "name": "Maren", "class": "merchant",
                  "x": 512, "y": 256,
                  "properties": [
                    { "name": "dialogue_id", "value": "merchant_greeting" },
                    { "name": "movement", "value": "static" },
                    { "name": "speed", "value": 3 }
                  ] },
                { "id": 2, "type": "guard", "x": 128, "y": 64 }
            ]},
            { "name": "obstacles", "type": "objectgroup", "objects": [
                { "id": 10, "x": 0, "y": 0, "width": 128, "height": 64 }
            ]},
            { "name": "spawn", "type": "objectgroup", "objects": [
                { "id": 20, "name": "player", "x": 672, "y": 224 }
            ]}
        ]
    }"#;

    #[test]
    fn test_missing_file_yields_empty_map() {
        let map = load("/no/such/map.json");
        assert!(map.npcs.is_empty());
        assert!(map.solid_tiles.is_empty());
        assert!(map.player_spawn.is_none());
    }

    #[test]
    fn test_npc_layer_parses_with_properties() {
        let map = from_json_str(SAMPLE).unwrap();
        assert_eq!(map.npcs.len(), 2);

        let maren = &map.npcs[0];
        assert_eq!(maren.npc_type, "merchant");
        assert_eq!(maren.display_name, "Maren");
        assert_eq!(maren.dialogue_id.as_deref(), Some("merchant_greeting"));
        assert_eq!(maren.movement, MovementKind::Static);
        assert_eq!(maren.speed, 3.0);
        assert_eq!(maren.position, Vec2::new(512.0, -256.0));
    }

    #[test]
    fn test_npc_defaults_when_properties_absent() {
        let map = from_json_str(SAMPLE).unwrap();
        let guard = &map.npcs[1];
        // `type` accepted where `class` is absent; name synthesised from id.
        assert_eq!(guard.npc_type, "guard");
        assert_eq!(guard.display_name, "NPC_2");
        assert_eq!(guard.dialogue_id, None);
        assert_eq!(guard.movement, MovementKind::Static);
        assert_eq!(guard.speed, 2.0);
    }

    #[test]
    fn test_obstacle_rect_expands_to_tiles() {
        let map = from_json_str(SAMPLE).unwrap();
        // 128×64 px at TILE_SIZE 64 → 2×1 tiles
        assert_eq!(map.solid_tiles.len(), 2);
        assert!(map.solid_tiles.contains(&(0, 0)));
        assert!(map.solid_tiles.contains(&(1, 0)));
    }

    #[test]
    fn test_spawn_layer_sets_player_spawn() {
        let map = from_json_str(SAMPLE).unwrap();
        assert_eq!(map.player_spawn, Some(Vec2::new(672.0, -224.0)));
    }

    #[test]
    fn test_unknown_layers_ignored() {
        let raw = r#"{ "layers": [
            { "name": "decor", "type": "objectgroup", "objects": [ { "id": 1, "x": 0, "y": 0 } ] },
            { "name": "ground", "type": "tilelayer" }
        ]}"#;
        let map = from_json_str(raw).unwrap();
        assert!(map.npcs.is_empty());
        assert!(map.solid_tiles.is_empty());
    }
}
