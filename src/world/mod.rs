//! World domain plugin for Loopvale.
//!
//! Owns the collision map and the static scenery. The map document itself
//! is loaded by the data plugin (into `LoadedMap`); this plugin turns it
//! into a collision grid and spawns the ground plane plus one sprite per
//! solid tile when play begins.

use bevy::prelude::*;
use std::collections::HashSet;

pub mod maps;

pub use maps::{LoadedMap, NpcSpawn};

use crate::shared::*;

/// Solid tiles in grid coordinates plus the walkable bounds.
/// Queried by the player movement system every frame.
#[derive(Resource, Debug, Clone)]
pub struct CollisionMap {
    pub solid_tiles: HashSet<(i32, i32)>,
    /// (min_x, max_x, min_y, max_y) inclusive grid bounds.
    pub bounds: (i32, i32, i32, i32),
}

impl Default for CollisionMap {
    fn default() -> Self {
        Self {
            solid_tiles: HashSet::new(),
            bounds: (0, 29, -16, -1),
        }
    }
}

impl CollisionMap {
    pub fn is_solid(&self, gx: i32, gy: i32) -> bool {
        if self.solid_tiles.contains(&(gx, gy)) {
            return true;
        }
        let (min_x, max_x, min_y, max_y) = self.bounds;
        gx < min_x || gx > max_x || gy < min_y || gy > max_y
    }
}

pub fn world_to_grid(wx: f32, wy: f32) -> (i32, i32) {
    (
        (wx / TILE_SIZE).floor() as i32,
        (wy / TILE_SIZE).floor() as i32,
    )
}

pub fn grid_to_world(gx: i32, gy: i32) -> (f32, f32) {
    (
        gx as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        gy as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

#[derive(Component)]
struct SceneryTile;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CollisionMap>()
            .add_systems(OnEnter(GameState::Playing), spawn_scenery);
    }
}

/// Spawns the ground quad and one sprite per solid tile, once. The scenery
/// never resets across loops — only the clock and the player do.
fn spawn_scenery(
    mut commands: Commands,
    collision_map: Res<CollisionMap>,
    existing: Query<Entity, With<SceneryTile>>,
) {
    // Playing is re-entered after every dialogue; draw the world only once.
    if !existing.is_empty() {
        return;
    }

    let (min_x, max_x, min_y, max_y) = collision_map.bounds;
    let width = (max_x - min_x + 1) as f32 * TILE_SIZE;
    let height = (max_y - min_y + 1) as f32 * TILE_SIZE;
    let (min_wx, min_wy) = grid_to_world(min_x, min_y);
    let center = Vec2::new(
        min_wx - TILE_SIZE / 2.0 + width / 2.0,
        min_wy - TILE_SIZE / 2.0 + height / 2.0,
    );

    commands.spawn((
        SceneryTile,
        Sprite::from_color(Color::srgb(0.24, 0.42, 0.22), Vec2::new(width, height)),
        Transform::from_translation(center.extend(-10.0)),
    ));

    for &(gx, gy) in &collision_map.solid_tiles {
        let (wx, wy) = grid_to_world(gx, gy);
        commands.spawn((
            SceneryTile,
            Sprite::from_color(
                Color::srgb(0.35, 0.3, 0.25),
                Vec2::splat(TILE_SIZE),
            ),
            Transform::from_xyz(wx, wy, -5.0),
        ));
    }
}
