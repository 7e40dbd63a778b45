//! Data domain plugin for Loopvale.
//!
//! Runs once at `OnEnter(Loading)`: loads the dialogue catalog and the map
//! document from `assets/data` / `assets/maps`, derives the collision map
//! and spawn point, then transitions straight to `Playing`. All loads are
//! fail-soft — a missing content file degrades to an empty world, never a
//! crash.

use bevy::prelude::*;

use crate::dialogue::catalog;
use crate::shared::*;
use crate::world::{maps, CollisionMap};

pub const DIALOGUES_PATH: &str = "assets/data/dialogues.json";
pub const MAP_PATH: &str = "assets/maps/village.json";

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_game_data);
    }
}

fn load_game_data(mut commands: Commands, mut next_state: ResMut<NextState<GameState>>) {
    let dialogue_catalog = catalog::load(DIALOGUES_PATH);
    let map = maps::load(MAP_PATH);

    let mut collision_map = CollisionMap::default();
    collision_map.solid_tiles.extend(map.solid_tiles.iter().copied());

    let spawn_point = map
        .player_spawn
        .map(SpawnPoint)
        .unwrap_or_default();

    info!(
        "[Data] Ready: {} dialogues, {} NPCs, {} solid tiles",
        dialogue_catalog.len(),
        map.npcs.len(),
        collision_map.solid_tiles.len()
    );

    commands.insert_resource(dialogue_catalog);
    commands.insert_resource(collision_map);
    commands.insert_resource(spawn_point);
    commands.insert_resource(map);

    next_state.set(GameState::Playing);
}
