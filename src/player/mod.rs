//! Player domain plugin for Loopvale.
//!
//! Spawns the player at the level spawn point and moves them while
//! `GameState::Playing` — the state gate is also the movement lock during
//! dialogue. The loop-reset respawn lives in the npcs domain next to the
//! rest of the interaction housekeeping.

use bevy::prelude::*;

mod movement;

use crate::shared::*;
use movement::player_movement;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_player)
            .add_systems(
                Update,
                (player_movement, camera_follow)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Spawn the player once, at the spawn point the map document provided.
fn spawn_player(
    mut commands: Commands,
    spawn_point: Res<SpawnPoint>,
    existing: Query<Entity, With<Player>>,
) {
    // Playing is re-entered after every dialogue; spawn only once.
    if !existing.is_empty() {
        return;
    }

    commands.spawn((
        Player,
        PlayerMovement::default(),
        Sprite::from_color(
            Color::srgb(0.9, 0.8, 0.4),
            Vec2::new(TILE_SIZE * 0.6, TILE_SIZE * 0.8),
        ),
        Transform::from_translation(spawn_point.0.extend(1.0)),
    ));

    info!("[Player] Spawned at {:?}", spawn_point.0);
}

/// Keep the camera centred on the player.
fn camera_follow(
    player: Query<&Transform, With<Player>>,
    mut camera: Query<&mut Transform, (With<Camera2d>, Without<Player>)>,
) {
    let Ok(player_transform) = player.get_single() else {
        return;
    };
    let Ok(mut camera_transform) = camera.get_single_mut() else {
        return;
    };
    camera_transform.translation.x = player_transform.translation.x;
    camera_transform.translation.y = player_transform.translation.y;
}
