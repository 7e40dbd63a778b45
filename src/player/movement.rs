use bevy::prelude::*;

use crate::shared::*;
use crate::world::{world_to_grid, CollisionMap};

/// Core movement system — reads the logical move axis, applies velocity,
/// updates facing, and checks collisions.
///
/// Collision is axis-separated so the player slides along walls instead of
/// sticking to them. Movement only runs in `GameState::Playing`, which is
/// what locks the player in place while a dialogue owns input focus.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    collision_map: Res<CollisionMap>,
    mut query: Query<(&mut Transform, &mut PlayerMovement), With<Player>>,
) {
    let Ok((mut transform, mut movement)) = query.get_single_mut() else {
        return;
    };

    let dir = input.move_axis;
    if dir == Vec2::ZERO {
        movement.is_moving = false;
        return;
    }

    movement.is_moving = true;

    // Primary facing: bias towards vertical on diagonals, which reads
    // better in a top-down view.
    if dir.y.abs() >= dir.x.abs() {
        movement.facing = if dir.y > 0.0 { Facing::Up } else { Facing::Down };
    } else {
        movement.facing = if dir.x > 0.0 { Facing::Right } else { Facing::Left };
    }

    let delta = dir * movement.speed * time.delta_secs();
    let candidate_x = transform.translation.x + delta.x;
    let candidate_y = transform.translation.y + delta.y;

    let can_move_x = !is_blocked(candidate_x, transform.translation.y, &collision_map);
    let can_move_y = !is_blocked(transform.translation.x, candidate_y, &collision_map);

    if can_move_x {
        transform.translation.x = candidate_x;
    }
    if can_move_y {
        transform.translation.y = candidate_y;
    }
}

fn is_blocked(wx: f32, wy: f32, collision_map: &CollisionMap) -> bool {
    let (gx, gy) = world_to_grid(wx, wy);
    collision_map.is_solid(gx, gy)
}
