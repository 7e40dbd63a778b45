//! NPC spawning from the loaded map document.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::LoadedMap;

/// Marker for the "E" badge shown above an NPC while the player is close
/// enough to interact.
#[derive(Component)]
pub struct InteractIndicator;

fn npc_color(npc_type: &str) -> Color {
    match npc_type {
        "merchant" => Color::srgb(0.7, 0.4, 0.8),
        "guard" => Color::srgb(0.4, 0.5, 0.75),
        "elder" => Color::srgb(0.6, 0.6, 0.6),
        _ => Color::srgb(0.4, 0.7, 0.8),
    }
}

/// Spawn one entity per NPC placement, once. Each NPC carries a hidden
/// indicator badge as a child; the proximity system toggles it.
pub fn spawn_npcs(
    mut commands: Commands,
    map: Res<LoadedMap>,
    existing: Query<Entity, With<Npc>>,
) {
    // Playing is re-entered after every dialogue; spawn only once.
    if !existing.is_empty() {
        return;
    }

    for spawn in &map.npcs {
        commands
            .spawn((
                Npc {
                    npc_type: spawn.npc_type.clone(),
                    display_name: spawn.display_name.clone(),
                    dialogue_id: spawn.dialogue_id.clone(),
                    movement: spawn.movement,
                    speed: spawn.speed,
                    can_interact: false,
                },
                Sprite::from_color(
                    npc_color(&spawn.npc_type),
                    Vec2::new(TILE_SIZE * 0.6, TILE_SIZE * 0.8),
                ),
                Transform::from_translation(spawn.position.extend(1.0)),
            ))
            .with_children(|parent| {
                parent.spawn((
                    InteractIndicator,
                    Text2d::new("E"),
                    TextFont {
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(Color::srgb(1.0, 1.0, 0.4)),
                    Transform::from_xyz(0.0, TILE_SIZE * 0.7, 2.0),
                    Visibility::Hidden,
                ));
            });
    }

    if !map.npcs.is_empty() {
        info!("[Npcs] Spawned {} NPCs", map.npcs.len());
    }
}

/// Show the indicator only on NPCs flagged interactable this frame.
pub fn update_interact_indicators(
    npcs: Query<(&Npc, &Children)>,
    mut indicators: Query<&mut Visibility, With<InteractIndicator>>,
) {
    for (npc, children) in &npcs {
        for child in children.iter() {
            if let Ok(mut visibility) = indicators.get_mut(*child) {
                *visibility = if npc.can_interact {
                    Visibility::Visible
                } else {
                    Visibility::Hidden
                };
            }
        }
    }
}
