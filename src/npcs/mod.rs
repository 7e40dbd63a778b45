//! NPC domain plugin for Loopvale.
//!
//! Owns NPC spawning, the proximity scan that drives the interact
//! indicator, and the interaction controller that bridges player input to
//! the dialogue engine. This is also where loop resets land: the respawn
//! system here is the single consumer of `LoopResetEvent`.

use bevy::prelude::*;

mod spawning;

pub use spawning::InteractIndicator;

use crate::dialogue::{DialogueEngine, Initiator};
use crate::shared::*;

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NearbyNpc>()
            .add_systems(OnEnter(GameState::Playing), spawning::spawn_npcs)
            .add_systems(
                Update,
                (
                    update_npc_proximity,
                    spawning::update_interact_indicators,
                    handle_npc_interaction,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            // Both events can be sent on the very frame the state changes
            // (a wrap while Escape pauses, a dialogue ending); read them
            // unconditionally so none expire unread.
            .add_systems(Update, (handle_loop_reset, handle_dialogue_end));
    }
}

/// Find the nearest NPC within interaction range of the player and flag it.
/// Runs every frame; `can_interact` and `NearbyNpc` are snapshot state, not
/// accumulated.
fn update_npc_proximity(
    player: Query<&Transform, With<Player>>,
    mut npcs: Query<(Entity, &Transform, &mut Npc)>,
    mut nearby: ResMut<NearbyNpc>,
) {
    let Ok(player_transform) = player.get_single() else {
        nearby.0 = None;
        return;
    };
    let player_pos = player_transform.translation.truncate();

    let mut best: Option<(Entity, f32)> = None;
    for (entity, transform, _) in &npcs {
        let distance = transform.translation.truncate().distance(player_pos);
        if distance <= INTERACTION_RADIUS
            && best.map_or(true, |(_, best_distance)| distance < best_distance)
        {
            best = Some((entity, distance));
        }
    }

    nearby.0 = best.map(|(entity, _)| entity);
    for (entity, _, mut npc) in &mut npcs {
        npc.can_interact = nearby.0 == Some(entity);
    }
}

/// Snapshot the game state a dialogue's predicates can reference:
/// `loop_count`, `time`, one `has_item_<id>` flag per held item, and every
/// quest flag. Built fresh per interaction attempt.
fn build_dialogue_context(
    clock: &LoopClock,
    inventory: &Inventory,
    flags: &GameFlags,
) -> DialogueContext {
    let mut context = DialogueContext::new();
    context.set_number("loop_count", clock.loop_count as f32);
    context.set_number("time", clock.current_time);

    for item in &inventory.items {
        context.set_flag(&format!("has_item_{item}"), true);
    }
    for (key, value) in &flags.flags {
        context.set_flag(key, *value);
    }

    context
}

/// The interaction controller: on an interact press near an NPC, build a
/// fresh context, hand it to the dialogue engine, and if a session actually
/// opened, move the state machine into `Dialogue`.
fn handle_npc_interaction(
    input: Res<PlayerInput>,
    nearby: Res<NearbyNpc>,
    npcs: Query<&Npc>,
    clock: Res<LoopClock>,
    inventory: Res<Inventory>,
    flags: Res<GameFlags>,
    catalog: Res<DialogueCatalog>,
    mut engine: ResMut<DialogueEngine>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.interact || engine.is_active() {
        return;
    }
    let Some(entity) = nearby.0 else {
        return;
    };
    let Ok(npc) = npcs.get(entity) else {
        return;
    };

    let context = build_dialogue_context(&clock, &inventory, &flags);
    engine.start(
        entity,
        &npc.display_name,
        npc.dialogue_id.as_deref(),
        None,
        &catalog,
        &context,
        Initiator::Player,
    );

    if engine.is_active() {
        info!("[Npcs] Talking to '{}'", npc.display_name);
        next_state.set(GameState::Dialogue);
    }
}

/// The one and only `LoopResetEvent` consumer: snap the player back to the
/// spawn point. NPCs and scenery stay where they are across loops.
fn handle_loop_reset(
    mut events: EventReader<LoopResetEvent>,
    spawn_point: Res<SpawnPoint>,
    mut player: Query<&mut Transform, With<Player>>,
) {
    for event in events.read() {
        info!("[Npcs] Loop {} — returning player to start", event.loop_count);
        if let Ok(mut transform) = player.get_single_mut() {
            transform.translation.x = spawn_point.0.x;
            transform.translation.y = spawn_point.0.y;
        }
    }
}

/// Apply the consequences a confirmed choice carries: `set_flag` raises a
/// quest flag, `give_item` adds to the inventory. Unrecognised payload keys
/// are logged and skipped.
fn handle_dialogue_end(
    mut events: EventReader<DialogueEndEvent>,
    mut flags: ResMut<GameFlags>,
    mut inventory: ResMut<Inventory>,
) {
    for event in events.read() {
        let Some(choice) = &event.payload else {
            continue;
        };
        for (key, value) in &choice.payload {
            match key.as_str() {
                "set_flag" => {
                    if let Some(flag) = value.as_str() {
                        info!("[Npcs] Choice set flag '{}'", flag);
                        flags.set(flag, true);
                    }
                }
                "give_item" => {
                    if let Some(item) = value.as_str() {
                        info!("[Npcs] Choice granted item '{}'", item);
                        inventory.give(item);
                    }
                }
                other => {
                    debug!(
                        "[Npcs] Ignoring unknown payload key '{}' on '{}'",
                        other, event.dialogue_id
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_carries_loop_count_and_time() {
        let mut clock = LoopClock::default();
        clock.current_time = 14.5;
        clock.loop_count = 3;

        let context =
            build_dialogue_context(&clock, &Inventory::default(), &GameFlags::default());
        assert_eq!(context.get("loop_count"), Some(&ContextValue::Number(3.0)));
        assert_eq!(context.get("time"), Some(&ContextValue::Number(14.5)));
    }

    #[test]
    fn test_context_exposes_items_as_has_item_flags() {
        let mut inventory = Inventory::default();
        inventory.give("rusty_key");

        let context =
            build_dialogue_context(&LoopClock::default(), &inventory, &GameFlags::default());
        assert_eq!(
            context.get("has_item_rusty_key"),
            Some(&ContextValue::Flag(true))
        );
        assert_eq!(context.get("has_item_lantern"), None);
    }

    #[test]
    fn test_context_includes_quest_flags() {
        let mut flags = GameFlags::default();
        flags.set("met_elder", true);
        flags.set("door_opened", false);

        let context =
            build_dialogue_context(&LoopClock::default(), &Inventory::default(), &flags);
        assert_eq!(context.get("met_elder"), Some(&ContextValue::Flag(true)));
        assert_eq!(context.get("door_opened"), Some(&ContextValue::Flag(false)));
    }
}
