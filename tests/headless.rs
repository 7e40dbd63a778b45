//! Headless end-to-end tests: the full plugin stack on `MinimalPlugins`,
//! no window, no renderer. Content is the real `assets/` data, loaded the
//! same way the game loads it.

use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use loopvale::dialogue::DialogueEngine;
use loopvale::shared::*;
use loopvale::world::LoadedMap;
use loopvale::{
    ClockPlugin, DataPlugin, DialoguePlugin, InputPlugin, NpcPlugin, PlayerPlugin, UiPlugin,
    WorldPlugin,
};

fn build_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .init_state::<GameState>()
        .init_resource::<ButtonInput<KeyCode>>()
        .init_resource::<LoopClock>()
        .init_resource::<Inventory>()
        .init_resource::<GameFlags>()
        .init_resource::<SpawnPoint>()
        .init_resource::<DialogueCatalog>()
        .init_resource::<LoadedMap>()
        .add_event::<LoopResetEvent>()
        .add_event::<DialogueEndEvent>()
        .add_plugins((
            InputPlugin,
            DataPlugin,
            ClockPlugin,
            DialoguePlugin,
            WorldPlugin,
            PlayerPlugin,
            NpcPlugin,
            UiPlugin,
        ));
    app
}

/// Update until the loading transition has settled into `Playing` and the
/// entry systems (player/NPC spawns) have run.
fn boot(app: &mut App) {
    for _ in 0..3 {
        app.update();
    }
}

fn current_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn press(app: &mut App, key: KeyCode) {
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(key);
}

/// Without the OS input plugin nothing ages just-pressed edges, so tests
/// clear them by hand between frames.
fn release(app: &mut App, key: KeyCode) {
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .release(key);
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .clear();
}

fn npc_entity(app: &mut App, name: &str) -> Entity {
    let mut query = app.world_mut().query::<(Entity, &Npc)>();
    query
        .iter(app.world())
        .find(|(_, npc)| npc.display_name == name)
        .map(|(entity, _)| entity)
        .unwrap_or_else(|| panic!("NPC '{name}' not spawned"))
}

/// Teleport the player next to an NPC so the proximity scan picks it up.
fn move_player_to(app: &mut App, target: Entity) {
    let target_pos = app
        .world()
        .get::<Transform>(target)
        .expect("NPC has a transform")
        .translation;
    let mut query = app.world_mut().query_filtered::<&mut Transform, With<Player>>();
    let mut transform = query.single_mut(app.world_mut());
    transform.translation.x = target_pos.x + TILE_SIZE * 0.5;
    transform.translation.y = target_pos.y;
}

fn talk_to(app: &mut App, name: &str) {
    let npc = npc_entity(app, name);
    move_player_to(app, npc);
    app.update(); // proximity scan sees the new position
    press(app, KeyCode::KeyE);
    app.update(); // interaction starts the session, requests Dialogue
    release(app, KeyCode::KeyE);
    app.update(); // transition applies
}

#[test]
fn test_boot_loads_content_and_reaches_playing() {
    let mut app = build_app();
    boot(&mut app);

    assert_eq!(current_state(&app), GameState::Playing);

    let catalog = app.world().resource::<DialogueCatalog>();
    assert!(!catalog.is_empty(), "dialogue catalog should load from assets");
    assert!(catalog.get("elder_intro").is_some());

    let mut players = app.world_mut().query_filtered::<Entity, With<Player>>();
    assert_eq!(players.iter(app.world()).count(), 1);

    let mut npcs = app.world_mut().query_filtered::<Entity, With<Npc>>();
    assert_eq!(npcs.iter(app.world()).count(), 4);
}

#[test]
fn test_interact_near_npc_enters_dialogue() {
    let mut app = build_app();
    boot(&mut app);

    talk_to(&mut app, "Elder Maretta");

    assert_eq!(current_state(&app), GameState::Dialogue);
    assert!(app.world().resource::<DialogueEngine>().is_active());
}

#[test]
fn test_interact_with_nobody_nearby_does_nothing() {
    let mut app = build_app();
    boot(&mut app);

    // Player is at the spawn point, out of range of every NPC.
    press(&mut app, KeyCode::KeyE);
    app.update();
    release(&mut app, KeyCode::KeyE);
    app.update();

    assert_eq!(current_state(&app), GameState::Playing);
    assert!(!app.world().resource::<DialogueEngine>().is_active());
}

#[test]
fn test_clock_pauses_in_dialogue_and_resumes_after() {
    let mut app = build_app();
    boot(&mut app);
    assert!(!app.world().resource::<LoopClock>().paused);

    talk_to(&mut app, "Elder Maretta");
    assert!(app.world().resource::<LoopClock>().paused);

    // Acknowledge the basic dialogue.
    press(&mut app, KeyCode::KeyE);
    app.update();
    release(&mut app, KeyCode::KeyE);
    app.update();

    assert_eq!(current_state(&app), GameState::Playing);
    assert!(!app.world().resource::<LoopClock>().paused);
}

#[test]
fn test_basic_dialogue_end_emits_event_without_payload() {
    let mut app = build_app();
    boot(&mut app);

    talk_to(&mut app, "Guard Ilsa");
    assert_eq!(current_state(&app), GameState::Dialogue);

    press(&mut app, KeyCode::KeyE);
    app.update();

    let events = app.world().resource::<Events<DialogueEndEvent>>();
    let ended: Vec<_> = events.iter_current_update_events().collect();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].dialogue_id, "guard_post");
    assert!(ended[0].payload.is_none());
}

#[test]
fn test_confirmed_choice_payload_reaches_inventory() {
    let mut app = build_app();
    boot(&mut app);

    // The merchant opens with a multiple-choice; choice 0 grants a lantern.
    talk_to(&mut app, "Tobin");
    assert_eq!(current_state(&app), GameState::Dialogue);

    press(&mut app, KeyCode::Enter);
    app.update(); // confirm → session ends, end event sent
    release(&mut app, KeyCode::Enter);
    app.update(); // payload handler gives the item, state returns

    assert_eq!(current_state(&app), GameState::Playing);
    assert!(app.world().resource::<Inventory>().has("lantern"));
}

#[test]
fn test_dialogue_conditions_see_current_game_state() {
    let mut app = build_app();
    boot(&mut app);

    app.world_mut().resource_mut::<LoopClock>().loop_count = 5;
    talk_to(&mut app, "Elder Maretta");

    let engine = app.world().resource::<DialogueEngine>();
    let session = engine.session().expect("session active");
    assert!(session.dialogue.text.contains("The day that never ends"));
}

#[test]
fn test_loop_reset_returns_player_to_spawn() {
    let mut app = build_app();
    boot(&mut app);

    // Wander off, then force the clock to the last hour and let it wrap.
    {
        let mut query = app
            .world_mut()
            .query_filtered::<&mut Transform, With<Player>>();
        let mut transform = query.single_mut(app.world_mut());
        transform.translation.x += TILE_SIZE * 4.0;
    }
    {
        let mut clock = app.world_mut().resource_mut::<LoopClock>();
        clock.current_time = 20.0;
        clock.accumulated_seconds = clock.time_speed; // next tick wraps
    }
    app.update();
    app.update();

    let clock = app.world().resource::<LoopClock>();
    assert_eq!(clock.loop_count, 1);
    assert_eq!(clock.current_time, clock.start_time);

    let spawn = app.world().resource::<SpawnPoint>().0;
    let mut query = app.world_mut().query_filtered::<&Transform, With<Player>>();
    let transform = query.single(app.world());
    assert!((transform.translation.x - spawn.x).abs() < 1e-3);
    assert!((transform.translation.y - spawn.y).abs() < 1e-3);
}

#[test]
fn test_loop_reset_survives_pausing_on_the_wrap_frame() {
    let mut app = build_app();
    boot(&mut app);

    // Wander off, then arrange for the wrap and the pause press to land on
    // the same frame — the respawn must still happen even though the game
    // is no longer in Playing when the event gets read.
    {
        let mut query = app
            .world_mut()
            .query_filtered::<&mut Transform, With<Player>>();
        let mut transform = query.single_mut(app.world_mut());
        transform.translation.x += TILE_SIZE * 4.0;
    }
    {
        let mut clock = app.world_mut().resource_mut::<LoopClock>();
        clock.current_time = 20.0;
        clock.accumulated_seconds = clock.time_speed; // next tick wraps
    }
    press(&mut app, KeyCode::Escape);
    app.update(); // wrap event sent, pause requested
    release(&mut app, KeyCode::Escape);
    app.update(); // now Paused; the event must still be consumed
    app.update();

    assert_eq!(current_state(&app), GameState::Paused);
    assert_eq!(app.world().resource::<LoopClock>().loop_count, 1);

    let spawn = app.world().resource::<SpawnPoint>().0;
    let mut query = app.world_mut().query_filtered::<&Transform, With<Player>>();
    let transform = query.single(app.world());
    assert!((transform.translation.x - spawn.x).abs() < 1e-3);
    assert!((transform.translation.y - spawn.y).abs() < 1e-3);
}

#[test]
fn test_escape_pauses_and_resumes() {
    let mut app = build_app();
    boot(&mut app);

    press(&mut app, KeyCode::Escape);
    app.update();
    release(&mut app, KeyCode::Escape);
    app.update();
    assert_eq!(current_state(&app), GameState::Paused);
    assert!(app.world().resource::<LoopClock>().paused);

    press(&mut app, KeyCode::Escape);
    app.update();
    release(&mut app, KeyCode::Escape);
    app.update();
    assert_eq!(current_state(&app), GameState::Playing);
    assert!(!app.world().resource::<LoopClock>().paused);
}
