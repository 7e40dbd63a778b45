//! Dialogue domain plugin for Loopvale.
//!
//! Owns the conditional dialogue pipeline: catalog (loaded content),
//! condition evaluation, and the session engine. The data plugin fills the
//! catalog during Loading; the npcs domain starts sessions; this plugin
//! drives the active session while `GameState::Dialogue` holds input focus.

use bevy::prelude::*;

pub mod catalog;
pub mod conditions;
pub mod engine;

pub use engine::{
    DialogueAction, DialogueEngine, DialogueSession, DialogueUpdate, Initiator, Presentation,
};

use crate::shared::*;

pub struct DialoguePlugin;

impl Plugin for DialoguePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogueEngine>().add_systems(
            Update,
            drive_dialogue.run_if(in_state(GameState::Dialogue)),
        );
    }
}

/// Per-frame driver for the active session: routes logical input into the
/// presentation, polls the engine, and on completion emits the
/// `DialogueEndEvent` and returns the game to `Playing` (which resumes the
/// clock and unlocks the player).
pub fn drive_dialogue(
    input: Res<PlayerInput>,
    mut engine: ResMut<DialogueEngine>,
    mut end_writer: EventWriter<DialogueEndEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if input.ui_up {
        engine.handle_input(DialogueAction::Up);
    }
    if input.ui_down {
        engine.handle_input(DialogueAction::Down);
    }
    if input.interact || input.ui_confirm {
        engine.handle_input(DialogueAction::Confirm);
    }

    // Capture session identity before update() destroys it.
    let active = engine
        .session()
        .map(|s| (s.npc, s.dialogue.id.clone()));

    match engine.update() {
        DialogueUpdate::Continue => {}
        DialogueUpdate::Ended(payload) => {
            if let Some((npc, dialogue_id)) = active {
                info!("[Dialogue] '{}' ended", dialogue_id);
                end_writer.send(DialogueEndEvent {
                    npc,
                    dialogue_id,
                    payload,
                });
            }
            next_state.set(GameState::Playing);
        }
    }
}
