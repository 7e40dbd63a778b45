//! Input domain plugin for Loopvale.
//!
//! Raw keyboard state is translated into the logical `PlayerInput` actions
//! once per frame in `PreUpdate`, filtered by the active `InputContext`.
//! The context follows the game state, so gameplay systems can't see
//! movement keys while a dialogue box owns the keyboard and vice versa.
//! Everything downstream consumes actions, never `KeyCode`s.

use bevy::prelude::*;

use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .init_resource::<KeyBindings>()
            .init_resource::<InputContext>()
            .add_systems(
                PreUpdate,
                (manage_input_context, read_input).chain(),
            );
    }
}

/// Keep the input context in lockstep with the game state.
fn manage_input_context(
    state: Res<State<GameState>>,
    mut context: ResMut<InputContext>,
) {
    let wanted = match state.get() {
        GameState::Loading => InputContext::Disabled,
        GameState::Playing => InputContext::Gameplay,
        GameState::Dialogue => InputContext::Dialogue,
        GameState::Paused => InputContext::Menu,
    };
    if *context != wanted {
        debug!("[Input] Context -> {:?}", wanted);
        *context = wanted;
    }
}

/// Reset the snapshot and re-read it from the keyboard according to the
/// active context. Action edges (`interact`, `ui_*`, `pause`) use
/// just-pressed semantics; the move axis uses held keys.
fn read_input(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    context: Res<InputContext>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match *context {
        InputContext::Disabled => {}
        InputContext::Gameplay => {
            let mut axis = Vec2::ZERO;
            if keys.pressed(bindings.move_up) {
                axis.y += 1.0;
            }
            if keys.pressed(bindings.move_down) {
                axis.y -= 1.0;
            }
            if keys.pressed(bindings.move_left) {
                axis.x -= 1.0;
            }
            if keys.pressed(bindings.move_right) {
                axis.x += 1.0;
            }
            input.move_axis = axis.normalize_or_zero();
            input.interact = keys.just_pressed(bindings.interact);
            input.pause = keys.just_pressed(bindings.pause);
        }
        InputContext::Dialogue => {
            input.ui_up = keys.just_pressed(bindings.move_up)
                || keys.just_pressed(KeyCode::ArrowUp);
            input.ui_down = keys.just_pressed(bindings.move_down)
                || keys.just_pressed(KeyCode::ArrowDown);
            input.interact = keys.just_pressed(bindings.interact);
            input.ui_confirm = keys.just_pressed(bindings.ui_confirm);
        }
        InputContext::Menu => {
            input.pause = keys.just_pressed(bindings.pause);
            input.ui_confirm = keys.just_pressed(bindings.ui_confirm);
        }
    }
}
