//! UI domain plugin for Loopvale: HUD, dialogue box, pause overlay.

use bevy::prelude::*;

mod dialogue_box;
mod hud;

pub use dialogue_box::wrap_text;

use crate::shared::*;

#[derive(Component)]
struct PauseOverlay;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), hud::spawn_hud)
            .add_systems(
                Update,
                (hud::update_hud, toggle_pause).run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::Dialogue), dialogue_box::spawn_dialogue_box)
            .add_systems(
                Update,
                dialogue_box::update_choice_highlight.run_if(in_state(GameState::Dialogue)),
            )
            .add_systems(OnExit(GameState::Dialogue), dialogue_box::despawn_dialogue_box)
            .add_systems(OnEnter(GameState::Paused), spawn_pause_overlay)
            .add_systems(Update, resume_from_pause.run_if(in_state(GameState::Paused)))
            .add_systems(OnExit(GameState::Paused), despawn_pause_overlay);
    }
}

fn toggle_pause(input: Res<PlayerInput>, mut next_state: ResMut<NextState<GameState>>) {
    if input.pause {
        next_state.set(GameState::Paused);
    }
}

fn resume_from_pause(input: Res<PlayerInput>, mut next_state: ResMut<NextState<GameState>>) {
    if input.pause {
        next_state.set(GameState::Playing);
    }
}

fn spawn_pause_overlay(mut commands: Commands) {
    commands
        .spawn((
            PauseOverlay,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Paused"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.95, 0.9)),
            ));
        });
}

fn despawn_pause_overlay(mut commands: Commands, overlays: Query<Entity, With<PauseOverlay>>) {
    for entity in &overlays {
        commands.entity(entity).despawn_recursive();
    }
}
