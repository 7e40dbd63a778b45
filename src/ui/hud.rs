//! In-game HUD: the clock readout and the loop counter.

use bevy::prelude::*;

use crate::shared::*;

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct ClockText;

#[derive(Component)]
pub struct LoopText;

const CLOCK_COLOR: Color = Color::srgb(0.95, 0.95, 0.9);
const CLOCK_WARNING_COLOR: Color = Color::srgb(0.95, 0.3, 0.25);

/// Game-hours left in the loop below which the clock turns red.
const WARNING_THRESHOLD: f32 = 1.0;

pub fn spawn_hud(mut commands: Commands, existing: Query<Entity, With<HudRoot>>) {
    if !existing.is_empty() {
        return;
    }

    commands
        .spawn((
            HudRoot,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                right: Val::Px(16.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::FlexEnd,
                row_gap: Val::Px(2.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                ClockText,
                Text::new("09:00"),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(CLOCK_COLOR),
            ));
            parent.spawn((
                LoopText,
                Text::new("Loop 1"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.75)),
            ));
        });
}

/// Refresh the readout every frame; tint the clock when the loop is about
/// to wrap so the player can feel the deadline.
pub fn update_hud(
    clock: Res<LoopClock>,
    mut clock_text: Query<(&mut Text, &mut TextColor), (With<ClockText>, Without<LoopText>)>,
    mut loop_text: Query<&mut Text, With<LoopText>>,
) {
    if let Ok((mut text, mut color)) = clock_text.get_single_mut() {
        text.0 = clock.format();
        color.0 = if clock.is_near_end(WARNING_THRESHOLD) {
            CLOCK_WARNING_COLOR
        } else {
            CLOCK_COLOR
        };
    }
    if let Ok(mut text) = loop_text.get_single_mut() {
        text.0 = format!("Loop {}", clock.loop_count + 1);
    }
}
