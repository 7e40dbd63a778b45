//! The dialogue box overlay.
//!
//! Spawned from the active session when the game enters `Dialogue` and torn
//! down on exit. Layout is a bottom-anchored panel: speaker name, wrapped
//! body text, then either a continue prompt (basic) or the choice rows
//! (multiple choice). Only the choice highlight changes per frame; the rest
//! of the panel is static for the session's lifetime.

use bevy::prelude::*;

use crate::dialogue::DialogueEngine;
use crate::shared::*;

#[derive(Component)]
pub struct DialogueBoxRoot;

/// Choice row, tagged with its index so the highlight system can match it
/// against the session's selected index.
#[derive(Component)]
pub struct ChoiceRow(pub usize);

const PANEL_COLOR: Color = Color::srgba(0.08, 0.08, 0.12, 0.92);
const NAME_COLOR: Color = Color::srgb(0.95, 0.85, 0.5);
const BODY_COLOR: Color = Color::srgb(0.92, 0.92, 0.88);
const CHOICE_COLOR: Color = Color::srgb(0.7, 0.7, 0.68);
const CHOICE_SELECTED_COLOR: Color = Color::srgb(1.0, 0.95, 0.6);
const PROMPT_COLOR: Color = Color::srgb(0.6, 0.6, 0.58);

/// Greedy word-wrap into at most `max_lines` lines of roughly
/// `line_chars` characters. A word longer than a whole line gets a line of
/// its own. Text beyond the line budget is truncated with an ellipsis.
pub fn wrap_text(text: &str, line_chars: usize, max_lines: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut consumed = 0;

    for (index, word) in words.iter().enumerate() {
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };
        if needed > line_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            if lines.len() == max_lines {
                consumed = index;
                break;
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
        consumed = index + 1;
    }

    if lines.len() < max_lines {
        if !current.is_empty() {
            lines.push(current);
        }
    } else if consumed < words.len() {
        // Out of lines with words left over.
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }

    lines
}

pub fn spawn_dialogue_box(mut commands: Commands, engine: Res<DialogueEngine>) {
    let Some(session) = engine.session() else {
        warn!("[Ui] Entered dialogue state with no active session");
        return;
    };

    let body_lines = wrap_text(
        &session.dialogue.text,
        DIALOGUE_LINE_CHARS,
        DIALOGUE_MAX_LINES,
    );
    let choices = session.dialogue.choices.clone();
    let is_choice_box = session.selected_choice().is_some();
    let speaker = session.speaker_name().to_string();

    commands
        .spawn((
            DialogueBoxRoot,
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(24.0),
                left: Val::Percent(10.0),
                width: Val::Percent(80.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(16.0)),
                row_gap: Val::Px(6.0),
                ..default()
            },
            BackgroundColor(PANEL_COLOR),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(speaker),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(NAME_COLOR),
            ));

            for line in body_lines {
                parent.spawn((
                    Text::new(line),
                    TextFont {
                        font_size: 19.0,
                        ..default()
                    },
                    TextColor(BODY_COLOR),
                ));
            }

            if is_choice_box {
                for (index, choice) in choices.iter().enumerate() {
                    parent.spawn((
                        ChoiceRow(index),
                        Text::new(format!("  {}", choice.text)),
                        TextFont {
                            font_size: 19.0,
                            ..default()
                        },
                        TextColor(CHOICE_COLOR),
                    ));
                }
            } else {
                parent.spawn((
                    Text::new("[E] Continue"),
                    TextFont {
                        font_size: 15.0,
                        ..default()
                    },
                    TextColor(PROMPT_COLOR),
                ));
            }
        });
}

/// Move the `>` marker and highlight colour to the currently selected row.
pub fn update_choice_highlight(
    engine: Res<DialogueEngine>,
    mut rows: Query<(&ChoiceRow, &mut Text, &mut TextColor)>,
) {
    let Some(session) = engine.session() else {
        return;
    };
    let Some(selected) = session.selected_choice() else {
        return;
    };

    for (row, mut text, mut color) in &mut rows {
        let Some(choice) = session.dialogue.choices.get(row.0) else {
            continue;
        };
        if row.0 == selected {
            text.0 = format!("> {}", choice.text);
            color.0 = CHOICE_SELECTED_COLOR;
        } else {
            text.0 = format!("  {}", choice.text);
            color.0 = CHOICE_COLOR;
        }
    }
}

pub fn despawn_dialogue_box(
    mut commands: Commands,
    roots: Query<Entity, With<DialogueBoxRoot>>,
) {
    for entity in &roots {
        commands.entity(entity).despawn_recursive();
    }
}
