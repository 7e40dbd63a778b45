//! Shared components, resources, events, and states for Loopvale.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Dialogue,
    Paused,
}

// ═══════════════════════════════════════════════════════════════════════
// LOOP CLOCK
// ═══════════════════════════════════════════════════════════════════════

/// Result of a single `LoopClock::advance` call. Replaces the classic
/// one-shot `just_reset` flag: the caller that advances the clock observes
/// the wraparound exactly once and relays it to the single designated
/// handler, so two collaborators can never both read-and-clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAdvance {
    Ticked,
    WrappedAround,
}

/// The in-game clock that drives the time loop.
///
/// Time runs from `start_time` to `end_time` (fractional hours in [0, 24)),
/// advancing one whole game-hour every `time_speed` real seconds. Reaching
/// `end_time` wraps the clock back to `start_time` and increments
/// `loop_count`.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct LoopClock {
    /// Real seconds per game-hour.
    pub time_speed: f32,
    pub start_time: f32,
    pub end_time: f32,
    pub current_time: f32,
    pub loop_count: u32,
    pub paused: bool,
    /// Real-time accumulator for sub-hour ticks.
    pub accumulated_seconds: f32,
}

impl Default for LoopClock {
    fn default() -> Self {
        Self::new(TIME_SPEED, LOOP_START_TIME, LOOP_END_TIME)
    }
}

impl LoopClock {
    pub fn new(time_speed: f32, start_time: f32, end_time: f32) -> Self {
        Self {
            time_speed,
            start_time,
            end_time,
            current_time: start_time,
            loop_count: 0,
            paused: false,
            accumulated_seconds: 0.0,
        }
    }

    /// Advance the clock by `delta_seconds` of real time.
    ///
    /// No-op while paused. Accumulated time is converted into whole
    /// game-hours one at a time so a large delta spike cannot skip over
    /// the wraparound check. On wraparound the remaining accumulated time
    /// is dropped, not carried into the new loop — every loop starts from
    /// a clean `start_time`.
    pub fn advance(&mut self, delta_seconds: f32) -> ClockAdvance {
        if self.paused {
            return ClockAdvance::Ticked;
        }

        self.accumulated_seconds += delta_seconds;

        while self.accumulated_seconds >= self.time_speed {
            self.accumulated_seconds -= self.time_speed;
            self.current_time += 1.0;

            if self.current_time >= self.end_time {
                self.current_time = self.start_time;
                self.accumulated_seconds = 0.0;
                self.loop_count += 1;
                return ClockAdvance::WrappedAround;
            }
        }

        ClockAdvance::Ticked
    }

    /// Idempotent.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Idempotent.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Format the current time as zero-padded `HH:MM`.
    ///
    /// Minutes are truncated, never rounded: 9.999 formats as "09:59",
    /// not "10:00".
    pub fn format(&self) -> String {
        let hours = self.current_time as u32;
        let minutes = ((self.current_time - hours as f32) * 60.0) as u32;
        format!("{:02}:{:02}", hours, minutes)
    }

    /// Game-hours remaining until the loop wraps.
    pub fn time_remaining(&self) -> f32 {
        self.end_time - self.current_time
    }

    /// True when no more than `threshold` game-hours remain in this loop.
    pub fn is_near_end(&self, threshold: f32) -> bool {
        self.time_remaining() <= threshold
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DIALOGUE DATA MODEL
// ═══════════════════════════════════════════════════════════════════════

pub type DialogueId = String;

/// Presentation variant of a dialogue. `OpenInput` and `LlmInterrogation`
/// are declared for forward compatibility and currently render as `Basic`.
/// Unrecognised strings in content documents deserialize to `Unknown` and
/// also fall back to `Basic` at presentation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogueKind {
    #[default]
    Basic,
    MultipleChoice,
    OpenInput,
    LlmInterrogation,
    #[serde(other)]
    Unknown,
}

/// One selectable option in a multiple-choice dialogue. The payload is an
/// opaque map interpreted by whoever consumes the session result (the
/// interaction controller applies `set_flag` / `give_item` entries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueChoice {
    pub text: String,
    #[serde(default)]
    pub payload: HashMap<String, serde_json::Value>,
}

/// Field-level override applied when a condition matches. Only the fields
/// present in the patch replace the originals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DialoguePatch {
    #[serde(default, rename = "type")]
    pub kind: Option<DialogueKind>,
    #[serde(default)]
    pub npc_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<DialogueChoice>>,
}

/// Override body of a conditional line: either a plain replacement for the
/// `text` field, or a structured partial record merged field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DialogueOverride {
    Text(String),
    Patch(DialoguePatch),
}

/// A `(predicate, override)` pair. Conditions are stored as an ordered
/// array in the content document — the first matching predicate wins, so
/// document order is semantic and must survive deserialization (a JSON
/// object would not guarantee it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueCondition {
    pub when: String,
    pub then: DialogueOverride,
}

/// Immutable dialogue definition, loaded once into the catalog and never
/// mutated afterwards. Condition resolution clones and patches a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueDef {
    #[serde(default)]
    pub id: DialogueId,
    #[serde(default, rename = "type")]
    pub kind: DialogueKind,
    /// Display-name override; the NPC's own name is used when absent.
    #[serde(default)]
    pub npc_name: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub choices: Vec<DialogueChoice>,
    #[serde(default)]
    pub conditions: Vec<DialogueCondition>,
}

/// Loaded table of dialogue definitions keyed by id. Read-only after the
/// data plugin populates it.
#[derive(Resource, Debug, Clone, Default)]
pub struct DialogueCatalog {
    pub entries: HashMap<DialogueId, DialogueDef>,
}

impl DialogueCatalog {
    pub fn get(&self, id: &str) -> Option<&DialogueDef> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DIALOGUE CONTEXT — per-interaction game-state snapshot
// ═══════════════════════════════════════════════════════════════════════

/// A value in the dialogue context. Predicates compare values of matching
/// shape; mismatched comparisons fail closed.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Number(f32),
    Text(String),
    Flag(bool),
}

/// Ephemeral key→value snapshot built fresh for each interaction attempt.
/// Keys follow the predicate grammar: `loop_count`, `time`, `has_item_*`,
/// and arbitrary quest flags. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct DialogueContext {
    values: HashMap<String, ContextValue>,
}

impl DialogueContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_number(&mut self, key: &str, value: f32) -> &mut Self {
        self.values
            .insert(key.to_string(), ContextValue::Number(value));
        self
    }

    pub fn set_text(&mut self, key: &str, value: &str) -> &mut Self {
        self.values
            .insert(key.to_string(), ContextValue::Text(value.to_string()));
        self
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> &mut Self {
        self.values.insert(key.to_string(), ContextValue::Flag(value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// NPCs
// ═══════════════════════════════════════════════════════════════════════

/// NPC movement mode. Only `Static` is executed; the others are parsed
/// from map documents and preserved for later phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    #[default]
    Static,
    Patrol,
    Wander,
}

#[derive(Component, Debug, Clone)]
pub struct Npc {
    pub npc_type: String,
    pub display_name: String,
    pub dialogue_id: Option<DialogueId>,
    pub movement: MovementKind,
    pub speed: f32,
    /// Set once per frame by the proximity system; read by the interaction
    /// controller and the indicator UI.
    pub can_interact: bool,
}

/// The NPC (if any) currently eligible for interaction — nearest within
/// `INTERACTION_RADIUS` of the player.
#[derive(Resource, Debug, Default)]
pub struct NearbyNpc(pub Option<Entity>);

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

#[derive(Component, Debug, Clone)]
pub struct PlayerMovement {
    pub facing: Facing,
    pub is_moving: bool,
    pub speed: f32,
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self {
            facing: Facing::Down,
            is_moving: false,
            speed: PLAYER_SPEED,
        }
    }
}

/// Where the player materialises at level start and after every loop reset.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SpawnPoint(pub Vec2);

impl Default for SpawnPoint {
    fn default() -> Self {
        Self(Vec2::new(10.5 * TILE_SIZE, -3.5 * TILE_SIZE))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY & FLAGS — predicate inputs
// ═══════════════════════════════════════════════════════════════════════

/// Minimal item-set inventory. Each held item id feeds a `has_item_<id>`
/// flag into dialogue contexts.
#[derive(Resource, Debug, Clone, Default)]
pub struct Inventory {
    pub items: HashSet<String>,
}

impl Inventory {
    pub fn has(&self, item_id: &str) -> bool {
        self.items.contains(item_id)
    }

    pub fn give(&mut self, item_id: &str) {
        self.items.insert(item_id.to_string());
    }
}

/// Free-form quest/progress flags referenced by dialogue predicates.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameFlags {
    pub flags: HashMap<String, bool>,
}

impl GameFlags {
    pub fn set(&mut self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT — logical actions, context-switched by GameState
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Gameplay,
    Dialogue,
    Menu,
}

/// The per-frame logical input snapshot. Reset and re-read once per frame
/// in `PreUpdate`; every other system consumes actions, never raw keys.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub interact: bool,
    pub ui_up: bool,
    pub ui_down: bool,
    pub ui_confirm: bool,
    pub pause: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub interact: KeyCode,
    pub ui_confirm: KeyCode,
    pub pause: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            interact: KeyCode::KeyE,
            ui_confirm: KeyCode::Enter,
            pause: KeyCode::Escape,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Sent exactly once per clock wraparound. Consumed by exactly one handler
/// system-wide (the player respawn system in the npcs domain).
#[derive(Event, Debug, Clone)]
pub struct LoopResetEvent {
    pub loop_count: u32,
}

/// Sent when a dialogue session completes. `payload` carries the chosen
/// choice record for multiple-choice sessions, `None` for basic ones.
#[derive(Event, Debug, Clone)]
pub struct DialogueEndEvent {
    pub npc: Entity,
    pub dialogue_id: DialogueId,
    pub payload: Option<DialogueChoice>,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 64.0;
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

/// Real seconds per game-hour.
pub const TIME_SPEED: f32 = 5.0;
/// The loop runs 09:00 → 21:00, then resets.
pub const LOOP_START_TIME: f32 = 9.0;
pub const LOOP_END_TIME: f32 = 21.0;

pub const PLAYER_SPEED: f32 = 300.0;
pub const INTERACTION_RADIUS: f32 = TILE_SIZE * 1.5;

/// Basic dialogue boxes show at most this many wrapped lines.
pub const DIALOGUE_MAX_LINES: usize = 3;
/// Approximate character budget per wrapped line at the dialogue font size.
pub const DIALOGUE_LINE_CHARS: usize = 68;
