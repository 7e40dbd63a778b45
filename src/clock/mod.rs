//! Clock domain — the heartbeat of Loopvale.
//!
//! Responsible for:
//! - Advancing the loop clock from real frame deltas
//! - Detecting wraparound and emitting LoopResetEvent
//! - Pausing / resuming time based on GameState
//!
//! The clock itself (`LoopClock` in `shared`) is a pure state machine; this
//! plugin is the single frame driver that advances it. The wraparound is
//! surfaced as the return value of `advance()` and relayed through
//! `LoopResetEvent`, which exactly one system (player respawn in the npcs
//! domain) consumes — there is no flag two readers could race on.

use bevy::prelude::*;

use crate::shared::*;

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app
            // Pause time whenever we leave Playing state (dialogue, menu)
            .add_systems(OnEnter(GameState::Playing), resume_time)
            .add_systems(OnExit(GameState::Playing), pause_time)
            // Core time tick — only runs while Playing
            .add_systems(
                Update,
                tick_clock.run_if(in_state(GameState::Playing)),
            );
    }
}

// ─── State transition hooks ──────────────────────────────────────────────────

fn resume_time(mut clock: ResMut<LoopClock>) {
    clock.resume();
    info!("[Clock] Time resumed — {} (loop #{})", clock.format(), clock.loop_count);
}

fn pause_time(mut clock: ResMut<LoopClock>) {
    clock.pause();
    info!("[Clock] Time paused at {}", clock.format());
}

// ─── Main time-tick system ───────────────────────────────────────────────────

/// Feeds the frame delta into the loop clock and relays a wraparound as a
/// `LoopResetEvent`. `advance()` while paused is a guaranteed no-op, so a
/// frame that races a state transition cannot cause drift.
fn tick_clock(
    time: Res<Time>,
    mut clock: ResMut<LoopClock>,
    mut reset_writer: EventWriter<LoopResetEvent>,
) {
    if clock.advance(time.delta_secs()) == ClockAdvance::WrappedAround {
        info!("[Clock] Loop #{} started", clock.loop_count);
        reset_writer.send(LoopResetEvent {
            loop_count: clock.loop_count,
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
