//! Dialogue engine: owns the single active dialogue session and its
//! presentation state machine.
//!
//! The engine is `Idle → Active(presentation) → Idle`. At most one session
//! exists system-wide; a `start` while a session is active is ignored (and
//! logged) rather than surfaced — this is a live interactive system with
//! no user-facing error channel, so invariant violations degrade silently.
//!
//! Presentation variants form a closed set selected by the dialogue kind:
//! `Basic` completes on a single acknowledge, `MultipleChoice` requires an
//! explicit confirmed choice and cannot be dismissed without one.

use bevy::prelude::*;

use super::conditions;
use crate::shared::*;

/// Who opened the conversation. NPCs never initiate today, but scripted
/// events can start a dialogue on an NPC's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Initiator {
    #[default]
    Player,
    Npc,
}

/// Logical input routed into the active presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueAction {
    Up,
    Down,
    Confirm,
}

/// Result of polling the engine once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueUpdate {
    Continue,
    Ended(Option<DialogueChoice>),
}

/// Presentation sub-state of the active session.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Basic {
        finished: bool,
    },
    MultipleChoice {
        selected: usize,
        confirmed: Option<usize>,
    },
}

/// One active conversation. Borrows the NPC by entity id and holds a
/// resolved copy of the definition — the catalog entry is never touched.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    pub dialogue: DialogueDef,
    pub npc: Entity,
    pub npc_display_name: String,
    pub initiator: Initiator,
    pub presentation: Presentation,
}

impl DialogueSession {
    /// The name shown in the dialogue box: the definition's override if
    /// present, otherwise the NPC's own display name.
    pub fn speaker_name(&self) -> &str {
        self.dialogue
            .npc_name
            .as_deref()
            .unwrap_or(&self.npc_display_name)
    }

    /// Highlighted choice index, if this is a multiple-choice session.
    pub fn selected_choice(&self) -> Option<usize> {
        match self.presentation {
            Presentation::MultipleChoice { selected, .. } => Some(selected),
            Presentation::Basic { .. } => None,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct DialogueEngine {
    session: Option<DialogueSession>,
}

impl DialogueEngine {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DialogueSession> {
        self.session.as_ref()
    }

    /// Begin a dialogue with an NPC.
    ///
    /// No-op while a session is already active. `dialogue_id` overrides
    /// the NPC's own default id; if neither resolves to a catalog entry
    /// the start is aborted with a warning and the engine stays idle.
    /// Conditions are resolved against `context` before the presentation
    /// is chosen from the resolved kind.
    pub fn start(
        &mut self,
        npc: Entity,
        npc_display_name: &str,
        npc_dialogue_id: Option<&str>,
        dialogue_id: Option<&str>,
        catalog: &DialogueCatalog,
        context: &DialogueContext,
        initiator: Initiator,
    ) {
        if self.session.is_some() {
            debug!("[Dialogue] start ignored — a session is already active");
            return;
        }

        let Some(id) = dialogue_id.or(npc_dialogue_id) else {
            warn!(
                "[Dialogue] NPC '{}' has no dialogue id — nothing to say",
                npc_display_name
            );
            return;
        };

        let Some(definition) = catalog.get(id) else {
            warn!("[Dialogue] Dialogue '{}' not found in catalog", id);
            return;
        };

        let resolved = conditions::resolve(definition, context);
        let presentation = Self::presentation_for(&resolved);

        self.session = Some(DialogueSession {
            dialogue: resolved,
            npc,
            npc_display_name: npc_display_name.to_string(),
            initiator,
            presentation,
        });
    }

    /// Select the presentation variant for a resolved definition. Kinds
    /// without a real presentation yet fall back to `Basic` — declared
    /// forward compatibility, not an error path.
    fn presentation_for(dialogue: &DialogueDef) -> Presentation {
        match dialogue.kind {
            DialogueKind::MultipleChoice => {
                if dialogue.choices.is_empty() {
                    warn!(
                        "[Dialogue] '{}' is multiple_choice with no choices — presenting as basic",
                        dialogue.id
                    );
                    Presentation::Basic { finished: false }
                } else {
                    Presentation::MultipleChoice {
                        selected: 0,
                        confirmed: None,
                    }
                }
            }
            DialogueKind::OpenInput | DialogueKind::LlmInterrogation => {
                warn!(
                    "[Dialogue] '{}' kind {:?} not implemented yet — presenting as basic",
                    dialogue.id, dialogue.kind
                );
                Presentation::Basic { finished: false }
            }
            DialogueKind::Unknown => {
                warn!(
                    "[Dialogue] '{}' has an unknown kind — presenting as basic",
                    dialogue.id
                );
                Presentation::Basic { finished: false }
            }
            DialogueKind::Basic => Presentation::Basic { finished: false },
        }
    }

    /// Route a logical input into the active presentation. Returns whether
    /// the event was consumed, so the caller can suppress its own default
    /// interaction handling while a dialogue owns input focus.
    pub fn handle_input(&mut self, action: DialogueAction) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        match &mut session.presentation {
            Presentation::Basic { finished } => match action {
                DialogueAction::Confirm => {
                    *finished = true;
                    true
                }
                _ => false,
            },
            Presentation::MultipleChoice {
                selected,
                confirmed,
            } => {
                let count = session.dialogue.choices.len();
                match action {
                    DialogueAction::Up => {
                        *selected = (*selected + count - 1) % count;
                        true
                    }
                    DialogueAction::Down => {
                        *selected = (*selected + 1) % count;
                        true
                    }
                    DialogueAction::Confirm => {
                        *confirmed = Some(*selected);
                        true
                    }
                }
            }
        }
    }

    /// Poll once per frame. When the active presentation reaches its
    /// terminal condition the session is destroyed and its result (the
    /// chosen choice record for multiple-choice, nothing for basic)
    /// returned; the engine is idle again on return.
    pub fn update(&mut self) -> DialogueUpdate {
        let Some(session) = self.session.as_ref() else {
            return DialogueUpdate::Continue;
        };

        let payload = match &session.presentation {
            Presentation::Basic { finished: true } => None,
            Presentation::MultipleChoice {
                confirmed: Some(index),
                ..
            } => session.dialogue.choices.get(*index).cloned(),
            _ => return DialogueUpdate::Continue,
        };

        self.session = None;
        DialogueUpdate::Ended(payload)
    }
}
