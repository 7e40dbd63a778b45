//! Dialogue catalog loading — fail-soft by design.
//!
//! A missing or malformed content document must never take the game down:
//! the player gets a world with no dialogue instead of a crash. Both
//! failure paths log and return an empty catalog.

use bevy::prelude::*;
use std::collections::HashMap;
use std::path::Path;

use crate::shared::*;

/// Load a dialogue catalog from a JSON document mapping id → definition.
///
/// Missing file → empty catalog + warning. Malformed JSON → empty catalog
/// + error. Each entry's `id` field is filled in from its map key so a
/// resolved definition can always name itself.
pub fn load(path: impl AsRef<Path>) -> DialogueCatalog {
    let path = path.as_ref();

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                "[Dialogue] Catalog {} not found ({err}) — starting with no dialogue content",
                path.display()
            );
            return DialogueCatalog::default();
        }
    };

    match from_json_str(&raw) {
        Ok(catalog) => {
            info!(
                "[Dialogue] Loaded {} dialogue definitions from {}",
                catalog.len(),
                path.display()
            );
            catalog
        }
        Err(err) => {
            error!(
                "[Dialogue] Catalog {} is not valid JSON ({err}) — starting with no dialogue content",
                path.display()
            );
            DialogueCatalog::default()
        }
    }
}

/// Parse a catalog from an in-memory JSON string. Split out from `load`
/// so tests can exercise parsing without touching the filesystem.
pub fn from_json_str(raw: &str) -> Result<DialogueCatalog, serde_json::Error> {
    let mut entries: HashMap<DialogueId, DialogueDef> = serde_json::from_str(raw)?;
    for (id, def) in entries.iter_mut() {
        def.id = id.clone();
    }
    Ok(DialogueCatalog { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_empty_catalog() {
        let catalog = load("/definitely/not/a/real/path/dialogues.json");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_json_yields_error() {
        assert!(from_json_str("{ not json").is_err());
        assert!(from_json_str("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_valid_catalog_parses_and_fills_ids() {
        let raw = r#"{
            "intro": { "type": "basic", "text": "Hello" },
            "gatekeeper": {
                "type": "multiple_choice",
                "npc_name": "Gatekeeper",
                "text": "Who goes there?",
                "choices": [
                    { "text": "A friend" },
                    { "text": "None of your business",
                      "payload": { "set_flag": "rude_to_gatekeeper" } }
                ]
            }
        }"#;

        let catalog = from_json_str(raw).expect("catalog should parse");
        assert_eq!(catalog.len(), 2);

        let intro = catalog.get("intro").expect("intro present");
        assert_eq!(intro.id, "intro");
        assert_eq!(intro.kind, DialogueKind::Basic);
        assert_eq!(intro.text, "Hello");

        let gate = catalog.get("gatekeeper").expect("gatekeeper present");
        assert_eq!(gate.kind, DialogueKind::MultipleChoice);
        assert_eq!(gate.choices.len(), 2);
        assert!(gate.choices[1].payload.contains_key("set_flag"));
    }

    #[test]
    fn test_unknown_kind_degrades_to_unknown_variant() {
        let raw = r#"{ "odd": { "type": "hologram", "text": "..." } }"#;
        let catalog = from_json_str(raw).expect("unknown kinds must not fail the load");
        assert_eq!(catalog.get("odd").unwrap().kind, DialogueKind::Unknown);
    }

    #[test]
    fn test_conditions_preserve_declared_order() {
        let raw = r#"{
            "door": {
                "text": "The door is locked.",
                "conditions": [
                    { "when": "has_item_key", "then": "The key fits. The door opens." },
                    { "when": "loop_count>=1", "then": "Still locked. Again." }
                ]
            }
        }"#;
        let catalog = from_json_str(raw).unwrap();
        let door = catalog.get("door").unwrap();
        assert_eq!(door.conditions.len(), 2);
        assert_eq!(door.conditions[0].when, "has_item_key");
        assert_eq!(door.conditions[1].when, "loop_count>=1");
    }

    #[test]
    fn test_structured_override_parses_as_patch() {
        let raw = r#"{
            "vendor": {
                "text": "Buying or selling?",
                "conditions": [
                    { "when": "loop_count>=3",
                      "then": { "type": "multiple_choice",
                                "text": "You again. Same as always?",
                                "choices": [ { "text": "The usual" } ] } }
                ]
            }
        }"#;
        let catalog = from_json_str(raw).unwrap();
        let vendor = catalog.get("vendor").unwrap();
        match &vendor.conditions[0].then {
            DialogueOverride::Patch(patch) => {
                assert_eq!(patch.kind, Some(DialogueKind::MultipleChoice));
                assert_eq!(patch.choices.as_ref().unwrap().len(), 1);
            }
            DialogueOverride::Text(_) => panic!("expected a structured patch"),
        }
    }
}
