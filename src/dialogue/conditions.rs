//! Predicate evaluation and conditional dialogue resolution.
//!
//! Predicate grammar: `key OP value` with OP one of `>=`, `<=`, `>`, `<`,
//! `==`, or a bare flag name. Operators are tested longest-first so that
//! `>=` is never mis-split as `>`. Values parse as `HH:MM` times, floats,
//! integers, or fall back to literal strings.

use bevy::prelude::*;

use crate::shared::*;

/// A parsed right-hand-side literal.
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Number(f32),
    Text(String),
}

/// Parse a predicate value: `HH:MM` → fractional hours, `.` → float,
/// otherwise integer, otherwise a literal string.
fn parse_literal(raw: &str) -> Literal {
    let value = raw.trim();

    if value.contains(':') {
        let mut parts = value.splitn(2, ':');
        let hours = parts.next().unwrap_or("").trim().parse::<f32>();
        let minutes = parts.next().unwrap_or("").trim().parse::<f32>();
        if let (Ok(h), Ok(m)) = (hours, minutes) {
            return Literal::Number(h + m / 60.0);
        }
        return Literal::Text(value.to_string());
    }

    if value.contains('.') {
        if let Ok(f) = value.parse::<f32>() {
            return Literal::Number(f);
        }
        return Literal::Text(value.to_string());
    }

    if let Ok(i) = value.parse::<i64>() {
        return Literal::Number(i as f32);
    }

    Literal::Text(value.to_string())
}

/// Numeric view of a context value for ordering comparisons. A missing key
/// defaults to 0, so an absent counter satisfies `< positive` comparisons;
/// existing content relies on that.
fn ordering_operand(context: &DialogueContext, key: &str) -> ContextValue {
    context
        .get(key)
        .cloned()
        .unwrap_or(ContextValue::Number(0.0))
}

/// Evaluate one ordering comparison. Same-shape operands compare natively
/// (numbers numerically, strings lexicographically, with bools coerced to
/// 0/1 against numbers); anything else fails closed with a warning.
fn compare_ordering(lhs: &ContextValue, rhs: &Literal, op: &str) -> bool {
    let ordered = |a: f32, b: f32| match op {
        ">=" => a >= b,
        "<=" => a <= b,
        ">" => a > b,
        _ => a < b,
    };

    match (lhs, rhs) {
        (ContextValue::Number(a), Literal::Number(b)) => ordered(*a, *b),
        (ContextValue::Flag(a), Literal::Number(b)) => {
            ordered(if *a { 1.0 } else { 0.0 }, *b)
        }
        (ContextValue::Text(a), Literal::Text(b)) => match op {
            ">=" => a.as_str() >= b.as_str(),
            "<=" => a.as_str() <= b.as_str(),
            ">" => a.as_str() > b.as_str(),
            _ => a.as_str() < b.as_str(),
        },
        _ => {
            warn!(
                "[Dialogue] Type mismatch in ordering comparison ({:?} {} {:?}) — failing closed",
                lhs, op, rhs
            );
            false
        }
    }
}

/// Evaluate one equality comparison. A missing key is unequal to anything.
fn compare_equality(lhs: Option<&ContextValue>, rhs: &Literal) -> bool {
    let Some(lhs) = lhs else {
        return false;
    };
    match (lhs, rhs) {
        (ContextValue::Number(a), Literal::Number(b)) => (a - b).abs() < f32::EPSILON,
        (ContextValue::Text(a), Literal::Text(b)) => a == b,
        (ContextValue::Flag(a), Literal::Number(b)) => {
            (if *a { 1.0 } else { 0.0 } - b).abs() < f32::EPSILON
        }
        _ => {
            warn!(
                "[Dialogue] Type mismatch in equality comparison ({:?} == {:?}) — failing closed",
                lhs, rhs
            );
            false
        }
    }
}

/// Evaluate a predicate string against a context.
///
/// Operators are tested longest-first (`>=`, `<=` before `>`, `<`). A
/// string with no operator is treated as a boolean flag name, defaulting
/// to false when absent. Malformed predicates never panic — a degenerate
/// split produces empty key/value parts that fail closed.
pub fn evaluate(predicate: &str, context: &DialogueContext) -> bool {
    // Longest operators first — checking ">" before ">=" would split
    // "time>=12:00" into ("time", "=12:00").
    for op in [">=", "<=", ">", "<"] {
        if let Some(idx) = predicate.find(op) {
            let key = predicate[..idx].trim();
            let value = parse_literal(&predicate[idx + op.len()..]);
            return compare_ordering(&ordering_operand(context, key), &value, op);
        }
    }

    if let Some(idx) = predicate.find("==") {
        let key = predicate[..idx].trim();
        let value = parse_literal(&predicate[idx + 2..]);
        return compare_equality(context.get(key), &value);
    }

    // Bare flag lookup, default false.
    match context.get(predicate.trim()) {
        Some(ContextValue::Flag(b)) => *b,
        Some(ContextValue::Number(n)) => *n != 0.0,
        Some(ContextValue::Text(s)) => !s.is_empty(),
        None => false,
    }
}

/// Resolve a dialogue definition against a context.
///
/// Walks the conditions in declared document order; the FIRST predicate
/// that evaluates true wins and no later override is considered. A plain
/// string override replaces only `text`; a patch overwrites exactly the
/// fields it carries. No match returns the definition unchanged. The
/// catalog entry itself is never mutated — resolution works on a copy.
pub fn resolve(definition: &DialogueDef, context: &DialogueContext) -> DialogueDef {
    for condition in &definition.conditions {
        if !evaluate(&condition.when, context) {
            continue;
        }

        let mut resolved = definition.clone();
        match &condition.then {
            DialogueOverride::Text(text) => {
                resolved.text = text.clone();
            }
            DialogueOverride::Patch(patch) => {
                if let Some(kind) = patch.kind {
                    resolved.kind = kind;
                }
                if let Some(npc_name) = &patch.npc_name {
                    resolved.npc_name = Some(npc_name.clone());
                }
                if let Some(text) = &patch.text {
                    resolved.text = text.clone();
                }
                if let Some(choices) = &patch.choices {
                    resolved.choices = choices.clone();
                }
            }
        }
        return resolved;
    }

    definition.clone()
}
