// ── Field value helpers ──
//
// Display and edit conversions for JSON field values. Editors work on text
// or small discrete moves (toggle, cycle, step); these helpers translate
// those back into a value of the field's existing shape.

use serde_json::Value;

use crate::model::{FieldDescriptor, LabelFormat};
use crate::registry::format_hours;

/// Interpret a value as an integer, accepting numeric strings.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a value as a boolean; null and anything unrecognised are false.
pub fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.as_str(), "1" | "true" | "on" | "yes"),
        _ => false,
    }
}

/// Text shown for a value in the form.
pub fn display_text(descriptor: &FieldDescriptor, value: &Value) -> String {
    if let Some(LabelFormat::Hours) = descriptor.format {
        if let Some(hours) = as_i64(value) {
            return format_hours(hours);
        }
    }
    if !descriptor.choices.is_empty() {
        let raw = edit_text(value);
        if let Some(choice) = descriptor.choices.iter().find(|c| c.value == raw) {
            return choice.label.clone();
        }
    }
    match value {
        Value::Bool(true) => "Yes".into(),
        Value::Bool(false) => "No".into(),
        other => edit_text(other),
    }
}

/// Text a value is edited as. Lists become one entry per line.
pub fn edit_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(edit_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Convert edited text back into a value shaped like `previous`.
///
/// Lists are split on newlines with blank entries dropped; numbers stay
/// numbers when the text still parses as one. Everything else is a string.
pub fn from_text(previous: &Value, text: &str) -> Value {
    match previous {
        Value::Array(_) => Value::Array(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Value::String(line.to_owned()))
                .collect(),
        ),
        Value::Number(_) => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_owned())),
        _ => Value::String(text.to_owned()),
    }
}

/// Flip a boolean field.
pub fn toggle(value: &Value) -> Value {
    Value::Bool(!as_bool(value))
}

/// Move to the next or previous choice, wrapping around.
pub fn cycle_choice(descriptor: &FieldDescriptor, current: &Value, forward: bool) -> Option<Value> {
    let choices = &descriptor.choices;
    if choices.is_empty() {
        return None;
    }
    let raw = edit_text(current);
    let next = match choices.iter().position(|c| c.value == raw) {
        Some(i) if forward => (i + 1) % choices.len(),
        Some(i) => (i + choices.len() - 1) % choices.len(),
        None if forward => 0,
        None => choices.len() - 1,
    };
    Some(Value::String(choices[next].value.clone()))
}

/// Move a range field one detent up or down, clamped to its bounds.
///
/// Uses the allowed values when the descriptor has them, else `min..=max`
/// in `step` increments.
pub fn step_range(descriptor: &FieldDescriptor, current: &Value, forward: bool) -> Value {
    let now = as_i64(current).unwrap_or(descriptor.min.unwrap_or(0));

    if let Some(allowed) = descriptor.allowed_values.as_deref().filter(|a| !a.is_empty()) {
        let next = if forward {
            allowed.iter().copied().find(|v| *v > now)
        } else {
            allowed.iter().rev().copied().find(|v| *v < now)
        };
        return Value::from(next.unwrap_or(now));
    }

    let step = descriptor.step.filter(|s| *s > 0).unwrap_or(1);
    let mut next = if forward { now + step } else { now - step };
    if let Some(min) = descriptor.min {
        next = next.max(min);
    }
    if let Some(max) = descriptor.max {
        next = next.min(max);
    }
    Value::from(next)
}
