//! Turns loosely structured model output into complete records.
//!
//! Models wrap JSON in prose or markdown fences, omit keys, and return
//! numbers where strings are expected. [`normalize`] always yields a fully
//! populated record: parsed fields are overlaid onto a default record with
//! per-field type checks, and anything unusable falls back to the record's
//! literal defaults with the raw text kept in its primary free-text field.

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// A record and whether it came from the model's JSON or from the fallback.
///
/// Both variants carry the same complete record, so callers rarely need to
/// branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Parsed(T),
    Fallback(T),
}

impl<T> Normalized<T> {
    pub fn record(&self) -> &T {
        match self {
            Normalized::Parsed(record) | Normalized::Fallback(record) => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            Normalized::Parsed(record) | Normalized::Fallback(record) => record,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Normalized::Fallback(_))
    }
}

/// A record the normalizer can produce.
pub trait Normalize: Serialize + DeserializeOwned + Sized {
    /// Extra input the defaults depend on (e.g. the zodiac sign).
    type Context;

    /// The record parsed fields are overlaid onto.
    fn template(ctx: &Self::Context) -> Self;

    /// The record used when no usable JSON was found. `raw` goes into the
    /// primary free-text field.
    fn fallback(raw: &str, ctx: &Self::Context) -> Self;
}

/// Normalizes `raw` model output into a `T`. Never fails.
pub fn normalize<T: Normalize>(raw: &str, ctx: &T::Context) -> Normalized<T> {
    let Some(Value::Object(incoming)) = extract_json_object(raw) else {
        tracing::debug!("No JSON object in model output, using fallback record");
        return Normalized::Fallback(T::fallback(raw, ctx));
    };

    let mut base = match serde_json::to_value(T::template(ctx)) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to serialize default record: {}", e);
            return Normalized::Fallback(T::fallback(raw, ctx));
        }
    };
    overlay(&mut base, &incoming);

    match serde_json::from_value(base) {
        Ok(record) => Normalized::Parsed(record),
        Err(e) => {
            tracing::warn!("Overlaid record did not deserialize: {}", e);
            Normalized::Fallback(T::fallback(raw, ctx))
        }
    }
}

/// Finds the first JSON object embedded in `text`.
///
/// Tries each balanced `{...}` candidate in order, then the greedy span from
/// the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<Value> {
    for (start, _) in text.match_indices('{') {
        let Some(end) = balanced_end(&text[start..]) else {
            continue;
        };
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&text[start..start + end]) {
            return Some(value);
        }
    }

    static GREEDY: OnceLock<Option<Regex>> = OnceLock::new();
    let greedy = GREEDY.get_or_init(|| Regex::new(r"(?s)\{.*\}").ok()).as_ref()?;
    let candidate = greedy.find(text)?;
    match serde_json::from_str::<Value>(candidate.as_str()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Byte length of the balanced object starting at `text[0] == '{'`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Copies fields of `incoming` onto `base` where the shapes agree.
///
/// Strings replace strings unless blank; numbers and booleans are coerced
/// to strings; objects recurse. Keys unknown to `base` are ignored.
fn overlay(base: &mut Value, incoming: &Map<String, Value>) {
    let Value::Object(fields) = base else {
        return;
    };
    for (key, slot) in fields.iter_mut() {
        let Some(value) = incoming.get(key) else {
            continue;
        };
        if slot.is_object() {
            match value {
                Value::Object(nested) => overlay(slot, nested),
                _ => tracing::debug!(key = %key, "Ignoring model field with unexpected shape"),
            }
            continue;
        }

        let text = match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        match (slot, text) {
            (Value::String(current), Some(text)) => *current = text,
            _ => tracing::debug!(key = %key, "Ignoring model field with unexpected shape"),
        }
    }
}
