//! Defensive unwrapping of tool-call response envelopes.
//!
//! The typical MCP response is a single-item content list whose only block
//! is a text payload, often itself JSON-encoded. The unwrapper normalizes
//! that into plain data for the caller: first pick the substantive payload
//! (value attribute, then content attribute, then the whole response), then,
//! when that payload is a non-empty sequence, peel the first element's text.
//! Only element 0 is ever inspected.

use crate::protocol::{ContentBlock, ResponseEnvelope};
use serde_json::Value;

/// Extracts the substantive payload from a tool-call response envelope.
pub fn unwrap_response(envelope: ResponseEnvelope) -> Value {
    match envelope {
        ResponseEnvelope::Value(value) | ResponseEnvelope::Opaque(value) => unwrap_value(value),
        ResponseEnvelope::Content(blocks) => unwrap_blocks(blocks),
    }
}

fn unwrap_value(value: Value) -> Value {
    if let Value::Array(items) = &value {
        if let Some(text) = items
            .first()
            .and_then(|first| first.get("text"))
            .and_then(Value::as_str)
        {
            return unwrap_text(text);
        }
    }
    value
}

fn unwrap_blocks(blocks: Vec<ContentBlock>) -> Value {
    match blocks.first().and_then(|first| first.text.as_deref()) {
        Some(text) => unwrap_text(text),
        None => Value::Array(blocks.into_iter().map(|b| b.raw).collect()),
    }
}

/// Parses JSON-looking text; everything else passes through as a string.
/// A failed parse of JSON-looking text also passes through unchanged.
fn unwrap_text(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str(trimmed) {
            Ok(parsed) => parsed,
            Err(_) => Value::String(text.to_string()),
        }
    } else {
        Value::String(text.to_string())
    }
}
