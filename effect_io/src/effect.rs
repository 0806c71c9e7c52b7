// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Wire format of instructions, and decoding them into [`Effect`]s.
//!
//! An instruction is a [`serde_json::Value`] shaped like this:
//!
//! ```text
//! { "type": "Effect",
//!   "value": embed({ "verb": "write",
//!                    "value": embed({ "text": "hi\n",
//!                                     "options": embed({ "stream": 1 }) }) }) }
//! ```
//!
//! where `embed(x)` is `{ "type": "EmbeddedExpression", "value": x }`. The verb specific
//! payload is only decoded once the verb is known.

use std::{fmt::{Display, Formatter},
          str::FromStr};

use serde::Deserialize;
use serde_json::{Value, json};
use strum_macros::{Display as StrumDisplay, EnumString};

use crate::{EffectError, EffectResult, SpanId, SpanList, lookup_span};

pub const EFFECT_TYPE: &str = "Effect";
pub const EMBEDDED_TYPE: &str = "EmbeddedExpression";

/// Wrap `value` as an embedded expression.
pub fn embed(value: Value) -> Value { json!({ "type": EMBEDDED_TYPE, "value": value }) }

/// The inverse of [`embed()`].
///
/// # Errors
///
/// Returns [`EffectError::MalformedEmbedding`] if `value` is not an embedded expression.
pub fn unwrap_embedded<'a>(value: &'a Value, context: &'static str) -> EffectResult<&'a Value> {
    match value {
        Value::Object(map) if map.get("type").and_then(Value::as_str) == Some(EMBEDDED_TYPE) => {
            map.get("value")
                .ok_or(EffectError::MalformedEmbedding { context })
        }
        _ => Err(EffectError::MalformedEmbedding { context }),
    }
}

/// Output destination of a `write`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Stream `1`, usually `stdout`.
    Primary,
    /// Stream `2`, usually `stderr`.
    Secondary,
}

impl TryFrom<&Value> for Channel {
    type Error = EffectError;

    /// Accepts `1` and `2`, also when written as a JSON float (`1.0`).
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value.as_f64() {
            Some(it) if (it - 1.0).abs() < f64::EPSILON => Ok(Channel::Primary),
            Some(it) if (it - 2.0).abs() < f64::EPSILON => Ok(Channel::Secondary),
            _ => Err(EffectError::InvalidStream {
                found: value.to_string(),
            }),
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Primary => write!(f, "primary"),
            Channel::Secondary => write!(f, "secondary"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, StrumDisplay, EnumString)]
pub enum Verb {
    #[strum(to_string = "write")]
    Write,
    #[strum(to_string = "ansi-push", serialize = "push")]
    AnsiPush,
    #[strum(to_string = "ansi-pop", serialize = "pop")]
    AnsiPop,
}

/// A decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Write { text: String, channel: Channel },
    /// [`None`] echoes the spans of the current top frame.
    AnsiPush { spans: Option<SpanList> },
    AnsiPop,
}

impl Effect {
    pub fn verb(&self) -> Verb {
        match self {
            Effect::Write { .. } => Verb::Write,
            Effect::AnsiPush { .. } => Verb::AnsiPush,
            Effect::AnsiPop => Verb::AnsiPop,
        }
    }
}

/// Outer envelope of every instruction.
#[derive(Debug, Deserialize)]
struct Envelope<'a> {
    #[serde(rename = "type", borrow)]
    kind: Option<&'a str>,
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EffectBody {
    verb: Option<Value>,
    value: Option<Value>,
}

/// Builders for well formed wire instructions.
#[derive(Debug)]
pub struct Instruction;

impl Instruction {
    fn effect(verb: &str, value: Value) -> Value {
        json!({
            "type": EFFECT_TYPE,
            "value": embed(json!({ "verb": verb, "value": embed(value) })),
        })
    }

    pub fn write(text: &str, stream: u64) -> Value {
        Self::effect(
            "write",
            json!({ "text": text, "options": embed(json!({ "stream": stream })) }),
        )
    }

    pub fn ansi_push(spans: &[SpanId]) -> Value {
        let spans: Vec<String> = spans.iter().map(ToString::to_string).collect();
        Self::effect("ansi-push", json!({ "spans": spans }))
    }

    /// Push without spans, which echoes the current top frame.
    pub fn ansi_push_echo() -> Value { Self::effect("ansi-push", json!({})) }

    pub fn ansi_pop() -> Value { Self::effect("ansi-pop", json!({})) }
}

/// Decode a wire instruction into an [`Effect`].
///
/// # Errors
///
/// Any protocol violation: wrong instruction type, malformed embedding, missing or
/// unknown verb, invalid payload fields, invalid stream selector, unknown span name.
pub fn decode_instruction(instruction: &Value) -> EffectResult<Effect> {
    let envelope = Envelope::deserialize(instruction).map_err(|_| {
        EffectError::UnexpectedInstruction {
            found: instruction.to_string(),
        }
    })?;

    if envelope.kind != Some(EFFECT_TYPE) {
        return Err(EffectError::UnexpectedInstruction {
            found: envelope.kind.map_or_else(|| "nothing".into(), |it| format!("{it:?}")),
        });
    }

    let embedded = envelope
        .value
        .ok_or(EffectError::MalformedEmbedding { context: "instruction" })?;
    let body = EffectBody::deserialize(unwrap_embedded(&embedded, "instruction")?)
        .map_err(|err| EffectError::InvalidField {
            field: "value",
            reason: err.to_string(),
        })?;

    let verb = match body.verb {
        Some(Value::String(verb)) => verb,
        Some(other) => return Err(EffectError::UnknownVerb { verb: other.to_string() }),
        None => return Err(EffectError::MissingField { field: "verb" }),
    };
    let verb = Verb::from_str(&verb).map_err(|_| EffectError::UnknownVerb { verb })?;

    match verb {
        Verb::Write => decode_write(body.value.as_ref()),
        Verb::AnsiPush => decode_ansi_push(body.value.as_ref()),
        Verb::AnsiPop => Ok(Effect::AnsiPop),
    }
}

fn decode_write(payload: Option<&Value>) -> EffectResult<Effect> {
    let payload = payload.ok_or(EffectError::MissingField { field: "value" })?;
    let payload = unwrap_embedded(payload, "write payload")?;

    let text = match payload.get("text") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            return Err(EffectError::InvalidField {
                field: "text",
                reason: format!("expected a string, found {other}"),
            });
        }
        None => return Err(EffectError::MissingField { field: "text" }),
    };

    let channel = match payload.get("options") {
        None | Some(Value::Null) => Channel::Primary,
        Some(options) => match unwrap_embedded(options, "write options")?.get("stream") {
            None | Some(Value::Null) => Channel::Primary,
            Some(stream) => Channel::try_from(stream)?,
        },
    };

    Ok(Effect::Write { text, channel })
}

fn decode_ansi_push(payload: Option<&Value>) -> EffectResult<Effect> {
    let Some(payload) = payload else {
        return Ok(Effect::AnsiPush { spans: None });
    };

    let spans = match unwrap_embedded(payload, "ansi-push payload")?.get("spans") {
        None | Some(Value::Null) => return Ok(Effect::AnsiPush { spans: None }),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(name) => lookup_span(name),
                other => Err(EffectError::InvalidField {
                    field: "spans",
                    reason: format!("expected span names, found {other}"),
                }),
            })
            .collect::<EffectResult<SpanList>>()?,
        Some(other) => {
            return Err(EffectError::InvalidField {
                field: "spans",
                reason: format!("expected an array, found {other}"),
            });
        }
    };

    Ok(Effect::AnsiPush {
        spans: if spans.is_empty() { None } else { Some(spans) },
    })
}
