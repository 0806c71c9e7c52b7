// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Every failure that can abort an interpreter run.
//!
//! | Kind                 | Variants                                                                        |
//! | :------------------- | :------------------------------------------------------------------------------ |
//! | Protocol violation   | [`UnexpectedInstruction`], [`MalformedEmbedding`], [`MissingField`], [`InvalidField`], [`UnknownVerb`], [`InvalidStream`] |
//! | Unbalanced styling   | [`PopOnEmptyStack`], [`UnbalancedStack`]                                        |
//! | Illegal payload      | [`EscapeInWrite`]                                                               |
//! | Unknown span         | [`UnknownSpan`]                                                                 |
//! | Producer failure     | [`Source`]                                                                      |
//! | Stream failure       | [`Io`]                                                                          |
//!
//! None of these are retried. Each one is a contract violation by the producer (or a
//! broken output stream), not a transient condition. Backpressure is never an error, it
//! only delays output.
//!
//! [`UnexpectedInstruction`]: EffectError::UnexpectedInstruction
//! [`MalformedEmbedding`]: EffectError::MalformedEmbedding
//! [`MissingField`]: EffectError::MissingField
//! [`InvalidField`]: EffectError::InvalidField
//! [`UnknownVerb`]: EffectError::UnknownVerb
//! [`InvalidStream`]: EffectError::InvalidStream
//! [`PopOnEmptyStack`]: EffectError::PopOnEmptyStack
//! [`UnbalancedStack`]: EffectError::UnbalancedStack
//! [`EscapeInWrite`]: EffectError::EscapeInWrite
//! [`UnknownSpan`]: EffectError::UnknownSpan
//! [`Source`]: EffectError::Source
//! [`Io`]: EffectError::Io

/// Result type used throughout the library.
pub type EffectResult<T> = Result<T, EffectError>;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EffectError {
    #[error("Expected an instruction of type 'Effect', found {found}")]
    #[diagnostic(code(r3bl_effect_io::protocol::unexpected_instruction))]
    UnexpectedInstruction { found: String },

    #[error("Malformed embedded value in {context}")]
    #[diagnostic(
        code(r3bl_effect_io::protocol::malformed_embedding),
        help("Embedded values look like {{\"type\": \"EmbeddedExpression\", \"value\": ...}}")
    )]
    MalformedEmbedding { context: &'static str },

    #[error("Missing field '{field}' in effect payload")]
    #[diagnostic(code(r3bl_effect_io::protocol::missing_field))]
    MissingField { field: &'static str },

    #[error("Invalid field '{field}' in effect payload: {reason}")]
    #[diagnostic(code(r3bl_effect_io::protocol::invalid_field))]
    InvalidField { field: &'static str, reason: String },

    #[error("Unexpected call of {{verb: {verb:?}}}")]
    #[diagnostic(
        code(r3bl_effect_io::protocol::unknown_verb),
        help("Known verbs are 'write', 'ansi-push' ('push') and 'ansi-pop' ('pop')")
    )]
    UnknownVerb { verb: String },

    #[error("Invalid stream selector {found}, expected 1 (stdout) or 2 (stderr)")]
    #[diagnostic(code(r3bl_effect_io::protocol::invalid_stream))]
    InvalidStream { found: String },

    #[error("Cannot write ANSI escape to io VM, instead use ansi-push")]
    #[diagnostic(
        code(r3bl_effect_io::payload::escape_in_write),
        help("Styling must only enter the output through 'ansi-push' and 'ansi-pop'")
    )]
    EscapeInWrite,

    #[error("cannot pop: stack empty")]
    #[diagnostic(code(r3bl_effect_io::styling::pop_on_empty_stack))]
    PopOnEmptyStack,

    #[error("Unbalanced styling: {depth} span frame(s) still open when the source ended")]
    #[diagnostic(
        code(r3bl_effect_io::styling::unbalanced_stack),
        help("Every 'ansi-push' must be matched by an 'ansi-pop' in the same run")
    )]
    UnbalancedStack { depth: usize },

    #[error("Unknown span identifier '{name}'")]
    #[diagnostic(code(r3bl_effect_io::styling::unknown_span))]
    UnknownSpan { name: String },

    /// The producer itself failed. The inner [`miette::Report`] is passed through
    /// untouched.
    #[error("Effect source failed: {0}")]
    #[diagnostic(code(r3bl_effect_io::source))]
    Source(miette::Report),

    #[error(transparent)]
    #[diagnostic(code(r3bl_effect_io::io))]
    Io(#[from] std::io::Error),
}

impl EffectError {
    /// Wrap any producer side failure, so that it propagates out of the pump unchanged.
    pub fn producer(report: impl Into<miette::Report>) -> Self { Self::Source(report.into()) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_unknown_verb_names_the_verb() {
        let err = EffectError::UnknownVerb {
            verb: "explode".into(),
        };
        assert_eq!(err.to_string(), r#"Unexpected call of {verb: "explode"}"#);
    }

    #[test]
    fn test_source_error_keeps_report() {
        let err = EffectError::producer(miette::miette!("producer blew up"));
        let EffectError::Source(report) = err else {
            panic!("expected EffectError::Source");
        };
        assert_eq!(report.to_string(), "producer blew up");
    }
}
