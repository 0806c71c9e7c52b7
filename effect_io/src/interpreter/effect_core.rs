// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Dispatch shared by the IO and the pure interpreter.
//!
//! [`EffectCore`] owns the [`SpanStack`] and turns each decoded [`Effect`] into calls on
//! an [`EffectSink`]. The two interpreters only differ in their sink.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::{AnsiStyleTable, Channel, ESC, Effect, EffectError, EffectResult, SpanStack,
            StyleTable, decode_instruction};

/// Where the output of the dispatched effects goes.
pub trait EffectSink {
    /// Plain text from a `write`. Never contains an escape byte.
    fn write_text(&mut self, channel: Channel, text: String);

    /// One burst of escape sequences from a push or a pop. Never empty.
    fn write_control(&mut self, escapes: String);
}

/// Configuration shared by both interpreters.
#[derive(Clone, Debug)]
pub struct EvaluateOptions {
    pub style_table: Arc<dyn StyleTable>,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            style_table: Arc::new(AnsiStyleTable),
        }
    }
}

impl EvaluateOptions {
    #[must_use]
    pub fn with_style_table(mut self, style_table: impl StyleTable + 'static) -> Self {
        self.style_table = Arc::new(style_table);
        self
    }
}

#[derive(Debug)]
pub struct EffectCore {
    stack: SpanStack,
    style_table: Arc<dyn StyleTable>,
}

impl EffectCore {
    pub fn new(style_table: Arc<dyn StyleTable>) -> Self {
        Self {
            stack: SpanStack::new(),
            style_table,
        }
    }

    pub fn stack(&self) -> &SpanStack { &self.stack }

    /// Decode `instruction` and dispatch it. Returns the value to resume the producer
    /// with, which is [`None`] for every built in verb.
    ///
    /// # Errors
    ///
    /// Any decoding error, or any error from [`Self::dispatch()`].
    pub fn dispatch_instruction(
        &mut self,
        instruction: &Value,
        sink: &mut dyn EffectSink,
    ) -> EffectResult<Option<Value>> {
        let effect = decode_instruction(instruction)?;
        debug!(verb = %effect.verb(), depth = self.stack.len(), "dispatch");
        self.dispatch(effect, sink)?;
        Ok(None)
    }

    /// # Errors
    ///
    /// - [`EffectError::EscapeInWrite`] if `write` text contains an escape byte. Nothing
    ///   is written in that case.
    /// - [`EffectError::PopOnEmptyStack`] if `ansi-pop` has nothing to pop.
    pub fn dispatch(&mut self, effect: Effect, sink: &mut dyn EffectSink) -> EffectResult<()> {
        match effect {
            Effect::Write { text, channel } => {
                if text.contains(ESC) {
                    return Err(EffectError::EscapeInWrite);
                }
                sink.write_text(channel, text);
            }
            Effect::AnsiPush { spans } => {
                let (stack, transition) = self.stack.push(spans, self.style_table.as_ref());
                self.stack = stack;
                for burst in transition.into_bursts() {
                    sink.write_control(burst);
                }
            }
            Effect::AnsiPop => {
                let (stack, transition) = self.stack.pop(self.style_table.as_ref())?;
                self.stack = stack;
                for burst in transition.into_bursts() {
                    sink.write_control(burst);
                }
            }
        }
        Ok(())
    }

    /// Call once the producer is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::UnbalancedStack`] if some push was never popped.
    pub fn finish(&self) -> EffectResult<()> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(EffectError::UnbalancedStack {
                depth: self.stack.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Instruction, NoColorStyleTable, SpanId};

    #[derive(Debug, Default)]
    struct RecordingSink {
        calls: Vec<(&'static str, String)>,
    }

    impl EffectSink for RecordingSink {
        fn write_text(&mut self, channel: Channel, text: String) {
            let tag = match channel {
                Channel::Primary => "text:1",
                Channel::Secondary => "text:2",
            };
            self.calls.push((tag, text));
        }

        fn write_control(&mut self, escapes: String) { self.calls.push(("control", escapes)); }
    }

    fn core() -> EffectCore { EffectCore::new(EvaluateOptions::default().style_table) }

    #[test]
    fn test_dispatch_routes_text_and_escape_bursts() {
        let mut core = core();
        let mut sink = RecordingSink::default();
        for it in [
            Instruction::ansi_push(&[SpanId::Bold]),
            Instruction::write("hi", 1),
            Instruction::ansi_push(&[SpanId::Red]),
            Instruction::write("err", 2),
            Instruction::ansi_pop(),
            Instruction::ansi_pop(),
        ] {
            assert_eq!(core.dispatch_instruction(&it, &mut sink).unwrap(), None);
        }
        assert!(core.stack().is_empty());
        core.finish().unwrap();

        assert_eq!(
            sink.calls,
            vec![
                ("control", "\x1b[1m".to_string()),
                ("text:1", "hi".to_string()),
                ("control", "\x1b[22m".to_string()),
                ("control", "\x1b[31m".to_string()),
                ("text:2", "err".to_string()),
                ("control", "\x1b[39m".to_string()),
                ("control", "\x1b[1m".to_string()),
                ("control", "\x1b[22m".to_string()),
            ]
        );
    }

    #[test]
    fn test_escape_in_write_is_rejected_before_sink() {
        let mut core = core();
        let mut sink = RecordingSink::default();
        core.dispatch_instruction(&Instruction::ansi_push(&[SpanId::Bold]), &mut sink)
            .unwrap();
        sink.calls.clear();
        let result = core.dispatch_instruction(&Instruction::write("a\x1b[31mb", 1), &mut sink);

        assert!(matches!(result, Err(EffectError::EscapeInWrite)));
        assert!(sink.calls.is_empty());
        assert_eq!(core.stack().len(), 1);
    }

    #[test]
    fn test_pop_on_empty_stack_fails() {
        let result =
            core().dispatch_instruction(&Instruction::ansi_pop(), &mut RecordingSink::default());
        assert!(matches!(result, Err(EffectError::PopOnEmptyStack)));
    }

    #[test]
    fn test_finish_reports_depth_of_unbalanced_stack() {
        let mut core = core();
        let mut sink = RecordingSink::default();
        core.dispatch_instruction(&Instruction::ansi_push(&[SpanId::Bold]), &mut sink)
            .unwrap();
        core.dispatch_instruction(&Instruction::ansi_push_echo(), &mut sink)
            .unwrap();
        assert_eq!(core.stack().len(), 2);

        assert!(matches!(
            core.finish(),
            Err(EffectError::UnbalancedStack { depth: 2 })
        ));
    }

    #[test]
    fn test_no_color_table_still_enforces_discipline() {
        let mut core = EffectCore::new(
            EvaluateOptions::default()
                .with_style_table(NoColorStyleTable)
                .style_table,
        );
        let mut sink = RecordingSink::default();
        core.dispatch_instruction(&Instruction::ansi_push(&[SpanId::Bold]), &mut sink)
            .unwrap();

        assert!(sink.calls.is_empty());
        assert!(core.finish().is_err());
    }
}
