// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The pure interpreter. Instead of writing to streams it yields the rendered output as
//! an async stream of strings, in emission order.
//!
//! There is no notion of channels here (stream selectors are still validated), so there
//! is no forced newline on a channel switch either. Nothing runs until the returned
//! stream is polled, and dropping it stops the producer.

use futures_core::Stream;
use futures_util::StreamExt;

use crate::{Channel, EffectCore, EffectResult, EffectSink, EffectSource, EvaluateOptions,
            OutputStream, Pump, pipe_lines_to_stream};

/// [`EffectSink`] that queues chunks until the stream hands them out.
#[derive(Debug, Default)]
struct PureSink {
    chunks: Vec<String>,
}

impl EffectSink for PureSink {
    fn write_text(&mut self, _channel: Channel, text: String) {
        if !text.is_empty() {
            self.chunks.push(text);
        }
    }

    fn write_control(&mut self, escapes: String) { self.chunks.push(escapes); }
}

/// Render `strategy` with the default [`EvaluateOptions`].
pub fn evaluate_pure<F, S>(strategy: F) -> impl Stream<Item = EffectResult<String>>
where
    F: FnOnce() -> S,
    S: EffectSource,
{
    evaluate_pure_with(strategy, EvaluateOptions::default())
}

/// Lazily render `strategy`. Each item is either the text of a `write` or one escape
/// burst. A failure is yielded as the last item. The unbalanced stack check comes after
/// the last chunk.
pub fn evaluate_pure_with<F, S>(
    strategy: F,
    options: EvaluateOptions,
) -> impl Stream<Item = EffectResult<String>>
where
    F: FnOnce() -> S,
    S: EffectSource,
{
    async_stream::stream! {
        let mut core = EffectCore::new(options.style_table);
        let mut sink = PureSink::default();
        let mut pump = Pump::new(strategy());
        let mut resume_with = None;

        loop {
            let instruction = match pump.step(resume_with.take()).await {
                Ok(Some(it)) => it,
                Ok(None) => break,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };
            match core.dispatch_instruction(&instruction, &mut sink) {
                Ok(it) => resume_with = it,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            }
            for chunk in sink.chunks.drain(..) {
                yield Ok(chunk);
            }
        }

        if let Err(err) = core.finish() {
            yield Err(err);
        }
    }
}

/// Render `strategy` into a single string.
///
/// # Errors
///
/// The first error the run produced. Output before it is discarded.
pub async fn collect_pure<F, S>(strategy: F) -> EffectResult<String>
where
    F: FnOnce() -> S,
    S: EffectSource,
{
    let mut acc = String::new();
    let mut chunks = std::pin::pin!(evaluate_pure(strategy));
    while let Some(chunk) = chunks.next().await {
        acc.push_str(&chunk?);
    }
    Ok(acc)
}

/// Render `strategy` into `stream`, line by line.
///
/// # Errors
///
/// The first error the run produced. The partial line pending at that point is written
/// out before the error is returned.
pub async fn render_pure_to_stream<F, S>(
    strategy: F,
    options: EvaluateOptions,
    stream: &mut dyn OutputStream,
) -> EffectResult<()>
where
    F: FnOnce() -> S,
    S: EffectSource,
{
    pipe_lines_to_stream(evaluate_pure_with(strategy, options), stream).await?;
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{EffectError, Instruction, IterSource, SpanId, StreamSource,
                test_fixtures::{StreamMock, gen_instruction_stream_with_delay}};

    #[tokio::test]
    async fn test_pure_yields_chunks_in_emission_order() {
        let strategy = || {
            IterSource::new(vec![
                Instruction::ansi_push(&[SpanId::Bold]),
                Instruction::write("hi", 1),
                Instruction::write("there", 2),
                Instruction::ansi_pop(),
            ])
        };
        let chunks: Vec<_> = evaluate_pure(strategy).collect().await;
        let chunks: Vec<String> = chunks.into_iter().map(Result::unwrap).collect();

        assert_eq!(chunks, vec!["\x1b[1m", "hi", "there", "\x1b[22m"]);
    }

    #[tokio::test]
    async fn test_collect_pure_with_deferred_source() {
        let strategy = || {
            StreamSource::new(gen_instruction_stream_with_delay(
                vec![
                    Instruction::write("a\n", 1),
                    Instruction::ansi_push(&[SpanId::Italic]),
                    Instruction::write("b", 1),
                    Instruction::ansi_pop(),
                ],
                Duration::from_millis(1),
            ))
        };
        assert_eq!(
            collect_pure(strategy).await.unwrap(),
            "a\n\x1b[3mb\x1b[23m"
        );
    }

    #[tokio::test]
    async fn test_error_is_the_last_item() {
        let strategy = || {
            IterSource::new(vec![
                Instruction::write("ok", 1),
                Instruction::write("bad", 3),
                Instruction::write("never", 1),
            ])
        };
        let items: Vec<_> = evaluate_pure(strategy).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "ok");
        assert!(matches!(items[1], Err(EffectError::InvalidStream { .. })));
    }

    #[tokio::test]
    async fn test_unbalanced_stack_comes_after_last_chunk() {
        let strategy = || {
            IterSource::new(vec![
                Instruction::ansi_push(&[SpanId::Red]),
                Instruction::write("x", 1),
            ])
        };
        let items: Vec<_> = evaluate_pure(strategy).collect().await;

        assert_eq!(items.len(), 3);
        assert!(matches!(
            items.last(),
            Some(Err(EffectError::UnbalancedStack { depth: 1 }))
        ));
    }

    #[tokio::test]
    async fn test_render_pure_to_stream_is_line_buffered() {
        let mock = StreamMock::new();
        let mut stream = mock.clone();
        let strategy = || {
            IterSource::new(vec![
                Instruction::write("one\ntw", 1),
                Instruction::ansi_push(&[SpanId::Bold]),
                Instruction::write("o\nthree", 2),
                Instruction::ansi_pop(),
            ])
        };
        render_pure_to_stream(strategy, EvaluateOptions::default(), &mut stream)
            .await
            .unwrap();

        assert_eq!(
            mock.get_writes(),
            vec!["one\n", "tw\x1b[1mo\n", "three\x1b[22m"]
        );
    }
}
