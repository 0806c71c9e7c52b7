// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Pull interface over an effect producer.
//!
//! A producer is opaque to the interpreter. All it has to do is implement
//! [`EffectSource`], which is advanced one step at a time. Each step either yields a
//! [`Pending`] instruction or reports that the producer is [`SourceStep::Done`]. The
//! value passed into [`EffectSource::advance()`] is whatever the interpreter computed
//! for the previous instruction, which lets a producer react to what the interpreter did
//! (coroutine style two way communication).
//!
//! Three adapters cover the common producers:
//! - [`IterSource`] for anything that implements [`Iterator`].
//! - [`StreamSource`] for anything that implements [`Stream`], every step is a deferred
//!   value that the [`crate::Pump`] has to await.
//! - [`CoroutineSource`] for a closure that wants to see resume values.
//!
//! [`instruction_lines()`] turns a JSON lines reader (one instruction per line) into a
//! stream for [`StreamSource`].

use std::{fmt::{Debug, Formatter},
          pin::Pin};

use async_stream::stream;
use futures_core::Stream;
use futures_util::{StreamExt, future::BoxFuture};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{EffectError, EffectResult};

/// A deferred instruction. Resolves to [`None`] if the producer finished while the value
/// was pending.
pub type PendingFuture<'a> = BoxFuture<'a, EffectResult<Option<Value>>>;

/// Type alias for a pinned instruction stream that is async safe.
pub type PinnedInstructionStream<'a> =
    Pin<Box<dyn Stream<Item = EffectResult<Value>> + Send + 'a>>;

/// One value produced by a source, possibly not available yet.
pub enum Pending<'a> {
    Ready(Value),
    Deferred(PendingFuture<'a>),
}

impl Debug for Pending<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Pending::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Pending::Deferred(_) => write!(f, "Deferred"),
        }
    }
}

#[derive(Debug)]
pub enum SourceStep<'a> {
    Yielded(Pending<'a>),
    Done,
}

pub trait EffectSource: Send {
    /// Advance the producer by one step. `resume_with` is the return value of the
    /// previous dispatch ([`None`] on the very first step).
    ///
    /// # Errors
    ///
    /// A failing producer returns [`EffectError::Source`] (or any other variant), which
    /// the pump propagates unchanged.
    fn advance(&mut self, resume_with: Option<Value>) -> EffectResult<SourceStep<'_>>;
}

/// Items that a producer can hand over: plain instructions, or results of producing
/// them.
pub trait IntoInstruction {
    /// # Errors
    ///
    /// Whatever error the producer attached to this item.
    fn into_instruction(self) -> EffectResult<Value>;
}

impl IntoInstruction for Value {
    fn into_instruction(self) -> EffectResult<Value> { Ok(self) }
}

impl IntoInstruction for EffectResult<Value> {
    fn into_instruction(self) -> EffectResult<Value> { self }
}

/// Synchronous producer. Resume values are ignored.
#[derive(Debug)]
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator,
{
    pub fn new(it: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: it.into_iter(),
        }
    }
}

impl<I> EffectSource for IterSource<I>
where
    I: Iterator + Send,
    I::Item: IntoInstruction,
{
    fn advance(&mut self, _resume_with: Option<Value>) -> EffectResult<SourceStep<'_>> {
        match self.iter.next() {
            Some(item) => Ok(SourceStep::Yielded(Pending::Ready(item.into_instruction()?))),
            None => Ok(SourceStep::Done),
        }
    }
}

/// Asynchronous producer. Resume values are ignored.
pub struct StreamSource<S> {
    stream: Pin<Box<S>>,
}

impl<S> Debug for StreamSource<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource").finish_non_exhaustive()
    }
}

impl<S> StreamSource<S>
where
    S: Stream,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: Box::pin(stream),
        }
    }
}

impl<S> EffectSource for StreamSource<S>
where
    S: Stream + Send,
    S::Item: IntoInstruction,
{
    fn advance(&mut self, _resume_with: Option<Value>) -> EffectResult<SourceStep<'_>> {
        let mut stream = self.stream.as_mut();
        let it: PendingFuture<'_> = Box::pin(async move {
            match stream.next().await {
                Some(item) => item.into_instruction().map(Some),
                None => Ok(None),
            }
        });
        Ok(SourceStep::Yielded(Pending::Deferred(it)))
    }
}

/// Producer written as a closure that receives the previous dispatch result, and returns
/// the next instruction (or [`None`] when it is done).
pub struct CoroutineSource<F> {
    producer: F,
}

impl<F> Debug for CoroutineSource<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoroutineSource").finish_non_exhaustive()
    }
}

impl<F> CoroutineSource<F>
where
    F: FnMut(Option<Value>) -> EffectResult<Option<Value>>,
{
    pub fn new(producer: F) -> Self { Self { producer } }
}

impl<F> EffectSource for CoroutineSource<F>
where
    F: FnMut(Option<Value>) -> EffectResult<Option<Value>> + Send,
{
    fn advance(&mut self, resume_with: Option<Value>) -> EffectResult<SourceStep<'_>> {
        Ok(match (self.producer)(resume_with)? {
            Some(value) => SourceStep::Yielded(Pending::Ready(value)),
            None => SourceStep::Done,
        })
    }
}

/// Forward to the boxed source, so that strategies can pick a source at runtime.
impl EffectSource for Box<dyn EffectSource + '_> {
    fn advance(&mut self, resume_with: Option<Value>) -> EffectResult<SourceStep<'_>> {
        self.as_mut().advance(resume_with)
    }
}

/// Convenience for producers that fail: `Err(source_error("..."))`.
pub fn source_error(message: impl Into<String>) -> EffectError {
    EffectError::producer(miette::miette!("{}", message.into()))
}

/// Parse one instruction per line from `reader`. Blank lines are skipped. A line that
/// is not valid JSON ends the stream with an [`EffectError::Source`], and a read error
/// ends it with an [`EffectError::Io`].
pub fn instruction_lines<'a, R>(reader: R) -> PinnedInstructionStream<'a>
where
    R: AsyncBufRead + Unpin + Send + 'a,
{
    let it = stream! {
        let mut lines = reader.lines();
        let mut line_number = 0_usize;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    line_number += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Value>(&line) {
                        Ok(instruction) => yield Ok(instruction),
                        Err(err) => {
                            yield Err(source_error(format!("line {line_number}: {err}")));
                            break;
                        }
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    yield Err(EffectError::Io(err));
                    break;
                }
            }
        }
    };
    Box::pin(it)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    async fn resolve(step: SourceStep<'_>) -> Option<Value> {
        match step {
            SourceStep::Yielded(Pending::Ready(value)) => Some(value),
            SourceStep::Yielded(Pending::Deferred(it)) => it.await.unwrap(),
            SourceStep::Done => None,
        }
    }

    #[tokio::test]
    async fn test_iter_source_yields_ready_values_then_done() {
        let mut source = IterSource::new(vec![json!(1), json!(2)]);
        assert!(matches!(
            source.advance(None).unwrap(),
            SourceStep::Yielded(Pending::Ready(_))
        ));
        assert_eq!(resolve(source.advance(None).unwrap()).await, Some(json!(2)));
        assert!(matches!(source.advance(None).unwrap(), SourceStep::Done));
    }

    #[tokio::test]
    async fn test_iter_source_propagates_item_errors() {
        let mut source =
            IterSource::new(vec![Ok(json!(1)), Err(source_error("boom")), Ok(json!(3))]);
        assert_eq!(resolve(source.advance(None).unwrap()).await, Some(json!(1)));
        assert!(matches!(source.advance(None), Err(EffectError::Source(_))));
    }

    #[tokio::test]
    async fn test_stream_source_is_always_deferred() {
        let mut source = StreamSource::new(futures_util::stream::iter(vec![json!("a")]));
        let step = source.advance(None).unwrap();
        assert!(matches!(step, SourceStep::Yielded(Pending::Deferred(_))));
        assert_eq!(resolve(step).await, Some(json!("a")));

        // Exhaustion is only discovered once the pending value resolves.
        let step = source.advance(None).unwrap();
        assert_eq!(resolve(step).await, None);
    }

    #[tokio::test]
    async fn test_coroutine_source_receives_resume_values() {
        let mut seen = vec![];
        {
            let mut count = 0;
            let mut source = CoroutineSource::new(|resume_with| {
                seen.push(resume_with);
                count += 1;
                Ok((count <= 2).then(|| json!(count)))
            });
            resolve(source.advance(None).unwrap()).await;
            resolve(source.advance(Some(json!("first"))).unwrap()).await;
            assert!(matches!(source.advance(None).unwrap(), SourceStep::Done));
        }
        assert_eq!(seen, vec![None, Some(json!("first")), None]);
    }

    #[tokio::test]
    async fn test_instruction_lines_skips_blank_lines_and_stops_on_bad_json() {
        let input: &[u8] = b"{\"a\":1}\n\n  \n[2]\nnot json\n{\"b\":3}\n";
        let items: Vec<_> = instruction_lines(input).collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), &json!({ "a": 1 }));
        assert_eq!(items[1].as_ref().unwrap(), &json!([2]));
        let err = items[2].as_ref().unwrap_err();
        assert!(err.to_string().contains("line 5"), "{err}");
    }

    #[tokio::test]
    async fn test_boxed_source_forwards() {
        let mut source: Box<dyn EffectSource> = Box::new(IterSource::new(vec![json!(7)]));
        assert_eq!(resolve(source.advance(None).unwrap()).await, Some(json!(7)));
    }
}
