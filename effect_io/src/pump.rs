// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Drive an [`EffectSource`] one instruction at a time, awaiting deferred values, and
//! feeding the previous dispatch result back in.

use serde_json::Value;
use tracing::trace;

use crate::{EffectResult, EffectSource, Pending, SourceStep};

#[derive(Debug)]
pub struct Pump<S> {
    source: S,
    pulled: usize,
    done: bool,
}

impl<S> Pump<S>
where
    S: EffectSource,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            pulled: 0,
            done: false,
        }
    }

    /// Number of instructions pulled so far.
    pub fn pulled(&self) -> usize { self.pulled }

    pub fn is_done(&self) -> bool { self.done }

    /// Pull the next instruction.
    ///
    /// Returns `Ok(None)` once the source is exhausted, and keeps returning that.
    ///
    /// # Errors
    ///
    /// A producer failure (either from advancing, or from a deferred value) is returned
    /// unchanged. After that the pump is done.
    pub async fn step(&mut self, resume_with: Option<Value>) -> EffectResult<Option<Value>> {
        if self.done {
            return Ok(None);
        }

        let result = match self.source.advance(resume_with) {
            Ok(SourceStep::Done) => Ok(None),
            Ok(SourceStep::Yielded(Pending::Ready(value))) => Ok(Some(value)),
            Ok(SourceStep::Yielded(Pending::Deferred(it))) => {
                trace!(pulled = self.pulled, "awaiting deferred instruction");
                it.await
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(Some(_)) => self.pulled += 1,
            Ok(None) | Err(_) => self.done = true,
        }

        result
    }
}

/// Pull every instruction from `source`, handing each one to `dispatch`. Whatever
/// `dispatch` returns is passed into the next step of the source.
///
/// Returns the number of dispatched instructions.
///
/// # Errors
///
/// The first error (from the source or from `dispatch`) stops the run, and nothing after
/// it is pulled.
pub async fn drive<S, F>(source: S, mut dispatch: F) -> EffectResult<usize>
where
    S: EffectSource,
    F: FnMut(Value) -> EffectResult<Option<Value>>,
{
    let mut pump = Pump::new(source);
    let mut resume_with = None;
    while let Some(instruction) = pump.step(resume_with.take()).await? {
        resume_with = dispatch(instruction)?;
    }
    Ok(pump.pulled())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{CoroutineSource, EffectError, IterSource, StreamSource, source_error,
                test_fixtures::gen_instruction_stream_with_delay};

    #[tokio::test]
    async fn test_pump_iter_source_to_completion() {
        let mut pump = Pump::new(IterSource::new(vec![json!(1), json!(2)]));
        assert_eq!(pump.step(None).await.unwrap(), Some(json!(1)));
        assert_eq!(pump.step(None).await.unwrap(), Some(json!(2)));
        assert_eq!(pump.step(None).await.unwrap(), None);
        assert!(pump.is_done());
        assert_eq!(pump.step(None).await.unwrap(), None);
        assert_eq!(pump.pulled(), 2);
    }

    #[tokio::test]
    async fn test_pump_awaits_deferred_values_in_order() {
        let source = StreamSource::new(gen_instruction_stream_with_delay(
            vec![json!("a"), json!("b"), json!("c")],
            Duration::from_millis(5),
        ));
        let mut seen = vec![];
        let count = drive(source, |it| {
            seen.push(it);
            Ok(None)
        })
        .await
        .unwrap();

        assert_eq!(count, 3);
        assert_eq!(seen, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn test_drive_feeds_dispatch_result_back_into_source() {
        let mut resumed = vec![];
        {
            let mut remaining = 3;
            let source = CoroutineSource::new(|resume_with| {
                resumed.push(resume_with);
                remaining -= 1;
                Ok((remaining > 0).then(|| json!(remaining)))
            });
            drive(source, |it| Ok(Some(json!({ "echo": it })))).await.unwrap();
        }
        assert_eq!(
            resumed,
            vec![None, Some(json!({ "echo": 2 })), Some(json!({ "echo": 1 }))]
        );
    }

    #[tokio::test]
    async fn test_source_failure_stops_the_run() {
        let source = IterSource::new(vec![
            Ok(json!(1)),
            Err(source_error("producer blew up")),
            Ok(json!(3)),
        ]);
        let mut seen = vec![];
        let result = drive(source, |it| {
            seen.push(it);
            Ok(None)
        })
        .await;

        assert!(matches!(result, Err(EffectError::Source(_))));
        assert_eq!(seen, vec![json!(1)]);
    }

    #[tokio::test]
    async fn test_dispatch_failure_stops_the_run() {
        let mut seen = vec![];
        let result = drive(IterSource::new(vec![json!(1), json!(2)]), |it| {
            seen.push(it);
            Err(EffectError::PopOnEmptyStack)
        })
        .await;

        assert!(matches!(result, Err(EffectError::PopOnEmptyStack)));
        assert_eq!(seen, vec![json!(1)]);
    }

    #[tokio::test]
    async fn test_deferred_failure_marks_pump_done() {
        let mut pump = Pump::new(StreamSource::new(futures_util::stream::iter(vec![
            Err(source_error("late failure")),
            Ok(json!(1)),
        ])));
        assert!(pump.step(None).await.is_err());
        assert!(pump.is_done());
        assert_eq!(pump.step(None).await.unwrap(), None);
    }
}
