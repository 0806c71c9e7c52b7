// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The IO interpreter. Renders effects onto two real output streams.
//!
//! Each stream is owned by its own [`LineWriter`] task. Text is line buffered, and each
//! stream applies its own backpressure without holding up the other one.
//!
//! When consecutive writes switch from one channel to the other, a single `'\n'` is
//! prepended to the new text (unless it already starts with one). That way output from
//! the two channels never shares a line when both end up on the same terminal. Escape
//! bursts from push / pop always go to the primary stream and don't count as a switch.

use std::io;

use tracing::debug;

use crate::{AsyncWriteStream, BoxedOutputStream, Channel, DEFAULT_HIGH_WATER_MARK,
            EffectCore, EffectResult, EffectSink, EffectSource, EvaluateOptions,
            LineWriter, OutputStream, drive};

/// The pair of output streams that the IO interpreter writes to.
#[derive(Debug)]
pub struct IoStreams {
    pub primary: BoxedOutputStream,
    pub secondary: BoxedOutputStream,
}

impl IoStreams {
    pub fn new(
        primary: impl OutputStream + 'static,
        secondary: impl OutputStream + 'static,
    ) -> Self {
        Self {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        }
    }

    /// `stdout` and `stderr`.
    pub fn stdio() -> Self { Self::stdio_with_high_water_mark(DEFAULT_HIGH_WATER_MARK) }

    pub fn stdio_with_high_water_mark(high_water_mark: usize) -> Self {
        Self::new(
            AsyncWriteStream::with_high_water_mark(tokio::io::stdout(), high_water_mark),
            AsyncWriteStream::with_high_water_mark(tokio::io::stderr(), high_water_mark),
        )
    }
}

/// [`EffectSink`] that hands text to one [`LineWriter`] per channel.
#[derive(Debug)]
pub struct IoSink {
    active_channel: Option<Channel>,
    primary: LineWriter,
    secondary: LineWriter,
}

impl IoSink {
    /// Spawns the writer tasks, so this must be called from inside a tokio runtime.
    pub fn new(streams: IoStreams) -> Self {
        let IoStreams { primary, secondary } = streams;
        Self {
            active_channel: None,
            primary: LineWriter::spawn("primary", primary),
            secondary: LineWriter::spawn("secondary", secondary),
        }
    }

    pub fn active_channel(&self) -> Option<Channel> { self.active_channel }

    fn writer(&self, channel: Channel) -> &LineWriter {
        match channel {
            Channel::Primary => &self.primary,
            Channel::Secondary => &self.secondary,
        }
    }

    /// Wait for both writer tasks to write out everything they accepted.
    ///
    /// # Errors
    ///
    /// The error of the primary writer if both failed, otherwise whichever one failed.
    pub async fn shutdown(self) -> io::Result<()> {
        let (primary, secondary) =
            tokio::join!(self.primary.shutdown(), self.secondary.shutdown());
        primary.and(secondary)
    }
}

impl EffectSink for IoSink {
    fn write_text(&mut self, channel: Channel, text: String) {
        let text = match self.active_channel {
            Some(active) if active != channel && !text.starts_with('\n') => {
                debug!(from = %active, to = %channel, "channel switch, forcing newline");
                format!("\n{text}")
            }
            _ => text,
        };
        self.active_channel = Some(channel);
        self.writer(channel).send(text);
    }

    fn write_control(&mut self, escapes: String) { self.primary.send(escapes); }
}

/// Run `strategy` against `streams` with the default [`EvaluateOptions`].
///
/// # Errors
///
/// See [`evaluate_io_with()`].
pub async fn evaluate_io<F, S>(strategy: F, streams: IoStreams) -> EffectResult<()>
where
    F: FnOnce() -> S,
    S: EffectSource,
{
    evaluate_io_with(strategy, streams, EvaluateOptions::default()).await
}

/// Call `strategy` to get the producer, and render every effect it yields onto
/// `streams`. Resolves once the producer is exhausted and all output has been handed to
/// the streams.
///
/// # Errors
///
/// - Any protocol error, or producer error, stops the run. Output accepted before the
///   failure is still written out.
/// - [`crate::EffectError::UnbalancedStack`] if the producer finished with open spans.
/// - [`crate::EffectError::Io`] if a stream failed (only reported if the run itself
///   succeeded).
pub async fn evaluate_io_with<F, S>(
    strategy: F,
    streams: IoStreams,
    options: EvaluateOptions,
) -> EffectResult<()>
where
    F: FnOnce() -> S,
    S: EffectSource,
{
    let mut sink = IoSink::new(streams);
    let mut core = EffectCore::new(options.style_table);

    let run_result = drive(strategy(), |instruction| {
        core.dispatch_instruction(&instruction, &mut sink)
    })
    .await
    .and_then(|count| {
        debug!(count, "producer exhausted");
        core.finish()
    });

    let shutdown_result = sink.shutdown().await;
    run_result?;
    shutdown_result?;
    Ok(())
}
