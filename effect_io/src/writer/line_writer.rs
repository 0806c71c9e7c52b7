// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A spawned task that owns one [`OutputStream`] and writes the text it is sent, line by
//! line, in order.
//!
//! The sender side ([`LineWriter`]) never blocks. Each [`WriterSignal::Text`] is queued
//! on an unbounded channel, and the task works through the queue with
//! [`write_lines_to_stream()`], waiting for the stream to drain whenever it applies
//! backpressure. Since every stream gets its own task, a slow stream never holds up
//! writes to the other one.
//!
//! When the queue runs empty the task flushes the stream, so output is not left sitting
//! in a buffer while the producer is idle.

use std::io;

use tokio::{spawn,
            sync::{mpsc, oneshot},
            task::JoinHandle};
use tracing::{trace, warn};

use crate::{BoxedOutputStream, write_lines_to_stream};

/// Signals that can be sent to the writer task.
#[derive(Debug)]
pub enum WriterSignal {
    Text(String),
    /// Reply once everything queued before this signal has been written and flushed.
    Flush(oneshot::Sender<io::Result<()>>),
}

#[derive(Debug)]
pub struct LineWriter {
    label: &'static str,
    sender: mpsc::UnboundedSender<WriterSignal>,
    join_handle: JoinHandle<io::Result<()>>,
}

impl LineWriter {
    /// Spawn the writer task. `label` only shows up in log output.
    pub fn spawn(label: &'static str, stream: BoxedOutputStream) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let join_handle = spawn_task_to_write_lines(label, receiver, stream);
        Self {
            label,
            sender,
            join_handle,
        }
    }

    /// Queue `text` for writing. Empty text is dropped.
    ///
    /// If the task already stopped (because the stream failed), the text is discarded
    /// and the failure is reported by [`Self::shutdown()`].
    pub fn send(&self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if self.sender.send(WriterSignal::Text(text)).is_err() {
            warn!(writer = self.label, "writer task stopped, discarding text");
        }
    }

    /// Wait until everything sent so far has been written and flushed.
    ///
    /// # Errors
    ///
    /// Returns the stream error if the task stopped.
    pub async fn flush(&self) -> io::Result<()> {
        let (reply_sender, reply_receiver) = oneshot::channel();
        self.sender
            .send(WriterSignal::Flush(reply_sender))
            .map_err(|_| writer_stopped(self.label))?;
        reply_receiver.await.map_err(|_| writer_stopped(self.label))?
    }

    /// Close the channel and wait for the task to write out everything that is queued.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream produced, or an error if the task panicked.
    pub async fn shutdown(self) -> io::Result<()> {
        let Self {
            label,
            sender,
            join_handle,
        } = self;
        drop(sender);
        let result = join_handle.await.map_err(io::Error::other)?;
        trace!(writer = label, ok = result.is_ok(), "writer task finished");
        result
    }
}

fn writer_stopped(label: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, format!("{label} writer task has stopped"))
}

/// - Receiver end of the channel, which does the actual writing to the stream.
/// - The sender end of the channel is in [`LineWriter`].
fn spawn_task_to_write_lines(
    label: &'static str,
    /* Move */ mut receiver: mpsc::UnboundedReceiver<WriterSignal>,
    /* Move */ mut stream: BoxedOutputStream,
) -> JoinHandle<io::Result<()>> {
    spawn(async move {
        while let Some(signal) = receiver.recv().await {
            match signal {
                WriterSignal::Text(text) => {
                    if let Err(err) = write_lines_to_stream(&text, stream.as_mut()).await {
                        warn!(writer = label, %err, "write failed");
                        return Err(err);
                    }
                    if receiver.is_empty() {
                        stream.flush().await?;
                    }
                }
                WriterSignal::Flush(reply_sender) => {
                    let result = stream.flush().await;
                    let failed = result.as_ref().err().map(|err| err.kind());
                    // The caller may have gone away, that's fine.
                    reply_sender.send(result).ok();
                    if let Some(kind) = failed {
                        return Err(io::Error::new(kind, format!("{label} flush failed")));
                    }
                }
            }
        }
        stream.flush().await
    })
}
