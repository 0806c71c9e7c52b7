// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The write side of a byte stream, with backpressure.
//!
//! [`OutputStream::write()`] always accepts the chunk, and its return value says whether
//! the caller may keep writing. Once it returns `false`, the caller should await
//! [`OutputStream::drained()`] before writing more.

use std::{fmt::Debug, io};

use futures_util::future::BoxFuture;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Default number of buffered bytes after which [`AsyncWriteStream`] asks the caller to
/// wait for a drain.
pub const DEFAULT_HIGH_WATER_MARK: usize = 16 * 1024;

pub trait OutputStream: Debug + Send {
    /// Accept `chunk`. Returns `false` if the stream wants the caller to await
    /// [`Self::drained()`] before the next write.
    fn write(&mut self, chunk: &str) -> bool;

    /// Resolves once the stream can accept more writes.
    fn drained(&mut self) -> BoxFuture<'_, io::Result<()>>;

    /// Push everything accepted so far down to the underlying device.
    fn flush(&mut self) -> BoxFuture<'_, io::Result<()>>;
}

/// Type alias for an output stream that can be handed to a spawned task.
pub type BoxedOutputStream = Box<dyn OutputStream>;

/// Adapts any [`AsyncWrite`] (eg: [`tokio::io::stdout()`]) into an [`OutputStream`].
///
/// Writes accumulate in an in-memory buffer. Once the buffer reaches the high water mark
/// [`OutputStream::write()`] returns `false`, and [`OutputStream::drained()`] hands the
/// whole buffer to the device.
#[derive(Debug)]
pub struct AsyncWriteStream<W> {
    inner: W,
    buffer: Vec<u8>,
    high_water_mark: usize,
}

impl<W> AsyncWriteStream<W>
where
    W: AsyncWrite + Unpin + Send + Debug,
{
    pub fn new(inner: W) -> Self { Self::with_high_water_mark(inner, DEFAULT_HIGH_WATER_MARK) }

    /// `high_water_mark` is clamped to at least one byte. Only up to
    /// [`DEFAULT_HIGH_WATER_MARK`] bytes are reserved up front, the buffer grows past
    /// that on demand.
    pub fn with_high_water_mark(inner: W, high_water_mark: usize) -> Self {
        let high_water_mark = high_water_mark.max(1);
        Self {
            inner,
            buffer: Vec::with_capacity(high_water_mark.min(DEFAULT_HIGH_WATER_MARK)),
            high_water_mark,
        }
    }

    pub fn buffered_len(&self) -> usize { self.buffer.len() }

    pub fn into_inner(self) -> W { self.inner }

    async fn write_out_buffer(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.inner.write_all(&self.buffer).await?;
            self.buffer.clear();
        }
        self.inner.flush().await
    }
}

impl<W> OutputStream for AsyncWriteStream<W>
where
    W: AsyncWrite + Unpin + Send + Debug,
{
    fn write(&mut self, chunk: &str) -> bool {
        self.buffer.extend_from_slice(chunk.as_bytes());
        self.buffer.len() < self.high_water_mark
    }

    fn drained(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(self.write_out_buffer())
    }

    fn flush(&mut self) -> BoxFuture<'_, io::Result<()>> { Box::pin(self.write_out_buffer()) }
}
