// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io,
          sync::{Arc, MutexGuard}};

use futures_util::future::BoxFuture;
use strip_ansi_escapes::strip;
use tokio::sync::Notify;

use crate::{OutputStream, StdMutex};

#[derive(Debug, Default)]
struct StreamMockState {
    buffer: Vec<u8>,
    writes: Vec<String>,
    drain_count: usize,
    flush_count: usize,
}

/// In-memory [`OutputStream`] that records every write call.
///
/// You can safely clone this struct, all clones share the same recorded state. Hand one
/// clone to the code under test and keep the other to inspect what was written.
///
/// Backpressure can be simulated:
/// - [`Self::with_backpressure_every()`] makes every n-th write return `false`.
/// - [`Self::with_gated_drain()`] makes [`OutputStream::drained()`] wait until the test
///   calls [`Self::release_drain()`].
/// - [`Self::with_failing_drain()`] makes [`OutputStream::drained()`] fail.
#[derive(Clone, Debug, Default)]
pub struct StreamMock {
    state: Arc<StdMutex<StreamMockState>>,
    backpressure_every: Option<usize>,
    drain_gate: Option<Arc<Notify>>,
    fail_drain: bool,
}

impl StreamMock {
    pub fn new() -> Self { Self::default() }

    pub fn with_backpressure_every(mut self, n: usize) -> Self {
        self.backpressure_every = Some(n.max(1));
        self
    }

    pub fn with_gated_drain(mut self) -> Self {
        self.drain_gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn with_failing_drain(mut self) -> Self {
        self.fail_drain = true;
        self
    }

    /// Let one pending (or the next) drain complete.
    pub fn release_drain(&self) {
        if let Some(gate) = &self.drain_gate {
            gate.notify_one();
        }
    }

    fn state(&self) -> MutexGuard<'_, StreamMockState> { self.state.lock().unwrap() }

    pub fn get_writes(&self) -> Vec<String> { self.state().writes.clone() }

    pub fn get_drain_count(&self) -> usize { self.state().drain_count }

    pub fn get_flush_count(&self) -> usize { self.state().flush_count }

    pub fn get_copy_of_buffer_as_string(&self) -> String {
        String::from_utf8(self.state().buffer.clone()).expect("utf8")
    }

    pub fn get_copy_of_buffer_as_string_strip_ansi(&self) -> String {
        String::from_utf8(strip(&self.state().buffer)).expect("utf8")
    }
}

impl OutputStream for StreamMock {
    fn write(&mut self, chunk: &str) -> bool {
        let mut state = self.state();
        state.buffer.extend_from_slice(chunk.as_bytes());
        state.writes.push(chunk.to_string());
        match self.backpressure_every {
            Some(n) => !state.writes.len().is_multiple_of(n),
            None => true,
        }
    }

    fn drained(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move {
            if let Some(gate) = &self.drain_gate {
                gate.notified().await;
            }
            self.state().drain_count += 1;
            if self.fail_drain {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock drain failed"));
            }
            Ok(())
        })
    }

    fn flush(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move {
            self.state().flush_count += 1;
            Ok(())
        })
    }
}
