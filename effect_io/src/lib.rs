// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_effect_io
//!
//! An interpreter for a lazily produced sequence of *effects*. A producer (called a
//! *strategy*) yields wire instructions, one at a time, and this crate renders them:
//!
//! - `write` puts plain text on one of two channels, primary (`stdout`) or secondary
//!   (`stderr`).
//! - `ansi-push` / `push` opens a new nesting level of terminal styling.
//! - `ansi-pop` / `pop` closes the innermost nesting level.
//!
//! Styling can only enter the output through `ansi-push` and `ansi-pop`. A raw escape
//! byte in a `write` payload aborts the run. Every push must be matched by a pop before
//! the producer is exhausted, otherwise the run fails.
//!
//! # Architecture
//!
//! ```text
//! strategy() ──▶ EffectSource ──▶ Pump ──▶ EffectCore ──▶ EffectSink
//!                 (source)       (pump)    (SpanStack)     │
//!                                                          ├─▶ IoSink ──▶ LineWriter task ──▶ stdout
//!                                                          │              LineWriter task ──▶ stderr
//!                                                          └─▶ PureSink ─▶ Stream<Item = String>
//! ```
//!
//! 1. [`EffectSource`] is a pull interface over the producer. Each pull may return an
//!    instruction right away, or a [`Pending`] future that stands in for one.
//! 2. [`Pump`] advances the source, awaits pending values, and feeds the result of each
//!    dispatch back into the source on the next pull.
//! 3. [`EffectCore`] decodes each instruction into an [`Effect`], and keeps the
//!    persistent [`SpanStack`] that computes the escape sequences for every style
//!    transition.
//! 4. The sink decides where output goes. The IO variant ([`evaluate_io()`]) hands text to
//!    one [`LineWriter`] per stream, and each one flushes whole lines and waits for the
//!    stream to drain when it signals backpressure. The pure variant ([`evaluate_pure()`])
//!    yields the output as an async stream of strings instead.
//!
//! # Example
//!
//! ```no_run
//! use r3bl_effect_io::{Instruction, IoStreams, IterSource, SpanId, evaluate_io};
//!
//! # async fn run() -> miette::Result<()> {
//! let strategy = || {
//!     IterSource::new(vec![
//!         Instruction::ansi_push(&[SpanId::Bold]),
//!         Instruction::write("hello\n", 1),
//!         Instruction::ansi_pop(),
//!     ])
//! };
//! evaluate_io(strategy, IoStreams::stdio()).await?;
//! # Ok(())
//! # }
//! ```

// Enforce strict error handling in production library code only. Tests and examples are
// allowed to use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules (re-exported below to provide clean public API).
pub mod effect;
pub mod error;
pub mod interpreter;
pub mod log;
pub mod miette_setup_global_report_handler;
pub mod pump;
pub mod source;
pub mod stack_alloc_types;
pub mod style;
pub mod test_fixtures;
pub mod writer;

// Re-export.
pub use effect::*;
pub use error::*;
pub use interpreter::*;
pub use log::*;
pub use miette_setup_global_report_handler::*;
pub use pump::*;
pub use source::*;
pub use stack_alloc_types::*;
pub use style::*;
pub use test_fixtures::*;
pub use writer::*;

/// Disambiguate the type of `StdMutex` from stdlib and tokio to avoid conflicts.
pub type StdMutex<T> = std::sync::Mutex<T>;
