// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Logging for the interpreter, built on [`tracing`]. Logging is disabled unless one of
//! [`try_initialize_logging_global()`] or [`try_initialize_logging_thread_local()`] is
//! called with a level other than [`tracing_core::LevelFilter::OFF`].

// Attach sources.
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use rolling_file_appender_impl::*;
pub use tracing_config::*;
pub use tracing_init::*;
