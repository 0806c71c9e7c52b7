// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Mocks for dependency injection in tests: an in-memory [`crate::OutputStream`], and
//! async instruction streams with optional delays.

// Attach sources.
pub mod instruction_stream_mock;
pub mod stream_mock;

// Re-export.
pub use instruction_stream_mock::*;
pub use stream_mock::*;
