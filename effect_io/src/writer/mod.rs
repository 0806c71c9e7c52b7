// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod line_buffered;
pub mod line_writer;
pub mod output_stream;

// Re-export.
pub use line_buffered::*;
pub use line_writer::*;
pub use output_stream::*;
