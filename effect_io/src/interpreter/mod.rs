// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod effect_core;
pub mod io_interpreter;
pub mod pure_interpreter;

// Re-export.
pub use effect_core::*;
pub use io_interpreter::*;
pub use pure_interpreter::*;
