// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use smallstr::SmallString;
use smallvec::SmallVec;

pub mod sizing {
    /// Most escape sequences and span names fit in here without spilling to the heap.
    pub const DEFAULT_STRING_STORAGE_SIZE: usize = 16;

    /// Frames rarely carry more than a handful of spans (eg: bold + a color).
    pub const DEFAULT_SPAN_LIST_SIZE: usize = 4;
}

/// Stack allocated string that spills to the heap once it grows past
/// [`sizing::DEFAULT_STRING_STORAGE_SIZE`].
pub type InlineString = SmallString<[u8; sizing::DEFAULT_STRING_STORAGE_SIZE]>;

/// Stack allocated vec that spills to the heap once it grows past
/// [`sizing::DEFAULT_SPAN_LIST_SIZE`].
pub type InlineVec<T> = SmallVec<[T; sizing::DEFAULT_SPAN_LIST_SIZE]>;
