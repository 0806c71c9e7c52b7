// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

use async_stream::stream;
use serde_json::Value;

use crate::PinnedInstructionStream;

/// Generate an async stream of instructions, for use with [`crate::StreamSource`].
pub fn gen_instruction_stream(
    generator_vec: Vec<Value>,
) -> PinnedInstructionStream<'static> {
    gen_instruction_stream_with_delay(generator_vec, Duration::ZERO)
}

/// Same as [`gen_instruction_stream()`], but sleeps for `delay` before each item, so
/// every pull from the source is actually pending for a while.
pub fn gen_instruction_stream_with_delay(
    generator_vec: Vec<Value>,
    delay: Duration,
) -> PinnedInstructionStream<'static> {
    let it = stream! {
        for item in generator_vec {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            yield Ok(item);
        }
    };
    Box::pin(it)
}
