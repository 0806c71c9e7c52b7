// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Line buffered writing to an [`OutputStream`].
//!
//! Text is cut at every `'\n'` (the newline stays with its line) and each line is handed
//! to the stream in its own [`OutputStream::write()`] call. Text after the last newline
//! is written as a final partial line, so nothing is held back. Whenever the stream
//! signals backpressure the next write waits for [`OutputStream::drained()`].

use std::{io, pin::pin};

use futures_core::Stream;
use futures_util::StreamExt;
use tracing::trace;

use crate::{EffectResult, OutputStream};

/// Iterate over the lines of `text`, each one including its trailing `'\n'`. The last
/// item has no newline if `text` doesn't end with one. Empty text yields nothing.
pub fn split_lines_inclusive(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}

async fn write_chunk(chunk: &str, stream: &mut dyn OutputStream) -> io::Result<()> {
    if !stream.write(chunk) {
        trace!(len = chunk.len(), "backpressure, waiting for drain");
        stream.drained().await?;
    }
    Ok(())
}

/// Write `text` to `stream`, one write per line.
///
/// # Errors
///
/// Returns the error from [`OutputStream::drained()`], if the device fails.
pub async fn write_lines_to_stream(text: &str, stream: &mut dyn OutputStream) -> io::Result<()> {
    for line in split_lines_inclusive(text) {
        write_chunk(line, stream).await?;
    }
    Ok(())
}

/// Feed a stream of text chunks to `stream`. Lines may span chunks. They are reassembled
/// and written whole, and the partial line at the very end is written last.
///
/// # Errors
///
/// An error item from `chunks` stops the pipe. Whatever partial line was pending is
/// written out first, then the error is returned. A device error is returned as
/// [`crate::EffectError::Io`].
pub async fn pipe_lines_to_stream(
    chunks: impl Stream<Item = EffectResult<String>>,
    stream: &mut dyn OutputStream,
) -> EffectResult<()> {
    let mut chunks = pin!(chunks);
    let mut pending_line = String::new();

    while let Some(chunk) = chunks.next().await {
        let chunk = match chunk {
            Ok(it) => it,
            Err(err) => {
                write_partial_line(&mut pending_line, stream).await?;
                return Err(err);
            }
        };

        for piece in split_lines_inclusive(&chunk) {
            pending_line.push_str(piece);
            if pending_line.ends_with('\n') {
                write_chunk(&pending_line, stream).await?;
                pending_line.clear();
            }
        }
    }

    write_partial_line(&mut pending_line, stream).await?;
    Ok(())
}

async fn write_partial_line(
    pending_line: &mut String,
    stream: &mut dyn OutputStream,
) -> io::Result<()> {
    if !pending_line.is_empty() {
        write_chunk(pending_line, stream).await?;
        pending_line.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{EffectError, source_error, test_fixtures::StreamMock};

    #[tokio::test]
    async fn test_write_lines_one_write_per_line() {
        let cases: [(&str, &[&str]); 5] = [
            ("", &[]),
            ("abc", &["abc"]),
            ("a\nb\n", &["a\n", "b\n"]),
            ("a\nb", &["a\n", "b"]),
            ("\n\n", &["\n", "\n"]),
        ];
        for (text, expected) in cases {
            let mock = StreamMock::new();
            let mut stream = mock.clone();
            write_lines_to_stream(text, &mut stream).await.unwrap();
            assert_eq!(mock.get_writes(), expected, "{text:?}");
            assert_eq!(mock.get_copy_of_buffer_as_string(), text);
        }
    }

    #[tokio::test]
    async fn test_write_lines_waits_for_drain_on_backpressure() {
        let mock = StreamMock::new().with_backpressure_every(2);
        let mut stream = mock.clone();
        write_lines_to_stream("1\n2\n3\n4\n5", &mut stream).await.unwrap();

        assert_eq!(mock.get_writes(), vec!["1\n", "2\n", "3\n", "4\n", "5"]);
        assert_eq!(mock.get_drain_count(), 2);
    }

    #[tokio::test]
    async fn test_pipe_reassembles_lines_across_chunks() {
        let mock = StreamMock::new();
        let mut stream = mock.clone();
        let chunks = futures_util::stream::iter(vec![
            Ok("he".to_string()),
            Ok("llo\nwor".to_string()),
            Ok("ld\n\nend".to_string()),
        ]);
        pipe_lines_to_stream(chunks, &mut stream).await.unwrap();

        assert_eq!(mock.get_writes(), vec!["hello\n", "world\n", "\n", "end"]);
    }

    #[tokio::test]
    async fn test_pipe_writes_pending_partial_line_before_error() {
        let mock = StreamMock::new();
        let mut stream = mock.clone();
        let chunks = futures_util::stream::iter(vec![
            Ok("done\npart".to_string()),
            Err(source_error("gave up")),
            Ok("never\n".to_string()),
        ]);
        let result = pipe_lines_to_stream(chunks, &mut stream).await;

        assert!(matches!(result, Err(EffectError::Source(_))));
        assert_eq!(mock.get_writes(), vec!["done\n", "part"]);
    }
}
