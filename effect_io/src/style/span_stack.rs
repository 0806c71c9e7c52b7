// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Persistent stack of span frames.
//!
//! Terminal styling does not nest: once `bold` and `red` are on, there is no way to say
//! "go back to the previous state". So every transition explicitly closes the spans that
//! are currently visible and then reopens the spans that should be visible next. This is
//! why both [`SpanStack::push()`] and [`SpanStack::pop()`] can produce two bursts of
//! escapes (close, then open), captured in a [`StyleTransition`].
//!
//! The stack is immutable. Pushing returns a new stack whose tail *is* the old stack
//! (shared via [`Arc`], never copied), and popping returns the tail. Cloning a stack is
//! O(1).

use std::sync::Arc;

use crate::{EffectError, EffectResult, InlineVec, SpanId, StyleTable};

/// The spans of one frame, in the order they were pushed.
pub type SpanList = InlineVec<SpanId>;

/// One nesting level of styling. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SpanFrame {
    pub spans: SpanList,
}

impl SpanFrame {
    pub fn has_spans(&self) -> bool { !self.spans.is_empty() }

    /// Open strings, in frame order.
    pub fn render_open(&self, table: &dyn StyleTable) -> String {
        self.spans
            .iter()
            .map(|span| table.lookup(*span).open)
            .fold(String::new(), |mut acc, it| {
                acc.push_str(&it);
                acc
            })
    }

    /// Close strings, in *reverse* frame order, so the innermost span is exited first.
    pub fn render_close(&self, table: &dyn StyleTable) -> String {
        self.spans
            .iter()
            .rev()
            .map(|span| table.lookup(*span).close)
            .fold(String::new(), |mut acc, it| {
                acc.push_str(&it);
                acc
            })
    }
}

/// The escape bursts produced by one push or pop, in emission order. A burst that
/// renders to an empty string is [`None`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StyleTransition {
    pub close: Option<String>,
    pub open: Option<String>,
}

impl StyleTransition {
    /// Close burst first, then open burst.
    pub fn into_bursts(self) -> impl Iterator<Item = String> {
        self.close.into_iter().chain(self.open)
    }
}

fn non_empty(it: String) -> Option<String> { if it.is_empty() { None } else { Some(it) } }

#[derive(Debug)]
struct SpanStackNode {
    frame: SpanFrame,
    tail: SpanStack,
    size: usize,
}

#[derive(Clone, Debug, Default)]
pub struct SpanStack {
    head: Option<Arc<SpanStackNode>>,
}

impl SpanStack {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.head.as_ref().map_or(0, |node| node.size) }

    pub fn is_empty(&self) -> bool { self.head.is_none() }

    pub fn top(&self) -> Option<&SpanFrame> { self.head.as_ref().map(|node| &node.frame) }

    /// `true` if both stacks are the very same allocation (or both empty).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(lhs), Some(rhs)) => Arc::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        }
    }

    /// Push a new frame.
    ///
    /// - When `spans` is [`None`] or empty, the top frame's spans are reused (a style
    ///   echo). On an empty stack that is an empty frame.
    /// - The close burst exits the current top frame (if it has spans).
    /// - The open burst enters the new frame (if it has spans).
    pub fn push(
        &self,
        spans: Option<SpanList>,
        table: &dyn StyleTable,
    ) -> (SpanStack, StyleTransition) {
        let spans = match spans {
            Some(spans) if !spans.is_empty() => spans,
            _ => self.top().map(|frame| frame.spans.clone()).unwrap_or_default(),
        };

        let close = self
            .top()
            .filter(|frame| frame.has_spans())
            .and_then(|frame| non_empty(frame.render_close(table)));

        let frame = SpanFrame { spans };
        let open = if frame.has_spans() {
            non_empty(frame.render_open(table))
        } else {
            None
        };

        let new_stack = SpanStack {
            head: Some(Arc::new(SpanStackNode {
                frame,
                tail: self.clone(),
                size: self.len() + 1,
            })),
        };

        (new_stack, StyleTransition { close, open })
    }

    /// Pop the top frame.
    ///
    /// - The close burst exits the removed frame (if it has spans).
    /// - The open burst re-enters the enclosing frame (if there is one with spans).
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::PopOnEmptyStack`] if there is nothing to pop.
    pub fn pop(&self, table: &dyn StyleTable) -> EffectResult<(SpanStack, StyleTransition)> {
        let Some(node) = self.head.as_ref() else {
            return Err(EffectError::PopOnEmptyStack);
        };

        let close = if node.frame.has_spans() {
            non_empty(node.frame.render_close(table))
        } else {
            None
        };

        let new_stack = node.tail.clone();

        let open = new_stack
            .top()
            .filter(|frame| frame.has_spans())
            .and_then(|frame| non_empty(frame.render_open(table)));

        Ok((new_stack, StyleTransition { close, open }))
    }
}
