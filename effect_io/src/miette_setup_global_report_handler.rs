// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Configure how [miette](https://docs.rs/miette/latest/miette/index.html) displays an
//! [`EffectError`](crate::EffectError) report when `main() -> miette::Result<_>` errors
//! out.
//!
//! The hook registered with [`miette::set_hook`] is lazy. It only runs when a report is
//! actually displayed, so the terminal width is measured at that moment.

use miette::MietteHandlerOpts;
use tracing::debug;

pub const DEFAULT_REPORT_WIDTH: usize = 80;

pub fn setup_default_miette_global_report_handler(issues_url: &'static str) {
    miette::set_hook(Box::new(|_report| {
        let terminal_width = {
            let it = crossterm::terminal::size()
                .map(|(columns, _rows)| columns as usize)
                .unwrap_or(DEFAULT_REPORT_WIDTH);
            debug!("miette::set_hook -> terminal_width: {}", it);
            it
        };
        Box::new(
            MietteHandlerOpts::new()
                .width(terminal_width)
                .wrap_lines(true)
                .terminal_links(true)
                .unicode(true)
                .with_cause_chain()
                .footer(issues_url.to_string())
                .build(),
        )
    }))
    .ok();
}
