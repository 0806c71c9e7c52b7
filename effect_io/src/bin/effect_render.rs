// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Render a JSON lines stream of effect instructions to the terminal.
//!
//! ```text
//! $ printf '%s\n' \
//!     '{"type":"Effect","value":{"type":"EmbeddedExpression","value":{"verb":"ansi-push","value":{"type":"EmbeddedExpression","value":{"spans":["bold"]}}}}}' \
//!     '{"type":"Effect","value":{"type":"EmbeddedExpression","value":{"verb":"write","value":{"type":"EmbeddedExpression","value":{"text":"hi\n"}}}}}' \
//!     '{"type":"Effect","value":{"type":"EmbeddedExpression","value":{"verb":"ansi-pop"}}}' \
//!   | effect_render
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum, builder::RangedU64ValueParser};
use crossterm::tty::IsTty;
use miette::IntoDiagnostic;
use r3bl_effect_io::{AsyncWriteStream, DEFAULT_HIGH_WATER_MARK, DisplayPreference,
                     EvaluateOptions, IoStreams, NoColorStyleTable, StreamSource,
                     TracingConfig, WriterConfig, evaluate_io_with, instruction_lines,
                     render_pure_to_stream, setup_default_miette_global_report_handler,
                     try_initialize_logging_global};
use tokio::io::{AsyncBufRead, BufReader};

const ISSUES_URL: &str = "https://github.com/r3bl-org/r3bl-open-core/issues/new";

#[derive(Debug, Parser)]
#[command(bin_name = "effect_render")]
#[command(about = "Render a JSON lines stream of write / ansi-push / ansi-pop effects")]
#[command(version)]
#[command(next_line_help = true)]
pub struct CLIArg {
    /// JSON lines file with one instruction per line. Reads `stdin` when omitted.
    pub input: Option<PathBuf>,

    #[arg(
        long,
        short = 'p',
        help = "Render everything to stdout as a single stream, ignoring stream selectors"
    )]
    pub pure: bool,

    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, help = "When to emit ANSI styling")]
    pub color: ColorWhen,

    #[arg(
        long,
        default_value_t = DEFAULT_HIGH_WATER_MARK,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
        help = "Buffered bytes per stream before waiting for the terminal to drain"
    )]
    pub high_water_mark: usize,

    #[arg(long, short = 'l', help = "Enable logging at this level (eg: debug, trace)")]
    pub log_level: Option<tracing::Level>,

    #[arg(long, help = "Log to this file instead of stderr (needs --log-level)")]
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorWhen {
    /// Only if stdout is a terminal.
    Auto,
    Always,
    Never,
}

impl ColorWhen {
    fn use_color(self) -> bool {
        match self {
            ColorWhen::Auto => std::io::stdout().is_tty(),
            ColorWhen::Always => true,
            ColorWhen::Never => false,
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    setup_default_miette_global_report_handler(ISSUES_URL);

    let cli_arg = CLIArg::parse();

    if let Some(level) = cli_arg.log_level {
        let writer_config = match &cli_arg.log_file {
            Some(path) => WriterConfig::File(path.clone()),
            None => WriterConfig::Display(DisplayPreference::Stderr),
        };
        try_initialize_logging_global(TracingConfig {
            writer_config,
            level_filter: level.into(),
        })?;
        // % is Display, ? is Debug.
        tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg);
    }

    run(cli_arg).await
}

async fn run(cli_arg: CLIArg) -> miette::Result<()> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &cli_arg.input {
        Some(path) => Box::new(BufReader::new(
            tokio::fs::File::open(path).await.into_diagnostic()?,
        )),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let strategy = || StreamSource::new(instruction_lines(reader));

    let options = if cli_arg.color.use_color() {
        EvaluateOptions::default()
    } else {
        EvaluateOptions::default().with_style_table(NoColorStyleTable)
    };

    if cli_arg.pure {
        let mut stdout = AsyncWriteStream::with_high_water_mark(
            tokio::io::stdout(),
            cli_arg.high_water_mark,
        );
        render_pure_to_stream(strategy, options, &mut stdout).await?;
    } else {
        let streams = IoStreams::stdio_with_high_water_mark(cli_arg.high_water_mark);
        evaluate_io_with(strategy, streams, options).await?;
    }

    tracing::debug!(message = "Done rendering");
    Ok(())
}
