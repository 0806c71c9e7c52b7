// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing::subscriber::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, registry::LookupSpan};

use crate::{DisplayPreference, TracingConfig, WriterConfig, rolling_file_appender_impl};

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
#[macro_export]
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_target(false)
    };
}

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Returns the layers, without installing them.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_create_layers(
    tracing_config: TracingConfig,
) -> miette::Result<Option<Vec<Box<DynLayer<tracing_subscriber::Registry>>>>> {
    let level_filter = tracing_config.get_level_filter();
    let writer_config = tracing_config.get_writer_config();

    let mut layers: Vec<Box<DynLayer<tracing_subscriber::Registry>>> =
        vec![Box::new(level_filter)];

    if let Some(layer) = try_create_display_layer(level_filter, writer_config.clone())? {
        layers.push(layer);
    }

    if let Some(layer) = try_create_file_layer(level_filter, writer_config)? {
        layers.push(layer);
    }

    Ok(Some(layers))
}

/// Erases the concrete type of the writer, and returns a boxed layer.
///
/// # Errors
///
/// Never, the signature matches [`try_create_file_layer()`].
#[allow(clippy::unnecessary_wraps)]
pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!();

    Ok(match writer_config {
        WriterConfig::DisplayAndFile(display_pref, _)
        | WriterConfig::Display(display_pref) => match display_pref {
            DisplayPreference::Stdout => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stdout)
                    .with_filter(level_filter),
            )),
            DisplayPreference::Stderr => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stderr)
                    .with_filter(level_filter),
            )),
        },
        WriterConfig::None | WriterConfig::File(_) => None,
    })
}

/// Erases the concrete type of the writer, and returns a boxed layer. Log files never
/// carry ANSI colors.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!().with_ansi(false);

    Ok(match writer_config {
        WriterConfig::DisplayAndFile(_, log_file_path)
        | WriterConfig::File(log_file_path) => {
            let file = rolling_file_appender_impl::try_create(log_file_path.as_str())?;
            Some(Box::new(
                fmt_layer.with_writer(file).with_filter(level_filter),
            ))
        }
        WriterConfig::None | WriterConfig::Display(_) => None,
    })
}

/// Install a global subscriber. Logging is **disabled** when the level filter is
/// [`LevelFilter::OFF`].
///
/// # Errors
///
/// See [`TracingConfig::install_global()`].
pub fn try_initialize_logging_global(options: impl Into<TracingConfig>) -> miette::Result<()> {
    let it: TracingConfig = options.into();

    if it.get_level_filter() == LevelFilter::OFF {
        return Ok(());
    }

    it.install_global()
}

/// Install a subscriber for the current thread. Returns [`None`] (and installs nothing)
/// when the level filter is [`LevelFilter::OFF`].
///
/// # Errors
///
/// See [`TracingConfig::install_thread_local()`].
pub fn try_initialize_logging_thread_local(
    options: impl Into<TracingConfig>,
) -> miette::Result<Option<DefaultGuard>> {
    let it: TracingConfig = options.into();

    if it.get_level_filter() == LevelFilter::OFF {
        return Ok(None);
    }

    it.install_thread_local().map(Some)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    use super::*;
    use crate::{EffectCore, EvaluateOptions, Instruction, IoSink, IoStreams, SpanId,
                test_fixtures::StreamMock};

    #[test]
    fn test_try_create_display_layer() {
        let layer: Option<Box<DynLayer<tracing_subscriber::Registry>>> =
            try_create_display_layer(
                LevelFilter::DEBUG,
                WriterConfig::Display(DisplayPreference::Stderr),
            )
            .unwrap();
        assert!(layer.is_some());

        let layer: Option<Box<DynLayer<tracing_subscriber::Registry>>> =
            try_create_display_layer(LevelFilter::DEBUG, WriterConfig::File("x".into()))
                .unwrap();
        assert!(layer.is_none());
    }

    #[test]
    fn test_try_create_both_layers() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("both.log");
        let file_path = file_path.to_str().unwrap().to_string();

        let tracing_config = TracingConfig {
            writer_config: WriterConfig::DisplayAndFile(
                DisplayPreference::Stderr,
                file_path.clone(),
            ),
            level_filter: LevelFilter::DEBUG,
        };

        let layers = try_create_layers(tracing_config).unwrap().unwrap();
        assert_eq!(layers.len(), 3);
        assert!(std::path::Path::new(&file_path).exists());
    }

    #[test]
    fn test_logging_off_installs_nothing() {
        let guard = try_initialize_logging_thread_local(LevelFilter::OFF).unwrap();
        assert!(guard.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_dispatch_is_logged_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("dispatch.log");
        let file_path_str = file_path.to_str().unwrap().to_string();

        let config = TracingConfig {
            writer_config: WriterConfig::File(file_path_str),
            level_filter: LevelFilter::DEBUG,
        };
        let guard = try_initialize_logging_thread_local(config).unwrap();

        {
            let mut core = EffectCore::new(EvaluateOptions::default().style_table);
            let mut sink = IoSink::new(IoStreams::new(StreamMock::new(), StreamMock::new()));
            core.dispatch_instruction(&Instruction::ansi_push(&[SpanId::Bold]), &mut sink)
                .unwrap();
            core.dispatch_instruction(&Instruction::ansi_pop(), &mut sink)
                .unwrap();
            sink.shutdown().await.unwrap();
        }
        drop(guard);

        let contents = std::fs::read_to_string(&file_path).unwrap();
        assert!(contents.contains("dispatch"), "{contents}");
        assert!(contents.contains("verb=ansi-push"), "{contents}");
        assert!(contents.contains("verb=ansi-pop"), "{contents}");
    }
}
