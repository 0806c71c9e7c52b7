// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::Debug, ops::Add};

use tracing::subscriber::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::try_create_layers;

pub const DEFAULT_LOG_FILE_NAME: &str = "effect_render.log";

/// Where log output goes, and which level is let through.
///
/// Build one from any of the types that convert into it, and compose them with `+`:
///
/// ```no_run
/// use r3bl_effect_io::{DisplayPreference, TracingConfig, WriterConfig};
///
/// let config: TracingConfig = tracing_core::LevelFilter::TRACE.into();
/// let config = config + WriterConfig::File("/tmp/render.log".into()).into();
/// let config = config + TracingConfig::from(DisplayPreference::Stderr);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String /* log file path */),
    DisplayAndFile(DisplayPreference, String /* log file path */),
}

/// Rendered output usually owns `stdout`, so logs should mostly go to `stderr` (or a
/// file) to keep the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

impl TracingConfig {
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    /// Global default subscriber, which once set, can't be unset or changed. Meant for
    /// binaries.
    ///
    /// # Errors
    ///
    /// If the log file can't be created, or a global subscriber is already set.
    pub fn install_global(self) -> miette::Result<()> {
        let layers = try_create_layers(self)?.unwrap_or_default();
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|err| miette::miette!("Failed to install global subscriber: {err}"))
    }

    /// Subscriber for the current thread, until the returned guard is dropped. Meant for
    /// tests.
    ///
    /// # Errors
    ///
    /// If the log file can't be created.
    pub fn install_thread_local(self) -> miette::Result<DefaultGuard> {
        let layers = try_create_layers(self)?.unwrap_or_default();
        let subscriber = tracing_subscriber::registry().with(layers);
        Ok(tracing::subscriber::set_default(subscriber))
    }
}

impl From<tracing::Level> for TracingConfig {
    fn from(level: tracing::Level) -> Self {
        Self {
            level_filter: level.into(),
            writer_config: WriterConfig::File(DEFAULT_LOG_FILE_NAME.to_string()),
        }
    }
}

impl From<LevelFilter> for TracingConfig {
    fn from(level_filter: LevelFilter) -> Self {
        Self {
            level_filter,
            writer_config: WriterConfig::File(DEFAULT_LOG_FILE_NAME.to_string()),
        }
    }
}

impl From<DisplayPreference> for TracingConfig {
    fn from(preferred_display: DisplayPreference) -> Self {
        Self {
            level_filter: LevelFilter::DEBUG,
            writer_config: WriterConfig::Display(preferred_display),
        }
    }
}

impl From<WriterConfig> for TracingConfig {
    fn from(writer_config: WriterConfig) -> Self {
        Self {
            level_filter: LevelFilter::DEBUG,
            writer_config,
        }
    }
}

/// The more verbose level wins, writer configs are merged.
impl Add<TracingConfig> for TracingConfig {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            level_filter: self.level_filter.max(rhs.level_filter),
            writer_config: self.writer_config + rhs.writer_config,
        }
    }
}

/// Merge two writer configs. Display and file settings combine. When both sides set
/// the same thing, `rhs` wins.
impl Add<WriterConfig> for WriterConfig {
    type Output = Self;

    fn add(self, rhs: WriterConfig) -> Self::Output {
        use WriterConfig::{Display, DisplayAndFile, File, None};

        match (self, rhs) {
            (None, it) | (it, None) => it,
            (Display(display), File(file)) | (File(file), Display(display)) => {
                DisplayAndFile(display, file)
            }
            (Display(_), Display(display)) => Display(display),
            (File(_), File(file)) => File(file),
            (DisplayAndFile(display, _), File(file)) => DisplayAndFile(display, file),
            (DisplayAndFile(_, file), Display(display)) => DisplayAndFile(display, file),
            (Display(_) | File(_) | DisplayAndFile(..), it @ DisplayAndFile(..)) => it,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_writer_config_merge() {
        let stdout = WriterConfig::Display(DisplayPreference::Stdout);
        let stderr = WriterConfig::Display(DisplayPreference::Stderr);
        let file = WriterConfig::File("a.log".into());

        assert_eq!(WriterConfig::None + file.clone(), file);
        assert_eq!(file.clone() + WriterConfig::None, file);
        assert_eq!(
            file.clone() + stderr.clone(),
            WriterConfig::DisplayAndFile(DisplayPreference::Stderr, "a.log".into())
        );
        assert_eq!(stdout.clone() + stderr.clone(), stderr);
        assert_eq!(
            WriterConfig::DisplayAndFile(DisplayPreference::Stdout, "a.log".into())
                + WriterConfig::File("b.log".into()),
            WriterConfig::DisplayAndFile(DisplayPreference::Stdout, "b.log".into())
        );
        assert_eq!(
            WriterConfig::DisplayAndFile(DisplayPreference::Stdout, "a.log".into())
                + stderr,
            WriterConfig::DisplayAndFile(DisplayPreference::Stderr, "a.log".into())
        );
    }

    #[test]
    fn test_tracing_config_merge_keeps_most_verbose_level() {
        let lhs: TracingConfig = LevelFilter::INFO.into();
        let rhs: TracingConfig = DisplayPreference::Stderr.into();
        let merged = lhs + rhs;

        assert_eq!(merged.get_level_filter(), LevelFilter::DEBUG);
        assert_eq!(
            merged.get_writer_config(),
            WriterConfig::DisplayAndFile(
                DisplayPreference::Stderr,
                DEFAULT_LOG_FILE_NAME.to_string()
            )
        );
    }
}
