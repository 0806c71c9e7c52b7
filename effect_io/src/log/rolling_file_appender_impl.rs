// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

/// Create a file appender that never rolls over, so all log output of a run ends up in
/// `path_str`.
///
/// # Errors
///
/// Returns an error if the path has no parent directory, or no file name.
pub fn try_create(
    path_str: &str,
) -> miette::Result<tracing_appender::rolling::RollingFileAppender> {
    let path = PathBuf::from(&path_str);

    let parent = path.parent().ok_or_else(|| {
        miette::miette!(
            "Can't access the folder of log file {}. It might not exist.",
            path.display()
        )
    })?;

    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("Log file path {} has no file name.", path.display())
    })?;

    Ok(tracing_appender::rolling::never(parent, file_name))
}
