use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. Without the debug flag the level is fixed at `info`;
/// with it the default is `debug` and `RUST_LOG` may override it.
///
/// When `file` is given, output is appended to that file instead of stderr.
pub fn init(debug: bool, file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let appender = file.and_then(|path| {
        let dir = path.parent().map(PathBuf::from).unwrap_or_default();
        let name = path.file_name()?.to_string_lossy().into_owned();
        if !dir.as_os_str().is_empty() && std::fs::create_dir_all(&dir).is_err() {
            return None;
        }
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(name)
            .build(dir)
            .ok()
    });

    let _ = match appender {
        Some(appender) => builder.with_ansi(false).with_writer(appender).try_init(),
        None => builder.try_init(),
    };
}
