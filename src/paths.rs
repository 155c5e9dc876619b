use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "AppGroup";

/// Per-user data directory, falling back to the working directory when the
/// platform reports none.
pub fn app_data_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(APP_DIR_NAME)
}

pub fn log_file() -> PathBuf {
    app_data_dir().join("logs").join("app_group.log")
}
