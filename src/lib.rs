pub mod app;
pub mod arbitration;
pub mod command;
pub mod dispatch;
pub mod foreground;
#[cfg(target_os = "windows")]
pub mod host_window;
pub mod logging;
pub mod paths;
pub mod relay;
pub mod settings;
pub mod update;
pub mod usage;
pub mod win_util;
pub mod window_locator;
