use std::fmt;

/// Title of the command-receiving popup window.
pub const POPUP_WINDOW_TITLE: &str = "Popup Window";
/// Title of the main application window.
pub const MAIN_WINDOW_TITLE: &str = "App Group";

/// Opaque identifier of a top-level window owned by some process in the
/// current session.
///
/// Handles are used within a single arbitration pass and never cached; the
/// owning process may exit at any time, leaving the handle stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(isize);

impl WindowHandle {
    /// Wrap a raw handle value. Returns `None` for the null handle.
    pub fn from_raw(raw: isize) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn raw(self) -> isize {
        self.0
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowHandle({:#x})", self.0)
    }
}

/// Find a top-level window by exact title.
///
/// Matching is delegated to the OS (`FindWindowW`), so case rules and the
/// choice between several windows sharing a title are OS-defined. Absence is
/// an expected outcome and is only logged at debug level.
#[cfg(target_os = "windows")]
pub fn find_window(title: &str) -> Option<WindowHandle> {
    use windows::core::PCWSTR;
    use windows::Win32::UI::WindowsAndMessaging::FindWindowW;

    let wide = crate::win_util::widestring(title);
    let found = unsafe { FindWindowW(PCWSTR::null(), PCWSTR(wide.as_ptr())) };
    match found {
        Ok(hwnd) => {
            let handle = crate::win_util::from_hwnd(hwnd);
            tracing::debug!(title, ?handle, "window lookup");
            handle
        }
        Err(err) => {
            tracing::debug!(title, %err, "window not found");
            None
        }
    }
}

#[cfg(not(target_os = "windows"))]
pub fn find_window(title: &str) -> Option<WindowHandle> {
    tracing::debug!(title, "window lookup unsupported on this platform");
    None
}
