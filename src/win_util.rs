#[cfg(target_os = "windows")]
use crate::window_locator::WindowHandle;
#[cfg(target_os = "windows")]
use windows::Win32::Foundation::HWND;

/// Encode `value` as a NUL-terminated UTF-16 buffer for Win32 string parameters.
pub fn widestring(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(target_os = "windows")]
pub fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.raw() as *mut core::ffi::c_void)
}

#[cfg(target_os = "windows")]
pub fn from_hwnd(hwnd: HWND) -> Option<WindowHandle> {
    if hwnd.0.is_null() {
        None
    } else {
        WindowHandle::from_raw(hwnd.0 as isize)
    }
}

/// Convert an argument from the OS argument vector into UTF-16 code units
/// without a lossy round trip through `String`.
pub fn os_str_to_utf16(value: &std::ffi::OsStr) -> Vec<u16> {
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::ffi::OsStrExt;
        value.encode_wide().collect()
    }

    #[cfg(not(target_os = "windows"))]
    {
        value.to_string_lossy().encode_utf16().collect()
    }
}
