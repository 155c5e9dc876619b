use crate::window_locator::WindowHandle;

/// The window manager operations used to raise another process's window.
///
/// Every operation is best effort; failures are reported through return
/// values only where the coercion sequence branches on them.
pub trait FocusApi {
    fn is_minimized(&self, target: WindowHandle) -> bool;
    fn restore(&self, target: WindowHandle);
    fn show(&self, target: WindowHandle);
    fn foreground(&self) -> Option<WindowHandle>;
    fn set_foreground(&self, target: WindowHandle) -> bool;
    fn raise(&self, target: WindowHandle);
    /// Attach (or detach) this thread's input state to the thread owning
    /// `other`. Returns `true` when the call changed the attachment.
    fn attach_input(&self, other: WindowHandle, attach: bool) -> bool;
}

/// Restore, show and focus `target`, working around focus-stealing
/// prevention. Never fails observably.
///
/// The OS only lets the foreground process hand focus to another process's
/// window. When the direct request is denied, this thread temporarily shares
/// the foreground thread's input state, which satisfies that rule, retries and
/// detaches again.
pub fn bring_to_front_with<A: FocusApi + ?Sized>(api: &A, target: WindowHandle) {
    if api.is_minimized(target) {
        api.restore(target);
    }
    api.show(target);

    let current = api.foreground();
    if current == Some(target) {
        tracing::debug!(window = ?target, "window already in foreground");
        return;
    }
    if api.set_foreground(target) {
        tracing::debug!(window = ?target, "foreground granted");
        return;
    }

    tracing::debug!(window = ?target, ?current, "foreground denied, attaching input");
    match current {
        Some(owner) => {
            let attached = api.attach_input(owner, true);
            api.raise(target);
            let granted = api.set_foreground(target);
            if attached {
                api.attach_input(owner, false);
            }
            tracing::debug!(window = ?target, attached, granted, "forced foreground");
        }
        None => {
            api.raise(target);
            let granted = api.set_foreground(target);
            tracing::debug!(window = ?target, granted, "no foreground owner, raised");
        }
    }
}

#[cfg(target_os = "windows")]
pub use platform::Win32Focus;

#[cfg(target_os = "windows")]
mod platform {
    use super::FocusApi;
    use crate::win_util::{from_hwnd, to_hwnd};
    use crate::window_locator::WindowHandle;
    use windows::Win32::Foundation::BOOL;
    use windows::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
    use windows::Win32::UI::WindowsAndMessaging::{
        BringWindowToTop, GetForegroundWindow, GetWindowThreadProcessId, IsIconic,
        SetForegroundWindow, ShowWindow, SW_RESTORE, SW_SHOW,
    };

    #[derive(Debug, Default, Clone, Copy)]
    pub struct Win32Focus;

    impl FocusApi for Win32Focus {
        fn is_minimized(&self, target: WindowHandle) -> bool {
            unsafe { IsIconic(to_hwnd(target)) }.as_bool()
        }

        fn restore(&self, target: WindowHandle) {
            let _ = unsafe { ShowWindow(to_hwnd(target), SW_RESTORE) };
        }

        fn show(&self, target: WindowHandle) {
            let _ = unsafe { ShowWindow(to_hwnd(target), SW_SHOW) };
        }

        fn foreground(&self) -> Option<WindowHandle> {
            from_hwnd(unsafe { GetForegroundWindow() })
        }

        fn set_foreground(&self, target: WindowHandle) -> bool {
            unsafe { SetForegroundWindow(to_hwnd(target)) }.as_bool()
        }

        fn raise(&self, target: WindowHandle) {
            let _ = unsafe { BringWindowToTop(to_hwnd(target)) };
        }

        fn attach_input(&self, other: WindowHandle, attach: bool) -> bool {
            unsafe {
                let current = GetCurrentThreadId();
                let owner = GetWindowThreadProcessId(to_hwnd(other), None);
                if owner == 0 || owner == current {
                    return false;
                }
                AttachThreadInput(current, owner, BOOL::from(attach)).as_bool()
            }
        }
    }
}

/// Raise `target` using the native window manager.
#[cfg(target_os = "windows")]
pub fn bring_to_front(target: WindowHandle) {
    bring_to_front_with(&Win32Focus, target);
}

#[cfg(not(target_os = "windows"))]
pub fn bring_to_front(target: WindowHandle) {
    tracing::debug!(window = ?target, "foreground coercion unsupported on this platform");
}
