//! Top-level windows owned by the primary instance.
//!
//! The window procedure copies incoming messages into [`Inbound`] values and
//! hands them to the window's [`MessageRouter`]. The router lives in a boxed
//! state block attached through `GWLP_USERDATA` and is freed on
//! `WM_NCDESTROY`.

use std::sync::Once;

use anyhow::{anyhow, Result};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::DataExchange::COPYDATASTRUCT;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    ChangeWindowMessageFilterEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetMessageW, GetWindowLongPtrW, IsWindow, PostQuitMessage, RegisterClassW, SetWindowLongPtrW,
    TranslateMessage, CW_USEDEFAULT, GWLP_USERDATA, MSG, MSGFLT_ALLOW, WINDOW_EX_STYLE,
    WM_COPYDATA, WM_DESTROY, WM_NCDESTROY, WNDCLASSW, WS_OVERLAPPEDWINDOW,
};

use crate::dispatch::{Inbound, MessageRouter};
use crate::win_util::{from_hwnd, widestring};
use crate::window_locator::WindowHandle;

const CLASS_NAME: &str = "AppGroupHostWindow";

struct HostState {
    router: MessageRouter,
    quit_on_destroy: bool,
}

pub struct HostWindow {
    hwnd: HWND,
    title: String,
}

impl HostWindow {
    /// Create a hidden top-level window titled `title`.
    ///
    /// `extra_messages` are registered message ids that must pass the
    /// integrity-level message filter, in addition to `WM_COPYDATA`.
    pub fn create(
        title: &str,
        router: MessageRouter,
        extra_messages: &[u32],
        quit_on_destroy: bool,
    ) -> Result<Self> {
        static REGISTER_CLASS: Once = Once::new();
        let class_name = widestring(CLASS_NAME);
        let hinstance = unsafe { GetModuleHandleW(PCWSTR::null()) }?;

        REGISTER_CLASS.call_once(|| unsafe {
            let wc = WNDCLASSW {
                hInstance: hinstance.into(),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                lpfnWndProc: Some(host_wndproc),
                ..Default::default()
            };
            if RegisterClassW(&wc) == 0 {
                tracing::error!("RegisterClassW failed for host window");
            }
        });

        let wide_title = widestring(title);
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(wide_title.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                480,
                320,
                None,
                None,
                hinstance,
                None,
            )
        }
        .map_err(|err| anyhow!("failed to create '{title}' window: {err}"))?;

        let state = Box::new(HostState {
            router,
            quit_on_destroy,
        });
        unsafe {
            let _ = SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);
        }

        // Let lower-integrity senders through UIPI.
        for msg in std::iter::once(WM_COPYDATA).chain(extra_messages.iter().copied()) {
            if let Err(err) = unsafe { ChangeWindowMessageFilterEx(hwnd, msg, MSGFLT_ALLOW, None) } {
                tracing::warn!(msg = format_args!("{msg:#x}"), %err, "message filter not relaxed");
            }
        }

        tracing::debug!(title, ?hwnd, "host window created");
        Ok(Self {
            hwnd,
            title: title.to_string(),
        })
    }

    pub fn handle(&self) -> Option<WindowHandle> {
        from_hwnd(self.hwnd)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Show and focus the window.
    pub fn show(&self) {
        if let Some(handle) = self.handle() {
            crate::foreground::bring_to_front(handle);
        }
    }
}

impl Drop for HostWindow {
    fn drop(&mut self) {
        unsafe {
            if IsWindow(self.hwnd).as_bool() {
                let _ = DestroyWindow(self.hwnd);
            }
        }
    }
}

/// Pump messages for every window on this thread until `WM_QUIT`.
pub fn run_message_loop() {
    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, HWND::default(), 0, 0).0 > 0 {
            let _ = TranslateMessage(&msg);
            let _ = DispatchMessageW(&msg);
        }
    }
}

/// Copy the payload of a `WM_COPYDATA` message. The sender's buffer is only
/// mapped into this process while the message is being handled.
unsafe fn copy_data_payload(lparam: LPARAM) -> Option<Inbound> {
    if lparam.0 == 0 {
        return None;
    }
    let cds = unsafe { &*(lparam.0 as *const COPYDATASTRUCT) };
    let bytes = if cds.cbData == 0 || cds.lpData.is_null() {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(cds.lpData as *const u8, cds.cbData as usize) }.to_vec()
    };
    Some(Inbound::CopyData {
        tag: cds.dwData,
        bytes,
    })
}

unsafe extern "system" fn host_wndproc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let state = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut HostState;
    if state.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    match msg {
        WM_COPYDATA => {
            let consumed = match unsafe { copy_data_payload(lparam) } {
                Some(inbound) => unsafe { &*state }.router.dispatch(&inbound),
                None => false,
            };
            LRESULT(consumed as isize)
        }
        WM_DESTROY => {
            if unsafe { &*state }.quit_on_destroy {
                unsafe { PostQuitMessage(0) };
            }
            LRESULT(0)
        }
        WM_NCDESTROY => {
            unsafe {
                let _ = SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                drop(Box::from_raw(state));
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }
        }
        _ => {
            let inbound = Inbound::Signal {
                id: msg,
                wparam: wparam.0,
                lparam: lparam.0,
            };
            if unsafe { &*state }.router.dispatch(&inbound) {
                LRESULT(1)
            } else {
                unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
            }
        }
    }
}
