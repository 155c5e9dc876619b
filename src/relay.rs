//! Sending half of the command relay.
//!
//! A command travels to another process as two synchronous window messages
//! sent to the same window:
//!
//! 1. the registered `AppGroup.CommandSize` message with the payload length in
//!    `wParam`;
//! 2. `WM_COPYDATA` tagged (`dwData`) with the registered
//!    `AppGroup.CommandData` id, carrying the UTF-16LE payload.
//!
//! The `WM_COPYDATA` buffer is marshalled by the OS and is only valid while
//! the receiver's window procedure runs, so the receiver copies it out before
//! returning. Delivery is at most once and carries no acknowledgement.

use std::time::Duration;

use thiserror::Error;

use crate::command::{encode_command, CommandString};
use crate::window_locator::WindowHandle;

pub const SIZE_MESSAGE_NAME: &str = "AppGroup.CommandSize";
pub const DATA_MESSAGE_NAME: &str = "AppGroup.CommandData";

/// `WM_COPYDATA`, spelled out so routing tables can be built on any platform.
pub const WM_COPYDATA_ID: u32 = 0x004A;

pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_millis(5000);

/// The pair of message identifiers shared by sender and receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIds {
    pub size: u32,
    pub data: u32,
}

impl MessageIds {
    pub fn new(size: u32, data: u32) -> Self {
        Self { size, data }
    }

    /// Register both message names with the window manager. Every process
    /// registering the same names receives the same ids for the session.
    #[cfg(target_os = "windows")]
    pub fn register() -> Option<Self> {
        use windows::core::PCWSTR;
        use windows::Win32::UI::WindowsAndMessaging::RegisterWindowMessageW;

        let register = |name: &str| {
            let wide = crate::win_util::widestring(name);
            let id = unsafe { RegisterWindowMessageW(PCWSTR(wide.as_ptr())) };
            if id == 0 {
                tracing::warn!(name, "RegisterWindowMessageW failed");
                None
            } else {
                Some(id)
            }
        };
        Some(Self::new(register(SIZE_MESSAGE_NAME)?, register(DATA_MESSAGE_NAME)?))
    }

    /// Without a window manager the ids only need to be stable within the
    /// process, so the first two ids of the registered range are used.
    #[cfg(not(target_os = "windows"))]
    pub fn register() -> Option<Self> {
        Some(Self::new(0xC000, 0xC001))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("target window no longer exists")]
    TargetGone,
    #[error("receiver did not respond within {0:?}")]
    TimedOut(Duration),
    #[error("payload of {0} bytes does not fit the transport")]
    TooLarge(usize),
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Raw message delivery to a window in another process.
pub trait MessageTransport {
    fn send_size(&self, target: WindowHandle, byte_len: usize) -> Result<(), DeliveryError>;
    fn send_data(&self, target: WindowHandle, bytes: &[u8]) -> Result<(), DeliveryError>;
}

/// Send `command` to `target` as a size announcement followed by the data.
///
/// Success means both messages were dispatched to the receiver's window
/// procedure, not that the receiver acted on the command.
pub fn send_command<T: MessageTransport + ?Sized>(
    transport: &T,
    target: WindowHandle,
    command: &CommandString,
) -> Result<(), DeliveryError> {
    let bytes = encode_command(command);
    if u32::try_from(bytes.len()).is_err() {
        return Err(DeliveryError::TooLarge(bytes.len()));
    }
    transport.send_size(target, bytes.len())?;
    transport.send_data(target, &bytes)?;
    tracing::debug!(window = ?target, bytes = bytes.len(), "command relayed");
    Ok(())
}

/// Win32 transport built on `SendMessageTimeoutW`, which bounds every send
/// by `timeout` and gives up early when the receiver is considered hung.
#[derive(Debug, Clone, Copy)]
pub struct Win32Transport {
    ids: MessageIds,
    timeout: Duration,
}

impl Win32Transport {
    pub fn new(ids: MessageIds, timeout: Duration) -> Self {
        Self { ids, timeout }
    }

    pub fn ids(&self) -> MessageIds {
        self.ids
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_ms(&self) -> u32 {
        self.timeout.as_millis().min(u32::MAX as u128) as u32
    }
}

#[cfg(target_os = "windows")]
impl Win32Transport {
    fn send(&self, target: WindowHandle, msg: u32, wparam: usize, lparam: isize) -> Result<(), DeliveryError> {
        use windows::Win32::Foundation::{LPARAM, WPARAM};
        use windows::Win32::UI::WindowsAndMessaging::{SendMessageTimeoutW, SMTO_ABORTIFHUNG, SMTO_BLOCK};

        let hwnd = crate::win_util::to_hwnd(target);
        let mut result: usize = 0;
        let sent = unsafe {
            SendMessageTimeoutW(
                hwnd,
                msg,
                WPARAM(wparam),
                LPARAM(lparam),
                SMTO_ABORTIFHUNG | SMTO_BLOCK,
                self.timeout_ms(),
                Some(&mut result as *mut usize),
            )
        };
        if sent.0 != 0 {
            return Ok(());
        }
        Err(self.classify_failure(target))
    }

    fn classify_failure(&self, target: WindowHandle) -> DeliveryError {
        use windows::Win32::Foundation::{GetLastError, ERROR_INVALID_WINDOW_HANDLE, ERROR_SUCCESS, ERROR_TIMEOUT};
        use windows::Win32::UI::WindowsAndMessaging::IsWindow;

        let code = unsafe { GetLastError() };
        let alive = unsafe { IsWindow(crate::win_util::to_hwnd(target)) }.as_bool();
        if !alive || code == ERROR_INVALID_WINDOW_HANDLE {
            return DeliveryError::TargetGone;
        }
        // A hung receiver aborts with no error code set.
        if code == ERROR_TIMEOUT || code == ERROR_SUCCESS {
            return DeliveryError::TimedOut(self.timeout);
        }
        DeliveryError::Rejected(format!("win32 error {}", code.0))
    }
}

#[cfg(target_os = "windows")]
impl MessageTransport for Win32Transport {
    fn send_size(&self, target: WindowHandle, byte_len: usize) -> Result<(), DeliveryError> {
        self.send(target, self.ids.size, byte_len, 0)
    }

    fn send_data(&self, target: WindowHandle, bytes: &[u8]) -> Result<(), DeliveryError> {
        use windows::Win32::System::DataExchange::COPYDATASTRUCT;

        let len = u32::try_from(bytes.len()).map_err(|_| DeliveryError::TooLarge(bytes.len()))?;
        let cds = COPYDATASTRUCT {
            dwData: self.ids.data as usize,
            cbData: len,
            lpData: bytes.as_ptr() as *mut core::ffi::c_void,
        };
        // `cds` and `bytes` outlive the synchronous send.
        self.send(target, WM_COPYDATA_ID, 0, &cds as *const COPYDATASTRUCT as isize)
    }
}

#[cfg(not(target_os = "windows"))]
impl MessageTransport for Win32Transport {
    fn send_size(&self, _target: WindowHandle, _byte_len: usize) -> Result<(), DeliveryError> {
        tracing::debug!(timeout_ms = self.timeout_ms(), "no window transport on this platform");
        Err(DeliveryError::TargetGone)
    }

    fn send_data(&self, _target: WindowHandle, _bytes: &[u8]) -> Result<(), DeliveryError> {
        Err(DeliveryError::TargetGone)
    }
}
