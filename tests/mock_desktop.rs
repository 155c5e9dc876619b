#![allow(dead_code)]

use app_group::arbitration::Desktop;
use app_group::command::CommandString;
use app_group::dispatch::{Inbound, MessageRouter};
use app_group::foreground::FocusApi;
use app_group::relay::{DeliveryError, MessageIds, MessageTransport};
use app_group::window_locator::{WindowHandle, MAIN_WINDOW_TITLE, POPUP_WINDOW_TITLE};
use std::cell::RefCell;
use std::sync::{Arc, Mutex};

pub fn handle(raw: isize) -> WindowHandle {
    WindowHandle::from_raw(raw).unwrap()
}

pub const POPUP: isize = 0x1010;
pub const MAIN: isize = 0x2020;

/// Desktop with optional popup/main windows that records every call.
#[derive(Default)]
pub struct MockDesktop {
    pub popup: Option<WindowHandle>,
    pub main: Option<WindowHandle>,
    pub fail_delivery: Option<DeliveryError>,
    pub lookups: RefCell<Vec<String>>,
    pub sent: RefCell<Vec<(WindowHandle, CommandString)>>,
    pub raised: RefCell<Vec<WindowHandle>>,
}

impl MockDesktop {
    pub fn new(popup: bool, main: bool) -> Self {
        Self {
            popup: popup.then(|| handle(POPUP)),
            main: main.then(|| handle(MAIN)),
            ..Default::default()
        }
    }
}

impl Desktop for MockDesktop {
    fn find_window(&self, title: &str) -> Option<WindowHandle> {
        self.lookups.borrow_mut().push(title.to_string());
        match title {
            POPUP_WINDOW_TITLE => self.popup,
            MAIN_WINDOW_TITLE => self.main,
            _ => None,
        }
    }

    fn send_command(&self, target: WindowHandle, command: &CommandString) -> Result<(), DeliveryError> {
        if let Some(err) = &self.fail_delivery {
            return Err(err.clone());
        }
        self.sent.borrow_mut().push((target, command.clone()));
        Ok(())
    }

    fn bring_to_front(&self, target: WindowHandle) {
        self.raised.borrow_mut().push(target);
    }
}

/// Transport that hands messages straight to a router, the way the host
/// window procedure does after copying `WM_COPYDATA` bytes out.
pub struct LoopbackTransport {
    pub ids: MessageIds,
    pub router: MessageRouter,
    pub log: Mutex<Vec<Inbound>>,
}

impl LoopbackTransport {
    pub fn new(ids: MessageIds, router: MessageRouter) -> Self {
        Self {
            ids,
            router,
            log: Mutex::new(Vec::new()),
        }
    }

    fn deliver(&self, inbound: Inbound) -> Result<(), DeliveryError> {
        self.log.lock().unwrap().push(inbound.clone());
        if self.router.dispatch(&inbound) {
            Ok(())
        } else {
            Err(DeliveryError::Rejected("unhandled".into()))
        }
    }
}

impl MessageTransport for LoopbackTransport {
    fn send_size(&self, _target: WindowHandle, byte_len: usize) -> Result<(), DeliveryError> {
        self.deliver(Inbound::Signal {
            id: self.ids.size,
            wparam: byte_len,
            lparam: 0,
        })
    }

    fn send_data(&self, _target: WindowHandle, bytes: &[u8]) -> Result<(), DeliveryError> {
        self.deliver(Inbound::CopyData {
            tag: self.ids.data as usize,
            bytes: bytes.to_vec(),
        })
    }
}

/// Window manager model for foreground coercion.
#[derive(Default)]
pub struct MockFocus {
    pub state: Arc<Mutex<FocusState>>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct FocusState {
    pub minimized: bool,
    pub visible: bool,
    pub foreground: Option<WindowHandle>,
    /// Whether direct `set_foreground` calls succeed without attached input.
    pub allow_direct: bool,
    pub attached: bool,
    pub calls: Vec<String>,
}

impl MockFocus {
    pub fn with(state: FocusState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn snapshot(&self) -> FocusState {
        self.state.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

impl FocusApi for MockFocus {
    fn is_minimized(&self, _target: WindowHandle) -> bool {
        self.state.lock().unwrap().minimized
    }

    fn restore(&self, _target: WindowHandle) {
        let mut s = self.state.lock().unwrap();
        s.minimized = false;
        s.visible = true;
        s.calls.push("restore".into());
    }

    fn show(&self, _target: WindowHandle) {
        let mut s = self.state.lock().unwrap();
        s.visible = true;
        s.calls.push("show".into());
    }

    fn foreground(&self) -> Option<WindowHandle> {
        self.state.lock().unwrap().foreground
    }

    fn set_foreground(&self, target: WindowHandle) -> bool {
        let mut s = self.state.lock().unwrap();
        s.calls.push("set_foreground".into());
        if s.allow_direct || s.attached {
            s.foreground = Some(target);
            true
        } else {
            false
        }
    }

    fn raise(&self, _target: WindowHandle) {
        self.state.lock().unwrap().calls.push("raise".into());
    }

    fn attach_input(&self, _other: WindowHandle, attach: bool) -> bool {
        let mut s = self.state.lock().unwrap();
        s.calls.push(if attach { "attach" } else { "detach" }.into());
        s.attached = attach;
        true
    }
}
