//! Typed routing of window messages.
//!
//! A window procedure translates raw OS messages into [`Inbound`] values and
//! hands them to a [`MessageRouter`]. Each message id has at most one
//! handler; registering returns a [`Registration`] whose drop removes the
//! handler again, so subscriptions end with their owner instead of living in
//! a process-wide table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use thiserror::Error;

use crate::command::{CommandAssembler, CommandString};
use crate::relay::{MessageIds, WM_COPYDATA_ID};

/// A window message after it has been copied out of OS-owned memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Signal { id: u32, wparam: usize, lparam: isize },
    /// `WM_COPYDATA`; `bytes` is a private copy of the sender's buffer.
    CopyData { tag: usize, bytes: Vec<u8> },
}

impl Inbound {
    pub fn id(&self) -> u32 {
        match self {
            Inbound::Signal { id, .. } => *id,
            Inbound::CopyData { .. } => WM_COPYDATA_ID,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("message {0:#x} already has a handler")]
    AlreadyRegistered(u32),
}

type Handler = Box<dyn FnMut(&Inbound) -> bool + Send>;

struct Slot {
    token: u64,
    handler: Handler,
}

type Table = Mutex<HashMap<u32, Slot>>;

fn lock(table: &Table) -> MutexGuard<'_, HashMap<u32, Slot>> {
    match table.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Clone, Default)]
pub struct MessageRouter {
    handlers: Arc<Table>,
    next_token: Arc<AtomicU64>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for message `id`. The handler returns `true` when it
    /// consumed the message.
    pub fn register<F>(&self, id: u32, handler: F) -> Result<Registration, RouterError>
    where
        F: FnMut(&Inbound) -> bool + Send + 'static,
    {
        let mut table = lock(&self.handlers);
        if table.contains_key(&id) {
            return Err(RouterError::AlreadyRegistered(id));
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        table.insert(
            id,
            Slot {
                token,
                handler: Box::new(handler),
            },
        );
        tracing::debug!(id = format_args!("{id:#x}"), "handler registered");
        Ok(Registration {
            table: Arc::downgrade(&self.handlers),
            id,
            token,
        })
    }

    pub fn is_registered(&self, id: u32) -> bool {
        lock(&self.handlers).contains_key(&id)
    }

    /// Run the handler registered for the message's id, if any. Returns
    /// whether the message was consumed.
    ///
    /// Handlers run with the table locked and must not register or drop
    /// registrations on the same router.
    pub fn dispatch(&self, message: &Inbound) -> bool {
        let mut table = lock(&self.handlers);
        match table.get_mut(&message.id()) {
            Some(slot) => (slot.handler)(message),
            None => false,
        }
    }
}

/// Ownership of one router entry. Dropping it unregisters the handler.
#[must_use = "dropping a Registration unregisters its handler"]
pub struct Registration {
    table: Weak<Table>,
    id: u32,
    token: u64,
}

impl Registration {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            let mut table = lock(&table);
            if table.get(&self.id).is_some_and(|slot| slot.token == self.token) {
                table.remove(&self.id);
                tracing::debug!(id = format_args!("{:#x}", self.id), "handler unregistered");
            }
        }
    }
}

/// Receiving end of the command relay: reassembles size + data messages and
/// forwards complete commands to `sink`.
pub struct CommandReceiver {
    _size: Registration,
    _data: Registration,
}

impl CommandReceiver {
    pub fn install(
        router: &MessageRouter,
        ids: MessageIds,
        sink: Sender<CommandString>,
    ) -> Result<Self, RouterError> {
        let assembler = Arc::new(Mutex::new(CommandAssembler::new()));

        let sizes = Arc::clone(&assembler);
        let size = router.register(ids.size, move |message| match message {
            Inbound::Signal { wparam, .. } => {
                if let Ok(mut assembler) = sizes.lock() {
                    assembler.announce(*wparam);
                }
                true
            }
            Inbound::CopyData { .. } => false,
        })?;

        let data_tag = ids.data as usize;
        let data = router.register(WM_COPYDATA_ID, move |message| match message {
            Inbound::CopyData { tag, bytes } if *tag == data_tag => {
                let decoded = match assembler.lock() {
                    Ok(mut assembler) => assembler.accept(bytes),
                    Err(poisoned) => poisoned.into_inner().accept(bytes),
                };
                match decoded {
                    Ok(command) => {
                        tracing::info!(%command, "received relayed command");
                        if sink.send(command).is_err() {
                            tracing::warn!("command channel closed, dropping relayed command");
                        }
                    }
                    Err(err) => tracing::warn!(%err, "discarding malformed relayed command"),
                }
                true
            }
            _ => false,
        })?;

        Ok(Self {
            _size: size,
            _data: data,
        })
    }
}
