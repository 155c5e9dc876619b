use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

/// A user supplied instruction (usually a group name or a file path) taken
/// verbatim from the command line.
///
/// Stored as raw UTF-16 code units so that arguments containing unpaired
/// surrogates survive the trip to another process unchanged.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CommandString(Vec<u16>);

impl CommandString {
    pub fn from_units(units: Vec<u16>) -> Self {
        Self(units)
    }

    pub fn units(&self) -> &[u16] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the encoded payload in bytes.
    pub fn byte_len(&self) -> usize {
        self.0.len() * 2
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }
}

impl From<&str> for CommandString {
    fn from(value: &str) -> Self {
        Self(value.encode_utf16().collect())
    }
}

impl fmt::Debug for CommandString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandString({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for CommandString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("command payload has odd length {0}")]
    OddLength(usize),
}

/// Encode a command as little-endian UTF-16 bytes, without a terminator.
pub fn encode_command(command: &CommandString) -> Vec<u8> {
    command
        .units()
        .iter()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

pub fn decode_command(bytes: &[u8]) -> Result<CommandString, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddLength(bytes.len()));
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(CommandString::from_units(units))
}

/// Receiving half of the size + data protocol.
///
/// Size announcements are queued in arrival order. A data frame carries its
/// own length, so it is decoded on its own and then settles the first queued
/// announcement of the same length. Two senders may interleave their size and
/// data messages; neither command is lost when that happens.
#[derive(Debug, Default)]
pub struct CommandAssembler {
    announced: VecDeque<usize>,
}

impl CommandAssembler {
    /// Announcements older than this many entries are forgotten.
    pub const MAX_PENDING: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn announce(&mut self, byte_len: usize) {
        if self.announced.len() == Self::MAX_PENDING {
            if let Some(stale) = self.announced.pop_front() {
                tracing::debug!(stale, "dropping unanswered size announcement");
            }
        }
        self.announced.push_back(byte_len);
    }

    /// Number of announcements still waiting for their data frame.
    pub fn pending(&self) -> usize {
        self.announced.len()
    }

    pub fn accept(&mut self, bytes: &[u8]) -> Result<CommandString, DecodeError> {
        match self.announced.iter().position(|len| *len == bytes.len()) {
            Some(index) => {
                self.announced.remove(index);
            }
            None if self.announced.is_empty() => {
                tracing::debug!(received = bytes.len(), "command data arrived without a size announcement");
            }
            None => {
                tracing::debug!(
                    announced = ?self.announced,
                    received = bytes.len(),
                    "command data does not match any size announcement"
                );
            }
        }
        decode_command(bytes)
    }
}
