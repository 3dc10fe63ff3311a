// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::cube::Position;

/// Failures of the underlying byte channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("device is not connected")]
    NotConnected,

    #[error("device disconnected before the request completed")]
    Disconnected,

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("write to {characteristic} failed: {reason}")]
    Write { characteristic: Uuid, reason: String },

    #[error("subscribing to {characteristic} failed: {reason}")]
    Subscribe { characteristic: Uuid, reason: String },

    #[error("characteristic {0} not found")]
    CharacteristicNotFound(Uuid),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Malformed, unexpected or undecodable frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown move code 0x{0:02x}")]
    UnknownMove(u8),

    #[error("trailing padding nibble is 0x{0:x}, expected 0")]
    MalformedPadding(u8),

    #[error("frame is {actual} bytes, expected {expected}")]
    FrameLength { expected: usize, actual: usize },

    #[error("unknown command code 0x{0:02x}")]
    UnknownCommand(u8),

    #[error("empty frame")]
    EmptyFrame,

    #[error("{field} nibble of slot {slot} is out of range: {value}")]
    InvalidNibble {
        field: &'static str,
        slot: usize,
        value: u8,
    },

    #[error("cubelet {0:?} is referenced by more than one slot")]
    DuplicateCubelet(Position),

    #[error("edge slot {0} has no consistent orientation")]
    UnresolvedAxis(usize),

    #[error("unknown charge state 0x{0:02x}")]
    UnknownChargeState(u8),
}

/// Any error surfaced by the cube driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
