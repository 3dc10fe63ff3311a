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

//! Command frame definitions and response parsing.
//!
//! Every request and response starts with a one-byte command code; the
//! response repeats the code of the request it answers.

use std::fmt;

use crate::cube::{Move, STATE_LEN};
use crate::error::ProtocolError;

/// Length of a move notification: packed state plus the move code.
pub const MOVE_FRAME_LEN: usize = STATE_LEN + 1;

/// Query commands understood by the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    GetBattery = 0xb5,
    GetFirmwareVersion = 0xb7,
    GetUid = 0xbe,
    GetMoveCount = 0xcc,
}

impl CommandCode {
    pub const ALL: [CommandCode; 4] = [
        CommandCode::GetBattery,
        CommandCode::GetFirmwareVersion,
        CommandCode::GetUid,
        CommandCode::GetMoveCount,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_byte() == byte)
    }

    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Request frame for this command (no payload).
    pub fn request(&self) -> Vec<u8> {
        vec![self.as_byte()]
    }

    /// Number of payload bytes following the code in a response.
    pub fn response_payload_len(&self) -> usize {
        match self {
            Self::GetBattery => 2,
            Self::GetFirmwareVersion => 1,
            Self::GetUid => 6,
            Self::GetMoveCount => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetBattery => "GET_BATTERY",
            Self::GetFirmwareVersion => "GET_FIRMWARE_VERSION",
            Self::GetUid => "GET_UID",
            Self::GetMoveCount => "GET_MOVE_COUNT",
        }
    }
}

/// Battery charging state as reported by the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChargeState {
    FullyCharged = 0x01,
    Charging = 0x02,
    NotCharging = 0x03,
}

impl ChargeState {
    pub fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0x01 => Ok(Self::FullyCharged),
            0x02 => Ok(Self::Charging),
            0x03 => Ok(Self::NotCharging),
            other => Err(ProtocolError::UnknownChargeState(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullyCharged => "FULLY_CHARGED",
            Self::Charging => "CHARGING",
            Self::NotCharging => "NOT_CHARGING",
        }
    }
}

/// Battery level and charging state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryInfo {
    /// Level in percent, clamped per charge state.
    pub level: u8,
    pub charge_state: ChargeState,
}

impl BatteryInfo {
    /// Build from a raw level, applying the clamping rule: a charging cube
    /// never reports more than 99%, a fully charged one always 100%.
    pub fn new(raw_level: u8, charge_state: ChargeState) -> Self {
        let level = match charge_state {
            ChargeState::NotCharging => raw_level.min(100),
            ChargeState::Charging => raw_level.min(99),
            ChargeState::FullyCharged => 100,
        };
        Self {
            level,
            charge_state,
        }
    }
}

impl fmt::Display for BatteryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% {}", self.level, self.charge_state.as_str())
    }
}

/// Check a response frame answers `command` and return its payload.
fn response_payload(command: CommandCode, frame: &[u8]) -> Result<&[u8], ProtocolError> {
    let code = *frame.first().ok_or(ProtocolError::EmptyFrame)?;
    if code != command.as_byte() {
        return Err(ProtocolError::UnknownCommand(code));
    }

    let expected = 1 + command.response_payload_len();
    if frame.len() < expected {
        return Err(ProtocolError::FrameLength {
            expected,
            actual: frame.len(),
        });
    }
    Ok(&frame[1..expected])
}

pub fn parse_uid(frame: &[u8]) -> Result<[u8; 6], ProtocolError> {
    let payload = response_payload(CommandCode::GetUid, frame)?;
    let mut uid = [0u8; 6];
    uid.copy_from_slice(payload);
    Ok(uid)
}

pub fn parse_firmware_version(frame: &[u8]) -> Result<u8, ProtocolError> {
    let payload = response_payload(CommandCode::GetFirmwareVersion, frame)?;
    Ok(payload[0])
}

pub fn parse_battery(frame: &[u8]) -> Result<BatteryInfo, ProtocolError> {
    let payload = response_payload(CommandCode::GetBattery, frame)?;
    let charge_state = ChargeState::from_byte(payload[1])?;
    Ok(BatteryInfo::new(payload[0], charge_state))
}

pub fn parse_move_count(frame: &[u8]) -> Result<u32, ProtocolError> {
    let payload = response_payload(CommandCode::GetMoveCount, frame)?;
    Ok(u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]))
}

/// Split a move notification into its state payload and move.
pub fn split_move_frame(frame: &[u8]) -> Result<(&[u8], Move), ProtocolError> {
    if frame.len() != MOVE_FRAME_LEN {
        return Err(ProtocolError::FrameLength {
            expected: MOVE_FRAME_LEN,
            actual: frame.len(),
        });
    }
    let mv = Move::from_code(frame[STATE_LEN])?;
    Ok((&frame[..STATE_LEN], mv))
}
