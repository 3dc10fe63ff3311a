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

//! Bluetooth communication module.
//!
//! Command correlation and move notifications on top of an abstract GATT
//! transport, plus a BlueZ implementation of that transport.

pub mod ble_constants;
#[cfg(feature = "bluez")]
mod bluez;
mod move_handler;
pub mod protocol;
mod rw_handler;
mod transport;

pub use ble_constants::{COMMAND_REQ_UUID, COMMAND_RESP_UUID, MOVE_CHAR_UUID};
#[cfg(feature = "bluez")]
pub use bluez::BluezTransport;
pub use move_handler::{MoveEvent, MoveHandler, Observer, ObserverId};
pub use protocol::{BatteryInfo, ChargeState, CommandCode, MOVE_FRAME_LEN};
pub use rw_handler::RwHandler;
pub use transport::{NotificationStream, Transport};
