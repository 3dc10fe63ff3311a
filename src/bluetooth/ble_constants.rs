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

//! BLE characteristic UUIDs of GiiKER cubes.

use uuid::Uuid;

/// Move notification characteristic UUID (cube state + last move).
/// Properties: Notify
pub const MOVE_CHAR_UUID: Uuid = Uuid::from_u128(0x0000aadc_0000_1000_8000_00805f9b34fb);

/// Command request characteristic UUID (host writes commands here).
/// Properties: Write
pub const COMMAND_REQ_UUID: Uuid = Uuid::from_u128(0x0000aaac_0000_1000_8000_00805f9b34fb);

/// Command response characteristic UUID (cube answers here).
/// Properties: Notify
pub const COMMAND_RESP_UUID: Uuid = Uuid::from_u128(0x0000aaab_0000_1000_8000_00805f9b34fb);
