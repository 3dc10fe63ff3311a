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

//! Driver core for GiiKER Bluetooth smart cubes.
//!
//! Tracks the cube state from move notifications and issues query commands
//! over any [`bluetooth::Transport`]. Enable the `bluez` feature for a
//! transport backed by the system Bluetooth daemon.

pub mod bluetooth;
pub mod config;
pub mod cube;
pub mod device;
pub mod error;
pub mod logging;
pub mod state;

pub use device::CubeDevice;
pub use error::{Error, ProtocolError, Result, TransportError};
