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

//! Abstract byte channel to a cube.

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::TransportError;

/// Inbound frames from one subscribed characteristic.
///
/// The stream ending (`recv()` returning `None`) means the device went away.
pub type NotificationStream = mpsc::Receiver<Vec<u8>>;

/// GATT-style duplex channel the driver runs on.
///
/// Implementations own the link itself; the driver only writes frames to
/// characteristics and consumes the notification streams it subscribed to.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the link.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Tear the link down. Open notification streams end.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Write one frame to a characteristic.
    async fn write(&self, characteristic: Uuid, data: &[u8]) -> Result<(), TransportError>;

    /// Start receiving notifications from a characteristic.
    async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream, TransportError>;
}
