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

//! Cube device facade.
//!
//! Owns the transport and both protocol handlers, tracks the connection
//! status and exposes the query commands.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::bluetooth::protocol::{self, BatteryInfo, CommandCode};
use crate::bluetooth::{MoveHandler, RwHandler, Transport};
use crate::config::BluetoothConfig;
use crate::cube::CubeState;
use crate::error::{Result, TransportError};
use crate::state::{ConnectionStatus, SessionState};

/// A connected (or connectable) GiiKER cube.
pub struct CubeDevice {
    transport: Arc<dyn Transport>,
    rw_handler: Arc<RwHandler>,
    move_handler: Arc<MoveHandler>,
    session: Arc<SessionState>,
    config: BluetoothConfig,
    tasks: Mutex<Vec<AbortHandle>>,
    lifecycle: tokio::sync::Mutex<()>,
}

impl CubeDevice {
    pub fn new(transport: Arc<dyn Transport>, config: BluetoothConfig) -> Self {
        Self {
            rw_handler: Arc::new(RwHandler::new(transport.clone())),
            move_handler: MoveHandler::new(),
            transport,
            session: SessionState::new(),
            config,
            tasks: Mutex::new(Vec::new()),
            lifecycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Connect the transport and both handlers.
    ///
    /// Returns once the first move notification arrived. Does nothing if
    /// already connected. Concurrent calls are serialized; the later ones
    /// see the connection made by the first.
    pub async fn connect(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.session.is_connected() {
            return Ok(());
        }

        self.session.set_connecting();
        match self.establish().await {
            Ok(()) => {
                info!("Connected to GiiKER cube");
                Ok(())
            }
            Err(e) => {
                warn!("Connecting to cube failed: {}", e);
                self.abort_tasks();
                if let Err(e) = self.transport.disconnect().await {
                    debug!("Cleanup disconnect failed: {}", e);
                }
                self.session.set_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn establish(&self) -> Result<()> {
        // Tasks of a link that dropped on its own are finished but still listed.
        self.abort_tasks();
        self.transport.connect().await?;

        let responses = self.rw_handler.connect().await?;
        self.tasks.lock().push(responses.abort_handle());

        let moves = self
            .move_handler
            .connect(self.transport.as_ref(), self.config.connect_timeout())
            .await?;
        self.tasks.lock().push(moves.abort_handle());
        self.session.set_connected();

        // The response stream ending is how the transport reports a lost link.
        let session = self.session.clone();
        let watcher = tokio::spawn(async move {
            let _ = responses.await;
            if session.is_connected() {
                session.set_disconnected();
                info!("Disconnected from GiiKER cube");
            }
        });
        self.tasks.lock().push(watcher.abort_handle());
        Ok(())
    }

    /// Disconnect and fail every pending query.
    pub async fn disconnect(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.session.get_status() == ConnectionStatus::Disconnected {
            return Ok(());
        }

        let result = self.transport.disconnect().await;
        self.abort_tasks();
        self.rw_handler.fail_pending().await;
        self.session.set_disconnected();
        info!("Disconnected from GiiKER cube");
        result.map_err(Into::into)
    }

    fn abort_tasks(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.session.get_status()
    }

    pub fn session(&self) -> Arc<SessionState> {
        self.session.clone()
    }

    /// Observer registry and current state.
    pub fn move_handler(&self) -> &Arc<MoveHandler> {
        &self.move_handler
    }

    pub fn current_state(&self) -> Option<CubeState> {
        self.move_handler.current_state()
    }

    async fn request(&self, command: CommandCode) -> Result<Vec<u8>> {
        if !self.session.is_connected() {
            return Err(TransportError::NotConnected.into());
        }

        let request = command.request();
        let send = self.rw_handler.send(&request);
        match self.config.response_timeout() {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => send.await,
        }
    }

    /// Query the 6-byte unique id.
    pub async fn query_uid(&self) -> Result<[u8; 6]> {
        let frame = self.request(CommandCode::GetUid).await?;
        let uid = protocol::parse_uid(&frame)?;
        debug!("UID: {}", hex::encode(uid));
        Ok(uid)
    }

    pub async fn query_firmware_version(&self) -> Result<u8> {
        let frame = self.request(CommandCode::GetFirmwareVersion).await?;
        let version = protocol::parse_firmware_version(&frame)?;
        debug!("Firmware version: {:02x}", version);
        Ok(version)
    }

    /// Query battery level and charging state.
    pub async fn query_battery(&self) -> Result<BatteryInfo> {
        let frame = self.request(CommandCode::GetBattery).await?;
        let info = protocol::parse_battery(&frame)?;
        debug!("Battery: {}", info);
        Ok(info)
    }

    /// Query the total number of moves the cube has counted.
    pub async fn query_move_count(&self) -> Result<u32> {
        let frame = self.request(CommandCode::GetMoveCount).await?;
        let count = protocol::parse_move_count(&frame)?;
        debug!("Move count: {}", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluetooth::{NotificationStream, MOVE_CHAR_UUID};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    // Solved state followed by a U move.
    const GREETING: &str = "1234567833333333123456789abc000011";

    #[derive(Default)]
    struct FlakyLink {
        senders: Mutex<Vec<mpsc::Sender<Vec<u8>>>>,
    }

    impl FlakyLink {
        fn drop_link(&self) {
            self.senders.lock().clear();
        }
    }

    #[async_trait]
    impl Transport for FlakyLink {
        async fn connect(&self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), TransportError> {
            self.drop_link();
            Ok(())
        }

        async fn write(&self, _characteristic: Uuid, _data: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }

        async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream, TransportError> {
            let (tx, rx) = mpsc::channel(4);
            if characteristic == MOVE_CHAR_UUID {
                tx.try_send(hex::decode(GREETING).unwrap()).unwrap();
            }
            self.senders.lock().push(tx);
            Ok(rx)
        }
    }

    async fn wait_for_status(device: &CubeDevice, status: ConnectionStatus) {
        for _ in 0..200 {
            if device.status() == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("status stayed {:?}, expected {:?}", device.status(), status);
    }

    #[tokio::test]
    async fn test_reconnect_after_link_loss_replaces_tasks() {
        let link = Arc::new(FlakyLink::default());
        let device = CubeDevice::new(link.clone(), BluetoothConfig::default());

        device.connect().await.unwrap();
        assert_eq!(device.tasks.lock().len(), 3);

        link.drop_link();
        wait_for_status(&device, ConnectionStatus::Disconnected).await;

        device.connect().await.unwrap();
        assert_eq!(device.tasks.lock().len(), 3);
        assert!(device.session.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_clears_tasks() {
        let link = Arc::new(FlakyLink::default());
        let device = CubeDevice::new(link.clone(), BluetoothConfig::default());

        device.connect().await.unwrap();
        device.disconnect().await.unwrap();
        assert!(device.tasks.lock().is_empty());
        assert_eq!(device.status(), ConnectionStatus::Disconnected);
    }
}
