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

//! BlueZ GATT client transport.
//!
//! Connects to a cube at a known address; discovery is not handled here.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bluer::gatt::remote::Characteristic;
use bluer::{Adapter, Address, Device, Session};
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::transport::{NotificationStream, Transport};
use crate::config::BluetoothConfig;
use crate::error::TransportError;

/// Frames buffered per subscription before the forwarder waits.
const NOTIFY_BUFFER: usize = 64;

/// Polls while BlueZ resolves the remote services.
const RESOLVE_POLL: Duration = Duration::from_millis(100);
const RESOLVE_ATTEMPTS: u32 = 50;

/// Remote characteristics of the connected device, keyed by UUID.
///
/// Filled once when the link comes up; `None` while disconnected.
struct CharacteristicMap<C> {
    entries: Option<HashMap<Uuid, C>>,
}

impl<C: Clone> CharacteristicMap<C> {
    fn new() -> Self {
        Self { entries: None }
    }

    fn fill(&mut self, entries: impl IntoIterator<Item = (Uuid, C)>) {
        self.entries = Some(entries.into_iter().collect());
    }

    fn clear(&mut self) {
        self.entries = None;
    }

    fn get(&self, uuid: Uuid) -> Result<C, TransportError> {
        let entries = self.entries.as_ref().ok_or(TransportError::NotConnected)?;
        entries
            .get(&uuid)
            .cloned()
            .ok_or(TransportError::CharacteristicNotFound(uuid))
    }
}

/// [`Transport`] backed by the system BlueZ daemon.
pub struct BluezTransport {
    _session: Session,
    adapter: Adapter,
    address: Address,
    device: tokio::sync::Mutex<Option<Device>>,
    characteristics: Mutex<CharacteristicMap<Characteristic>>,
    forwarders: Mutex<Vec<AbortHandle>>,
}

impl BluezTransport {
    /// Open a BlueZ session for the cube at `address`.
    pub async fn new(address: &str) -> Result<Self> {
        let address: Address = address
            .parse()
            .with_context(|| format!("invalid Bluetooth address '{}'", address))?;

        // Create BlueZ session
        let session = Session::new().await?;
        let adapter = session.default_adapter().await?;
        info!("Using Bluetooth adapter: {}", adapter.name());

        // Ensure adapter is powered on
        if !adapter.is_powered().await? {
            info!("Powering on Bluetooth adapter...");
            adapter.set_powered(true).await?;
        }

        Ok(Self {
            _session: session,
            adapter,
            address,
            device: tokio::sync::Mutex::new(None),
            characteristics: Mutex::new(CharacteristicMap::new()),
            forwarders: Mutex::new(Vec::new()),
        })
    }

    /// Open a session for the address in the configuration.
    pub async fn from_config(config: &BluetoothConfig) -> Result<Self> {
        let address = config
            .device_address
            .as_deref()
            .context("bluetooth.device_address is not configured")?;
        Self::new(address).await
    }

    /// Walk the remote services once and collect every characteristic.
    async fn discover_characteristics(
        device: &Device,
    ) -> Result<Vec<(Uuid, Characteristic)>, TransportError> {
        let services = device
            .services()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let mut found = Vec::new();
        for service in services {
            let Ok(characteristics) = service.characteristics().await else {
                continue;
            };
            for characteristic in characteristics {
                if let Ok(uuid) = characteristic.uuid().await {
                    found.push((uuid, characteristic));
                }
            }
        }
        debug!("Discovered {} characteristics", found.len());
        Ok(found)
    }

    async fn wait_services_resolved(device: &Device) -> Result<(), TransportError> {
        for _ in 0..RESOLVE_ATTEMPTS {
            if device.is_services_resolved().await.unwrap_or(false) {
                return Ok(());
            }
            tokio::time::sleep(RESOLVE_POLL).await;
        }
        Err(TransportError::Connect(
            "timed out resolving GATT services".to_string(),
        ))
    }
}

#[async_trait]
impl Transport for BluezTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let mut slot = self.device.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let device = self
            .adapter
            .device(self.address)
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        if !device.is_connected().await.unwrap_or(false) {
            info!("Connecting to {}", self.address);
            device
                .connect()
                .await
                .map_err(|e| TransportError::Connect(e.to_string()))?;
        }
        Self::wait_services_resolved(&device).await?;
        let characteristics = Self::discover_characteristics(&device).await?;
        self.characteristics.lock().fill(characteristics);

        info!("Connected to {}", self.address);
        *slot = Some(device);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        for forwarder in self.forwarders.lock().drain(..) {
            forwarder.abort();
        }
        self.characteristics.lock().clear();

        let Some(device) = self.device.lock().await.take() else {
            return Ok(());
        };
        device
            .disconnect()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        info!("Disconnected from {}", self.address);
        Ok(())
    }

    async fn write(&self, characteristic: Uuid, data: &[u8]) -> Result<(), TransportError> {
        let target = self.characteristics.lock().get(characteristic)?;
        target
            .write(data)
            .await
            .map_err(|e| TransportError::Write {
                characteristic,
                reason: e.to_string(),
            })
    }

    async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream, TransportError> {
        let source = self.characteristics.lock().get(characteristic)?;
        let (tx, rx) = mpsc::channel(NOTIFY_BUFFER);
        let (ready_tx, ready_rx) = oneshot::channel();

        let forwarder = tokio::spawn(async move {
            let notifications = match source.notify().await {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            futures::pin_mut!(notifications);

            while let Some(value) = notifications.next().await {
                if tx.send(value).await.is_err() {
                    break;
                }
            }
            debug!("Notifications from {} ended", characteristic);
        });
        self.forwarders.lock().push(forwarder.abort_handle());

        let ready = ready_rx.await.map_err(|_| TransportError::Subscribe {
            characteristic,
            reason: "notification task ended".to_string(),
        })?;
        ready.map_err(|reason| TransportError::Subscribe {
            characteristic,
            reason,
        })?;

        debug!("Subscribed to {}", characteristic);
        Ok(rx)
    }
}
