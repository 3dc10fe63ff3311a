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

//! Request/response correlation for command frames.
//!
//! Responses carry no request id, only the command code. Pending requests are
//! therefore queued per code and matched first-in, first-out. This relies on
//! the cube answering same-code requests in the order it received them; the
//! protocol offers no way to check that.
//!
//! A request whose caller stopped waiting (timeout, dropped future) leaves an
//! abandoned slot. Responses skip abandoned slots, so a response the cube
//! never sent cannot block later requests. The price: a response arriving
//! after its request was abandoned goes to the next waiter for that code.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::ble_constants::{COMMAND_REQ_UUID, COMMAND_RESP_UUID};
use super::protocol::CommandCode;
use super::transport::Transport;
use crate::error::{ProtocolError, Result, TransportError};

type Pending = HashMap<u8, VecDeque<oneshot::Sender<Vec<u8>>>>;

/// Sends command frames and hands each response to the oldest waiting
/// request with the same command code.
pub struct RwHandler {
    transport: Arc<dyn Transport>,
    pending: Mutex<Pending>,
}

impl RwHandler {
    /// Create a handler accepting the known command codes.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_codes(transport, CommandCode::ALL.iter().map(CommandCode::as_byte))
    }

    /// Create a handler accepting an explicit set of command codes.
    pub fn with_codes(transport: Arc<dyn Transport>, codes: impl IntoIterator<Item = u8>) -> Self {
        let pending = codes.into_iter().map(|c| (c, VecDeque::new())).collect();
        Self {
            transport,
            pending: Mutex::new(pending),
        }
    }

    /// Subscribe to the response characteristic.
    ///
    /// Spawns the task feeding responses into [`RwHandler::on_notification`].
    /// When the response stream ends every pending request fails with
    /// [`TransportError::Disconnected`]; the returned handle completes then.
    pub async fn connect(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        let mut responses = self.transport.subscribe(COMMAND_RESP_UUID).await?;
        let handler = Arc::clone(self);

        let task = tokio::spawn(async move {
            while let Some(frame) = responses.recv().await {
                handler.on_notification(&frame).await;
            }
            info!("Command response stream closed");
            handler.fail_pending().await;
        });

        Ok(task)
    }

    /// Send a request frame and wait for its response.
    ///
    /// The wait is unbounded; callers wanting a deadline wrap this in a
    /// timeout. Cancelling the wait abandons the slot.
    pub async fn send(&self, request: &[u8]) -> Result<Vec<u8>> {
        let code = *request.first().ok_or(ProtocolError::EmptyFrame)?;

        let response = {
            let mut pending = self.pending.lock().await;
            let queue = pending
                .get_mut(&code)
                .ok_or(ProtocolError::UnknownCommand(code))?;

            queue.retain(|waiter| !waiter.is_closed());
            let (tx, rx) = oneshot::channel();
            queue.push_back(tx);
            debug!("req  -> {}", hex::encode(request));

            // Written under the lock so the device sees requests in queue order.
            if let Err(e) = self.transport.write(COMMAND_REQ_UUID, request).await {
                queue.pop_back();
                return Err(e.into());
            }
            rx
        };

        response
            .await
            .map_err(|_| TransportError::Disconnected.into())
    }

    /// Route one inbound response frame.
    ///
    /// Frames for unknown codes or with nobody waiting are dropped.
    pub async fn on_notification(&self, frame: &[u8]) {
        let mut pending = self.pending.lock().await;

        let Some(&code) = frame.first() else {
            debug!("Dropping empty response frame");
            return;
        };

        let Some(queue) = pending.get_mut(&code) else {
            debug!(
                "Received unexpected response for command 0x{:02x}: {}",
                code,
                hex::encode(frame)
            );
            return;
        };

        let abandoned = queue.iter().take_while(|w| w.is_closed()).count();
        if abandoned > 0 {
            debug!("Skipping {} abandoned request(s) for command 0x{:02x}", abandoned, code);
            queue.drain(..abandoned);
        }

        let Some(waiter) = queue.pop_front() else {
            debug!(
                "Received unsolicited response for command 0x{:02x}: {}",
                code,
                hex::encode(frame)
            );
            return;
        };

        debug!("resp <- {}", hex::encode(frame));
        if waiter.send(frame.to_vec()).is_err() {
            debug!("Requester for command 0x{:02x} stopped waiting", code);
        }
    }

    /// Fail every outstanding request with [`TransportError::Disconnected`].
    pub async fn fail_pending(&self) {
        let mut pending = self.pending.lock().await;
        let dropped: usize = pending.values_mut().map(|q| q.drain(..).count()).sum();
        if dropped > 0 {
            info!("Failed {} pending request(s) after disconnect", dropped);
        }
    }

    /// Number of requests still waiting for a response with the given code.
    pub async fn pending_count(&self, code: u8) -> usize {
        self.pending
            .lock()
            .await
            .get(&code)
            .map_or(0, |queue| queue.iter().filter(|w| !w.is_closed()).count())
    }
}
