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

//! Move notifications: decoding, current cube state, observer fan-out.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ble_constants::MOVE_CHAR_UUID;
use super::protocol::split_move_frame;
use super::transport::Transport;
use crate::cube::{CubeState, Move};
use crate::error::{ProtocolError, Result, TransportError};

/// Callback invoked with the new state and the move that produced it.
pub type Observer = Arc<dyn Fn(&CubeState, Move) + Send + Sync>;

/// Handle returned by [`MoveHandler::register_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// One decoded move notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEvent {
    pub state: CubeState,
    pub mv: Move,
}

struct Inner {
    current: Option<CubeState>,
    observers: Vec<(ObserverId, Observer)>,
    next_id: u64,
}

/// Holds the authoritative cube state and notifies observers of every move.
pub struct MoveHandler {
    inner: Mutex<Inner>,
    dispatch: Mutex<()>,
}

impl Default for MoveHandler {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: None,
                observers: Vec::new(),
                next_id: 0,
            }),
            dispatch: Mutex::new(()),
        }
    }
}

impl MoveHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Subscribe to move notifications and wait for the first one.
    ///
    /// The cube sends its state shortly after notifications are enabled, so
    /// the first frame proves the stream is live. Fails with
    /// [`TransportError::Disconnected`] if the stream ends before that, or
    /// [`TransportError::Timeout`] once `limit` elapses.
    /// The returned task runs until the stream ends.
    pub async fn connect(
        self: &Arc<Self>,
        transport: &dyn Transport,
        limit: Option<Duration>,
    ) -> Result<JoinHandle<()>> {
        let mut frames = transport.subscribe(MOVE_CHAR_UUID).await?;

        let (first_tx, first_rx) = oneshot::channel();
        let first_tx = Mutex::new(Some(first_tx));
        let first_id = self.register_observer(move |_, _| {
            if let Some(tx) = first_tx.lock().take() {
                let _ = tx.send(());
            }
        });

        let (closed_tx, closed_rx) = oneshot::channel::<()>();
        let handler = Arc::clone(self);
        let pump = tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                if let Err(e) = handler.on_notification(&frame) {
                    warn!("Dropping move notification {}: {}", hex::encode(&frame), e);
                }
            }
            info!("Move notification stream closed");
            let _ = closed_tx.send(());
        });

        let deadline = async {
            match limit {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };

        let outcome = tokio::select! {
            biased;
            first = first_rx => first.map_err(|_| TransportError::Disconnected),
            _ = closed_rx => Err(TransportError::Disconnected),
            _ = deadline => Err(TransportError::Timeout(limit.unwrap_or_default())),
        };
        self.unregister_observer(first_id);

        if let Err(e) = outcome {
            pump.abort();
            return Err(e.into());
        }
        info!("Move notifications live");
        Ok(pump)
    }

    /// Register an observer; it runs for every notification processed
    /// after this call returns.
    pub fn register_observer<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&CubeState, Move) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unregister_observer(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(oid, _)| *oid != id);
        inner.observers.len() != before
    }

    /// Receive every move as a [`MoveEvent`] on a channel.
    ///
    /// Events sent after the receiver is dropped are discarded; unregister
    /// the returned id to stop forwarding altogether.
    pub fn subscribe(&self) -> (ObserverId, async_channel::Receiver<MoveEvent>) {
        let (tx, rx) = async_channel::unbounded();
        let id = self.register_observer(move |state, mv| {
            let _ = tx.try_send(MoveEvent {
                state: state.clone(),
                mv,
            });
        });
        (id, rx)
    }

    /// Latest decoded state, `None` before the first notification.
    pub fn current_state(&self) -> Option<CubeState> {
        self.inner.lock().current.clone()
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }

    /// Decode a move notification, store the state and notify observers.
    pub fn on_notification(&self, frame: &[u8]) -> Result<(), ProtocolError> {
        let (payload, mv) = split_move_frame(frame)?;
        let state = CubeState::decode(payload)?;
        debug!("move <- {} ({})", hex::encode(frame), mv);

        // Held across dispatch so observers see moves in arrival order.
        let _dispatch = self.dispatch.lock();

        let observers: Vec<Observer> = {
            let mut inner = self.inner.lock();
            inner.current = Some(state.clone());
            inner.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
        };

        for observer in observers {
            observer(&state, mv);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluetooth::transport::NotificationStream;
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    const SOLVED: &str = "1234567833333333123456789abc0000";
    const AFTER_R: &str = "1273568433113311123756c49ab80000";
    const AFTER_U: &str = "123485673333333312345678c9ab0000";

    fn frame(state: &str, mv: Move) -> Vec<u8> {
        let mut bytes = hex::decode(state).unwrap();
        bytes.push(mv.code());
        bytes
    }

    struct StreamTransport {
        stream: parking_lot::Mutex<Option<NotificationStream>>,
    }

    impl StreamTransport {
        fn new() -> (Self, mpsc::Sender<Vec<u8>>) {
            let (tx, rx) = mpsc::channel(8);
            let transport = Self {
                stream: parking_lot::Mutex::new(Some(rx)),
            };
            (transport, tx)
        }
    }

    #[async_trait]
    impl Transport for StreamTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn write(&self, _characteristic: Uuid, _data: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }

        async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream, TransportError> {
            self.stream
                .lock()
                .take()
                .ok_or(TransportError::Subscribe {
                    characteristic,
                    reason: "already subscribed".to_string(),
                })
        }
    }

    #[test]
    fn test_observers_called_in_order_with_same_arguments() {
        let handler = MoveHandler::new();
        let calls: Arc<Mutex<Vec<(&str, CubeState, Move)>>> = Arc::default();

        let a = calls.clone();
        handler.register_observer(move |s, m| a.lock().push(("a", s.clone(), m)));
        let b = calls.clone();
        handler.register_observer(move |s, m| b.lock().push(("b", s.clone(), m)));

        handler.on_notification(&frame(AFTER_R, Move::R)).unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "a");
        assert_eq!(calls[1].0, "b");
        assert_eq!(calls[0].1, calls[1].1);
        assert_eq!(calls[0].2, Move::R);
        assert_eq!(calls[1].2, Move::R);
        assert!(calls[0]
            .1
            .matches_ignoring_centers(&CubeState::solved().apply_move(Move::R)));
    }

    #[test]
    fn test_unregistered_observer_not_called() {
        let handler = MoveHandler::new();
        let count = Arc::new(Mutex::new(0));

        let c = count.clone();
        let id = handler.register_observer(move |_, _| *c.lock() += 1);
        handler.on_notification(&frame(SOLVED, Move::R)).unwrap();
        assert!(handler.unregister_observer(id));
        assert!(!handler.unregister_observer(id));
        handler.on_notification(&frame(SOLVED, Move::U)).unwrap();

        assert_eq!(*count.lock(), 1);
        assert_eq!(handler.observer_count(), 0);
    }

    #[test]
    fn test_observer_may_register_during_dispatch() {
        let handler = MoveHandler::new();
        let late_calls = Arc::new(Mutex::new(0));

        let h = handler.clone();
        let late = late_calls.clone();
        handler.register_observer(move |_, _| {
            let late = late.clone();
            h.register_observer(move |_, _| *late.lock() += 1);
        });

        handler.on_notification(&frame(AFTER_R, Move::R)).unwrap();
        assert_eq!(*late_calls.lock(), 0);
        handler.on_notification(&frame(AFTER_U, Move::U)).unwrap();
        assert_eq!(*late_calls.lock(), 1);
    }

    #[test]
    fn test_current_state_tracks_latest_frame() {
        let handler = MoveHandler::new();
        assert!(handler.current_state().is_none());

        handler.on_notification(&frame(AFTER_U, Move::U)).unwrap();
        let state = handler.current_state().unwrap();
        assert!(state.matches_ignoring_centers(&CubeState::solved().apply_move(Move::U)));
    }

    #[test]
    fn test_bad_frames_leave_state_untouched() {
        let handler = MoveHandler::new();
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();
        handler.register_observer(move |_, _| *c.lock() += 1);

        let mut unknown_move = frame(SOLVED, Move::R);
        unknown_move[16] = 0x77;
        assert_eq!(
            handler.on_notification(&unknown_move),
            Err(ProtocolError::UnknownMove(0x77))
        );

        let mut bad_padding = frame(SOLVED, Move::R);
        bad_padding[15] = 0x01;
        assert_eq!(
            handler.on_notification(&bad_padding),
            Err(ProtocolError::MalformedPadding(0x1))
        );

        assert!(handler.on_notification(&[0x31]).is_err());
        assert!(handler.current_state().is_none());
        assert_eq!(*count.lock(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_receives_events() {
        let handler = MoveHandler::new();
        let (_id, events) = handler.subscribe();

        handler.on_notification(&frame(AFTER_R, Move::R)).unwrap();
        let event = events.recv().await.unwrap();
        assert_eq!(event.mv, Move::R);
        assert_eq!(Some(event.state), handler.current_state());
    }

    #[tokio::test]
    async fn test_connect_waits_for_first_notification() {
        let handler = MoveHandler::new();
        let (transport, frames) = StreamTransport::new();

        let connecting = tokio::spawn({
            let handler = handler.clone();
            async move { handler.connect(&transport, None).await.map(|_| ()) }
        });

        tokio::task::yield_now().await;
        assert!(!connecting.is_finished());

        frames.send(frame(SOLVED, Move::U)).await.unwrap();
        connecting.await.unwrap().unwrap();

        assert!(handler.current_state().is_some());
        assert_eq!(handler.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_fails_when_stream_closes_first() {
        let handler = MoveHandler::new();
        let (transport, frames) = StreamTransport::new();
        drop(frames);

        let result = handler.connect(&transport, None).await;
        assert!(matches!(
            result,
            Err(crate::error::Error::Transport(TransportError::Disconnected))
        ));
        assert_eq!(handler.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_times_out_on_silent_stream() {
        let handler = MoveHandler::new();
        let (transport, _frames) = StreamTransport::new();

        let limit = Duration::from_millis(20);
        let result = handler.connect(&transport, Some(limit)).await;
        assert!(matches!(
            result,
            Err(crate::error::Error::Transport(TransportError::Timeout(d))) if d == limit
        ));
        assert_eq!(handler.observer_count(), 0);
    }
}
