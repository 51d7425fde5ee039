//! Per-connection outboxes and view coalescing.
//!
//! Each connection gets two lanes. Control frames (such as `superseded`) go
//! through a bounded FIFO. Views go through a single-slot `watch` channel
//! that always holds the newest projection, so a slow reader skips straight
//! to the latest view and never sees an older one after a newer one. Views
//! are only offered when they differ from the last one placed in the slot.

use std::collections::BTreeMap;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use game_core::View;

use crate::api::ServerMessage;
use crate::sessions::ConnectionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The view equals the last delivered one.
    Unchanged,
    /// The control lane is full; the frame was dropped.
    Full,
    /// The receiving side is gone.
    Closed,
    UnknownConnection,
}

/// Receiving end of one connection's frames, drained by its transport.
#[derive(Debug)]
pub struct Outbox {
    control: mpsc::Receiver<ServerMessage>,
    views: watch::Receiver<Option<ServerMessage>>,
}

impl Outbox {
    /// Waits for the next frame. Control frames go first; a pending view is
    /// always the newest one. Returns `None` once the connection is closed.
    ///
    /// Cancel safe, so it can sit in a `select!` next to the socket reader.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        loop {
            tokio::select! {
                biased;
                frame = self.control.recv() => return frame,
                changed = self.views.changed() => {
                    changed.ok()?;
                    if let Some(frame) = self.views.borrow_and_update().clone() {
                        return Some(frame);
                    }
                }
            }
        }
    }

    /// Returns a frame that is ready now, if any.
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        if let Ok(frame) = self.control.try_recv() {
            return Some(frame);
        }
        if self.views.has_changed().unwrap_or(false) {
            return self.views.borrow_and_update().clone();
        }
        None
    }
}

struct Route {
    control: mpsc::Sender<ServerMessage>,
    views: watch::Sender<Option<ServerMessage>>,
    delivered: Option<View>,
}

pub struct PushFanout {
    capacity: usize,
    routes: BTreeMap<ConnectionId, Route>,
}

impl PushFanout {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            routes: BTreeMap::new(),
        }
    }

    /// Creates the outbox for `connection` and returns its receiving end.
    pub fn open(&mut self, connection: ConnectionId) -> Outbox {
        let (control_tx, control_rx) = mpsc::channel(self.capacity);
        let (views_tx, views_rx) = watch::channel(None);
        self.routes.insert(
            connection,
            Route {
                control: control_tx,
                views: views_tx,
                delivered: None,
            },
        );
        Outbox {
            control: control_rx,
            views: views_rx,
        }
    }

    pub fn close(&mut self, connection: ConnectionId) -> bool {
        self.routes.remove(&connection).is_some()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Queues a control frame.
    pub fn send(&mut self, connection: ConnectionId, message: ServerMessage) -> Delivery {
        let Some(route) = self.routes.get(&connection) else {
            return Delivery::UnknownConnection;
        };
        match route.control.try_send(message) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => {
                warn!(
                    target: "runtime::push",
                    %connection,
                    "control lane full, dropping frame"
                );
                Delivery::Full
            }
            Err(TrySendError::Closed(_)) => {
                debug!(target: "runtime::push", %connection, "outbox closed");
                Delivery::Closed
            }
        }
    }

    /// Replaces the pending view unless it equals the last one offered.
    pub fn push_view(&mut self, connection: ConnectionId, revision: u64, view: View) -> Delivery {
        let Some(route) = self.routes.get_mut(&connection) else {
            return Delivery::UnknownConnection;
        };
        if route.views.is_closed() {
            debug!(target: "runtime::push", %connection, "outbox closed");
            return Delivery::Closed;
        }
        if route.delivered.as_ref() == Some(&view) {
            return Delivery::Unchanged;
        }
        route.views.send_replace(Some(ServerMessage::View {
            revision,
            view: Box::new(view.clone()),
        }));
        route.delivered = Some(view);
        Delivery::Sent
    }
}
