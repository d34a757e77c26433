// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process socket session for deterministic tests.
//!
//! `TestClient` holds the outbound receiver a real socket task would
//! forward to the wire, so tests can assert exactly which events a
//! session was sent.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use resolvenow_bus::{ConnectionId, EventKind, EventRouter, OutboundEvent, RoomKey};
use resolvenow_core::{ComplaintId, Identity, ResolveError};
use resolvenow_ledger::ComplaintService;

pub struct TestClient {
    conn: ConnectionId,
    events: mpsc::Receiver<OutboundEvent>,
    router: Arc<EventRouter>,
    service: ComplaintService,
}

impl TestClient {
    pub(crate) fn connect(service: &ComplaintService) -> Self {
        let router = service.router().clone();
        let (conn, events) = router.connect();
        Self {
            conn,
            events,
            router,
            service: service.clone(),
        }
    }

    pub fn conn(&self) -> ConnectionId {
        self.conn
    }

    pub fn authenticate(&self, identity: Identity) -> Result<(), ResolveError> {
        self.router.authenticate(self.conn, identity)
    }

    /// Joins a complaint room through the access-checked path.
    pub async fn join_complaint(&self, id: &ComplaintId) -> Result<(), ResolveError> {
        self.service.join_complaint_room(self.conn, id).await
    }

    pub fn leave_complaint(&self, id: &ComplaintId) {
        self.service.leave_complaint_room(self.conn, id);
    }

    pub fn is_member_of(&self, room: &RoomKey) -> bool {
        self.router.registry().members_of(room).contains(&self.conn)
    }

    /// Drains every event delivered so far.
    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }

    /// Drained events of one kind.
    pub fn drain_kind(&mut self, kind: EventKind) -> Vec<OutboundEvent> {
        self.drain().into_iter().filter(|e| e.event == kind).collect()
    }

    /// Waits up to `timeout` for the next event.
    pub async fn next_event(&mut self, timeout: Duration) -> Option<OutboundEvent> {
        tokio::time::timeout(timeout, self.events.recv())
            .await
            .ok()
            .flatten()
    }

    /// Ends the session, leaving every room.
    pub fn disconnect(self) -> ConnectionId {
        self.router.disconnect(self.conn);
        self.conn
    }
}
