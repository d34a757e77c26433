// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event router: session lifecycle plus publishing of domain events.
//!
//! One router instance lives for the whole server process and is passed by
//! handle to every component that publishes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error};

use resolvenow_core::{Complaint, ComplaintId, Identity, ResolveError, can_access, ensure_access};

use crate::backend::{BroadcastBackend, DeliveryReport, LocalBroadcast};
use crate::events::{DomainEvent, OutboundEvent};
use crate::rooms::{ConnectionId, RoomKey, RoomRegistry};

pub const DEFAULT_SESSION_BUFFER: usize = 64;

pub struct EventRouter {
    registry: Arc<RoomRegistry>,
    backend: Arc<dyn BroadcastBackend>,
    session_buffer: usize,
}

impl EventRouter {
    pub fn new(
        registry: Arc<RoomRegistry>,
        backend: Arc<dyn BroadcastBackend>,
        session_buffer: usize,
    ) -> Self {
        Self {
            registry,
            backend,
            session_buffer: session_buffer.max(1),
        }
    }

    /// Router delivering through an in-process registry.
    pub fn local(session_buffer: usize) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let backend = Arc::new(LocalBroadcast::new(registry.clone()));
        Self::new(registry, backend, session_buffer)
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Opens an anonymous session and returns its outbound event stream.
    pub fn connect(&self) -> (ConnectionId, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(self.session_buffer);
        (self.registry.register(tx), rx)
    }

    /// Binds a verified identity to the session.
    pub fn authenticate(&self, conn: ConnectionId, identity: Identity) -> Result<(), ResolveError> {
        self.registry.bind_identity(conn, identity)
    }

    /// Joins `complaint:<id>` after checking the session's bound identity
    /// against the access policy. Anonymous sessions are refused.
    pub fn join_complaint_room(
        &self,
        conn: ConnectionId,
        complaint: &Complaint,
    ) -> Result<(), ResolveError> {
        let identity = self.registry.identity_of(conn).ok_or_else(|| {
            ResolveError::AccessDenied("session is not authenticated".into())
        })?;
        ensure_access(&identity, complaint)?;
        self.registry
            .join_room(conn, RoomKey::Complaint(complaint.complaint_id.clone()));
        Ok(())
    }

    pub fn leave_complaint_room(&self, conn: ConnectionId, complaint_id: &ComplaintId) {
        self.registry
            .leave_room(conn, &RoomKey::Complaint(complaint_id.clone()));
    }

    /// Re-checks every session in `complaint:<id>` against the current
    /// document and evicts those that no longer pass the access policy.
    pub fn revoke_stale_viewers(&self, complaint: &Complaint) -> usize {
        let room = RoomKey::Complaint(complaint.complaint_id.clone());
        self.registry
            .retain_members(&room, |identity| can_access(identity, complaint))
    }

    pub fn disconnect(&self, conn: ConnectionId) {
        self.registry.on_disconnect(conn);
    }

    /// Routes and delivers an event. Delivery misses are logged, not raised.
    pub async fn publish(&self, event: DomainEvent) -> DeliveryReport {
        let routed = match event.route() {
            Ok(routed) => routed,
            Err(e) => {
                error!(event = %event.kind(), error = %e, "failed to encode event payload");
                return DeliveryReport::default();
            }
        };

        let mut report = DeliveryReport::default();
        for (room, payload) in routed {
            report += self.backend.deliver(&room, &payload).await;
        }
        debug!(
            event = %event.kind(),
            complaint_id = %event.complaint().complaint_id,
            backend = self.backend.name(),
            delivered = report.delivered,
            dropped = report.dropped,
            "event published"
        );
        report
    }
}
