// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable broadcast backends.
//!
//! The router hands each routed payload to a backend. The default
//! [`LocalBroadcast`] delivers to sessions in this process's registry. A
//! backend fanning out across processes would implement the same trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::events::OutboundEvent;
use crate::rooms::{RoomKey, RoomRegistry};

/// Outcome of delivering one payload to one room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub dropped: usize,
}

impl std::ops::AddAssign for DeliveryReport {
    fn add_assign(&mut self, rhs: Self) {
        self.delivered += rhs.delivered;
        self.dropped += rhs.dropped;
    }
}

#[async_trait]
pub trait BroadcastBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Best-effort delivery. Misses are reported, never raised.
    async fn deliver(&self, room: &RoomKey, event: &OutboundEvent) -> DeliveryReport;
}

/// In-process delivery through the [`RoomRegistry`].
pub struct LocalBroadcast {
    registry: Arc<RoomRegistry>,
}

impl LocalBroadcast {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl BroadcastBackend for LocalBroadcast {
    fn name(&self) -> &str {
        "local"
    }

    async fn deliver(&self, room: &RoomKey, event: &OutboundEvent) -> DeliveryReport {
        let members = self.registry.members_of(room);
        let mut report = DeliveryReport::default();
        if members.is_empty() {
            debug!(%room, event = %event.event, "no sessions in room, event dropped");
            return report;
        }

        for conn in members {
            let Some(tx) = self.registry.sender_of(conn) else {
                continue;
            };
            match tx.try_send(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(%conn, %room, event = %event.event, "session buffer full, event dropped");
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(%conn, %room, "session channel closed, event dropped");
                    report.dropped += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use resolvenow_core::UserId;
    use tokio::sync::mpsc;

    fn event(room: &RoomKey) -> OutboundEvent {
        OutboundEvent {
            event: EventKind::ComplaintUpdated,
            room: room.to_string(),
            data: serde_json::json!({"complaintId": "CMP000001"}),
        }
    }

    #[tokio::test]
    async fn empty_room_is_a_silent_miss() {
        let backend = LocalBroadcast::new(Arc::new(RoomRegistry::new()));
        let room = RoomKey::Staff;
        assert_eq!(backend.deliver(&room, &event(&room)).await, DeliveryReport::default());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn full_buffer_drops_and_logs() {
        let registry = Arc::new(RoomRegistry::new());
        let (tx, mut rx) = mpsc::channel(1);
        let conn = registry.register(tx);
        let room = RoomKey::User(UserId::from("u1"));
        registry.join_room(conn, room.clone());

        let backend = LocalBroadcast::new(registry);
        let first = backend.deliver(&room, &event(&room)).await;
        let second = backend.deliver(&room, &event(&room)).await;
        assert_eq!(first.delivered, 1);
        assert_eq!(second.dropped, 1);
        assert!(logs_contain("session buffer full"));

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }
}
