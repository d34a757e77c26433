// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain events and their fixed routing table.
//!
//! | Event                | Delivered to                                          |
//! |----------------------|-------------------------------------------------------|
//! | `complaint.created`  | `staff`                                               |
//! | `complaint.assigned` | `user:<agent>`                                        |
//! | `complaint.updated`  | `user:<submitter>`, `complaint:<id>`                  |
//! | `message.sent`       | `complaint:<id>` (full), `user:<p>` for p != sender (summary) |

use serde::Serialize;
use serde_json::json;
use strum::{Display, EnumString};

use resolvenow_core::{Complaint, Message, UserId};

use crate::rooms::RoomKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
pub enum EventKind {
    #[strum(serialize = "complaint.created")]
    #[serde(rename = "complaint.created")]
    ComplaintCreated,
    #[strum(serialize = "complaint.assigned")]
    #[serde(rename = "complaint.assigned")]
    ComplaintAssigned,
    #[strum(serialize = "complaint.updated")]
    #[serde(rename = "complaint.updated")]
    ComplaintUpdated,
    #[strum(serialize = "message.sent")]
    #[serde(rename = "message.sent")]
    MessageSent,
}

/// Something that happened to a complaint and may interest live sessions.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    ComplaintCreated {
        complaint: Complaint,
    },
    ComplaintAssigned {
        complaint: Complaint,
        agent: UserId,
    },
    ComplaintUpdated {
        complaint: Complaint,
    },
    MessageSent {
        complaint: Complaint,
        message: Message,
        sender_name: String,
    },
}

/// One payload addressed to one room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEvent {
    pub event: EventKind,
    pub room: String,
    pub data: serde_json::Value,
}

impl OutboundEvent {
    fn new(event: EventKind, room: &RoomKey, data: serde_json::Value) -> (RoomKey, Self) {
        (
            room.clone(),
            Self {
                event,
                room: room.to_string(),
                data,
            },
        )
    }
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::ComplaintCreated { .. } => EventKind::ComplaintCreated,
            DomainEvent::ComplaintAssigned { .. } => EventKind::ComplaintAssigned,
            DomainEvent::ComplaintUpdated { .. } => EventKind::ComplaintUpdated,
            DomainEvent::MessageSent { .. } => EventKind::MessageSent,
        }
    }

    pub fn complaint(&self) -> &Complaint {
        match self {
            DomainEvent::ComplaintCreated { complaint }
            | DomainEvent::ComplaintAssigned { complaint, .. }
            | DomainEvent::ComplaintUpdated { complaint }
            | DomainEvent::MessageSent { complaint, .. } => complaint,
        }
    }

    /// Expands the event into per-room payloads, in delivery order.
    pub fn route(&self) -> Result<Vec<(RoomKey, OutboundEvent)>, serde_json::Error> {
        let kind = self.kind();
        let out = match self {
            DomainEvent::ComplaintCreated { complaint } => {
                vec![OutboundEvent::new(
                    kind,
                    &RoomKey::Staff,
                    serde_json::to_value(complaint)?,
                )]
            }
            DomainEvent::ComplaintAssigned { complaint, agent } => {
                vec![OutboundEvent::new(
                    kind,
                    &RoomKey::User(agent.clone()),
                    serde_json::to_value(complaint)?,
                )]
            }
            DomainEvent::ComplaintUpdated { complaint } => {
                let data = serde_json::to_value(complaint)?;
                vec![
                    OutboundEvent::new(kind, &RoomKey::User(complaint.submitter.clone()), data.clone()),
                    OutboundEvent::new(
                        kind,
                        &RoomKey::Complaint(complaint.complaint_id.clone()),
                        data,
                    ),
                ]
            }
            DomainEvent::MessageSent {
                complaint,
                message,
                sender_name,
            } => {
                let mut out = vec![OutboundEvent::new(
                    kind,
                    &RoomKey::Complaint(complaint.complaint_id.clone()),
                    serde_json::to_value(message)?,
                )];
                let summary = json!({
                    "complaintId": complaint.complaint_id,
                    "complaintTitle": complaint.title,
                    "senderName": sender_name,
                    "message": message.text,
                });
                for participant in complaint.participants() {
                    if participant != &message.sender {
                        out.push(OutboundEvent::new(
                            kind,
                            &RoomKey::User(participant.clone()),
                            summary.clone(),
                        ));
                    }
                }
                out
            }
        };
        Ok(out)
    }
}
