// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row shapes read from and written to SQLite.
//!
//! Rows hold plain strings so the closures running on the database thread
//! never touch serde or chrono. Conversion to domain types happens on the
//! caller's side.

use chrono::{DateTime, SecondsFormat, Utc};
use resolvenow_core::{
    Complaint, ComplaintId, Message, MessageId, ReadReceipt, ResolveError, User, UserId,
};

pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>, ResolveError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(ResolveError::storage)
}

fn parse_enum<T: std::str::FromStr>(column: &str, value: &str) -> Result<T, ResolveError> {
    value.parse().map_err(|_| {
        ResolveError::Internal(format!("unexpected value `{value}` in column {column}"))
    })
}

/// A complaint row; JSON columns hold the embedded sub-documents.
#[derive(Debug, Clone)]
pub struct ComplaintRow {
    pub complaint_id: String,
    pub ordinal: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub submitter_id: String,
    pub assigned_agent_id: Option<String>,
    pub contact_method: String,
    pub attachments: String,
    pub status_history: String,
    pub feedback: Option<String>,
    pub resolution: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) const COMPLAINT_COLUMNS: &str = "complaint_id, ordinal, title, description, category, \
     priority, status, submitter_id, assigned_agent_id, contact_method, attachments, \
     status_history, feedback, resolution, created_at, updated_at";

impl ComplaintRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            complaint_id: row.get(0)?,
            ordinal: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            priority: row.get(5)?,
            status: row.get(6)?,
            submitter_id: row.get(7)?,
            assigned_agent_id: row.get(8)?,
            contact_method: row.get(9)?,
            attachments: row.get(10)?,
            status_history: row.get(11)?,
            feedback: row.get(12)?,
            resolution: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }

    pub fn from_complaint(c: &Complaint) -> Result<Self, ResolveError> {
        let ordinal = c
            .complaint_id
            .ordinal()
            .ok_or_else(|| ResolveError::Validation(format!("malformed id {}", c.complaint_id)))?;
        Ok(Self {
            complaint_id: c.complaint_id.to_string(),
            ordinal: ordinal as i64,
            title: c.title.clone(),
            description: c.description.clone(),
            category: c.category.to_string(),
            priority: c.priority.to_string(),
            status: c.status.to_string(),
            submitter_id: c.submitter.to_string(),
            assigned_agent_id: c.assigned_agent.as_ref().map(|a| a.to_string()),
            contact_method: c.contact_method.to_string(),
            attachments: serde_json::to_string(&c.attachments)?,
            status_history: serde_json::to_string(&c.status_history)?,
            feedback: c.feedback.as_ref().map(serde_json::to_string).transpose()?,
            resolution: c.resolution.as_ref().map(serde_json::to_string).transpose()?,
            created_at: format_ts(&c.created_at),
            updated_at: format_ts(&c.updated_at),
        })
    }

    pub fn into_complaint(self) -> Result<Complaint, ResolveError> {
        Ok(Complaint {
            complaint_id: self.complaint_id.parse::<ComplaintId>()?,
            title: self.title,
            description: self.description,
            category: parse_enum("category", &self.category)?,
            priority: parse_enum("priority", &self.priority)?,
            status: parse_enum("status", &self.status)?,
            submitter: UserId(self.submitter_id),
            assigned_agent: self.assigned_agent_id.map(UserId),
            contact_method: parse_enum("contact_method", &self.contact_method)?,
            attachments: serde_json::from_str(&self.attachments)?,
            status_history: serde_json::from_str(&self.status_history)?,
            feedback: self
                .feedback
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            resolution: self
                .resolution
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub complaint_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ReceiptRow {
    pub message_id: String,
    pub reader_id: String,
    pub read_at: String,
}

impl MessageRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            complaint_id: row.get(1)?,
            sender_id: row.get(2)?,
            text: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Builds a message, attaching the receipts whose `message_id` matches.
    pub fn into_message(self, receipts: &[ReceiptRow]) -> Result<Message, ResolveError> {
        let read_by = receipts
            .iter()
            .filter(|r| r.message_id == self.id)
            .map(|r| {
                Ok(ReadReceipt {
                    reader: UserId(r.reader_id.clone()),
                    read_at: parse_ts(&r.read_at)?,
                })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;
        Ok(Message {
            id: MessageId(self.id),
            complaint_id: self.complaint_id.parse()?,
            sender: UserId(self.sender_id),
            text: self.text,
            created_at: parse_ts(&self.created_at)?,
            read_by,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
}

impl UserRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            phone: row.get(4)?,
        })
    }

    pub fn from_user(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            phone: u.phone.clone(),
        }
    }

    pub fn into_user(self) -> Result<User, ResolveError> {
        Ok(User {
            id: UserId(self.id),
            name: self.name,
            email: self.email,
            role: parse_enum("role", &self.role)?,
            phone: self.phone,
        })
    }
}
