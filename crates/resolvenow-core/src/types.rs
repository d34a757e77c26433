// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the repository traits, the ledger and the bus.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::ResolveError;

/// Unique identifier for a user (submitter, agent or admin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generates a fresh random message id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-readable complaint code: `CMP` followed by a zero-padded ordinal.
///
/// Ordering follows the numeric ordinal, so `CMP1000000` sorts after
/// `CMP999999`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(String);

impl ComplaintId {
    pub const PREFIX: &'static str = "CMP";

    /// Mints the id for the given 1-based ordinal.
    pub fn from_ordinal(ordinal: u64) -> Self {
        Self(format!("{}{ordinal:06}", Self::PREFIX))
    }

    /// Numeric ordinal, or `None` when the id is malformed.
    pub fn ordinal(&self) -> Option<u64> {
        let digits = self.0.strip_prefix(Self::PREFIX)?;
        if digits.len() < 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ComplaintId {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self(s.to_string());
        match id.ordinal() {
            Some(n) if n > 0 => Ok(id),
            _ => Err(ResolveError::Validation(format!(
                "`{s}` is not a complaint id (expected CMP followed by six digits)"
            ))),
        }
    }
}

impl PartialOrd for ComplaintId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComplaintId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal()
            .cmp(&other.ordinal())
            .then_with(|| self.0.cmp(&other.0))
    }
}

/// Role held by an identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    Admin,
}

/// A verified `{id, role}` pair supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId(id.into()),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and agents receive `complaint.created` broadcasts.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Agent)
    }
}

/// Lifecycle state of a complaint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    Assigned,
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    /// `closed` admits no further transitions.
    pub fn is_terminal(self) -> bool {
        self == Status::Closed
    }

    /// Parses a requested target status, reporting unknown values as
    /// [`ResolveError::InvalidState`].
    pub fn parse_target(s: &str) -> Result<Self, ResolveError> {
        s.parse()
            .map_err(|_| ResolveError::InvalidState(format!("unknown status `{s}`")))
    }
}

/// Closed set of complaint categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum Category {
    #[strum(serialize = "Product Quality")]
    #[serde(rename = "Product Quality")]
    ProductQuality,
    #[strum(serialize = "Service Issue")]
    #[serde(rename = "Service Issue")]
    ServiceIssue,
    #[strum(serialize = "Billing Problem")]
    #[serde(rename = "Billing Problem")]
    BillingProblem,
    #[strum(serialize = "Delivery Issue")]
    #[serde(rename = "Delivery Issue")]
    DeliveryIssue,
    #[strum(serialize = "Technical Support")]
    #[serde(rename = "Technical Support")]
    TechnicalSupport,
    #[strum(serialize = "Account Problem")]
    #[serde(rename = "Account Problem")]
    AccountProblem,
    #[strum(serialize = "Refund Request")]
    #[serde(rename = "Refund Request")]
    RefundRequest,
    Other,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// How the submitter prefers to be contacted.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    #[default]
    Email,
    Phone,
    Both,
}

/// Metadata for a file already persisted by the file-storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub mime_type: String,
    pub size: u64,
}

/// One entry of the append-only status audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: Status,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub description: String,
    pub resolved_at: DateTime<Utc>,
    pub resolved_by: UserId,
}

/// A complaint document.
///
/// `status` mirrors the last entry of `status_history`. Mutate it only
/// through [`Complaint::record_transition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub complaint_id: ComplaintId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub submitter: UserId,
    pub assigned_agent: Option<UserId>,
    pub contact_method: ContactMethod,
    pub attachments: Vec<Attachment>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub feedback: Option<Feedback>,
    pub resolution: Option<Resolution>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Appends a history entry and moves `status` to match it.
    pub fn record_transition(
        &mut self,
        status: Status,
        comment: Option<String>,
        actor: Option<UserId>,
        at: DateTime<Utc>,
    ) {
        self.status_history.push(StatusHistoryEntry {
            status,
            timestamp: at,
            comment,
            updated_by: actor,
        });
        self.status = status;
        self.updated_at = at;
    }

    /// Both the submitter and the assigned agent take part in the thread.
    pub fn participants(&self) -> Vec<&UserId> {
        let mut out = vec![&self.submitter];
        if let Some(agent) = &self.assigned_agent
            && agent != &self.submitter
        {
            out.push(agent);
        }
        out
    }
}

/// Fields supplied by the submitter when opening a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub contact_method: ContactMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub reader: UserId,
    pub read_at: DateTime<Utc>,
}

/// A message in a complaint's thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub complaint_id: ComplaintId,
    pub sender: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub read_by: Vec<ReadReceipt>,
}

impl Message {
    pub fn is_read_by(&self, user: &UserId) -> bool {
        self.read_by.iter().any(|r| &r.reader == user)
    }

    /// True when `viewer` did not send the message and has not read it.
    pub fn is_unread_for(&self, viewer: &UserId) -> bool {
        &self.sender != viewer && !self.is_read_by(viewer)
    }
}

/// A user directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            role: self.role,
        }
    }
}

/// Query over complaint documents. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    pub submitter: Option<UserId>,
    pub assigned_agent: Option<UserId>,
    pub statuses: Vec<Status>,
}

impl ComplaintFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn submitted_by(user: &UserId) -> Self {
        Self {
            submitter: Some(user.clone()),
            ..Self::default()
        }
    }

    pub fn assigned_to(agent: &UserId) -> Self {
        Self {
            assigned_agent: Some(agent.clone()),
            ..Self::default()
        }
    }

    pub fn with_statuses(mut self, statuses: &[Status]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        if let Some(s) = &self.submitter
            && s != &complaint.submitter
        {
            return false;
        }
        if let Some(a) = &self.assigned_agent
            && complaint.assigned_agent.as_ref() != Some(a)
        {
            return false;
        }
        self.statuses.is_empty() || self.statuses.contains(&complaint.status)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn sample(status: Status) -> Complaint {
        let now = Utc::now();
        Complaint {
            complaint_id: ComplaintId::from_ordinal(1),
            title: "Broken kettle".into(),
            description: "Stopped heating after two days".into(),
            category: Category::ProductQuality,
            priority: Priority::default(),
            status,
            submitter: UserId::from("u1"),
            assigned_agent: None,
            contact_method: ContactMethod::default(),
            attachments: vec![],
            status_history: vec![StatusHistoryEntry {
                status,
                timestamp: now,
                comment: None,
                updated_by: None,
            }],
            feedback: None,
            resolution: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn complaint_id_is_zero_padded() {
        assert_eq!(ComplaintId::from_ordinal(1).as_str(), "CMP000001");
        assert_eq!(ComplaintId::from_ordinal(123456).as_str(), "CMP123456");
        assert_eq!(ComplaintId::from_ordinal(1234567).as_str(), "CMP1234567");
    }

    #[test]
    fn complaint_id_parse_rejects_garbage() {
        assert!("CMP000001".parse::<ComplaintId>().is_ok());
        assert!("CMP000000".parse::<ComplaintId>().is_err());
        assert!("CMP12".parse::<ComplaintId>().is_err());
        assert!("XYZ000001".parse::<ComplaintId>().is_err());
        assert!("CMP00000a".parse::<ComplaintId>().is_err());
    }

    #[test]
    fn complaint_id_orders_numerically() {
        assert!(ComplaintId::from_ordinal(999_999) < ComplaintId::from_ordinal(1_000_000));
    }

    #[test]
    fn status_uses_kebab_case_everywhere() {
        assert_eq!(Status::InProgress.to_string(), "in-progress");
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(Status::parse_target("resolved").unwrap(), Status::Resolved);
        let err = Status::parse_target("escalated").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidState);
    }

    #[test]
    fn category_has_eight_values_with_display_names() {
        assert_eq!(Category::iter().count(), 8);
        assert_eq!(Category::RefundRequest.to_string(), "Refund Request");
        assert_eq!(
            "Billing Problem".parse::<Category>().unwrap(),
            Category::BillingProblem
        );
        let json = serde_json::to_string(&Category::TechnicalSupport).unwrap();
        assert_eq!(json, "\"Technical Support\"");
    }

    #[test]
    fn priority_and_contact_defaults() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(ContactMethod::default(), ContactMethod::Email);
    }

    #[test]
    fn record_transition_keeps_status_in_sync() {
        let mut c = sample(Status::Pending);
        c.record_transition(
            Status::Assigned,
            Some("Assigned to agent: Sarah".into()),
            Some(UserId::from("admin")),
            Utc::now(),
        );
        assert_eq!(c.status, Status::Assigned);
        assert_eq!(c.status_history.len(), 2);
        assert_eq!(c.status_history.last().unwrap().status, c.status);
    }

    #[test]
    fn participants_skip_missing_agent() {
        let mut c = sample(Status::Pending);
        assert_eq!(c.participants(), vec![&UserId::from("u1")]);
        c.assigned_agent = Some(UserId::from("a1"));
        assert_eq!(c.participants().len(), 2);
    }

    #[test]
    fn filter_matches_on_every_set_field() {
        let mut c = sample(Status::InProgress);
        c.assigned_agent = Some(UserId::from("a1"));

        assert!(ComplaintFilter::all().matches(&c));
        assert!(ComplaintFilter::submitted_by(&UserId::from("u1")).matches(&c));
        assert!(!ComplaintFilter::submitted_by(&UserId::from("u2")).matches(&c));
        assert!(ComplaintFilter::assigned_to(&UserId::from("a1"))
            .with_statuses(&[Status::Assigned, Status::InProgress])
            .matches(&c));
        assert!(!ComplaintFilter::assigned_to(&UserId::from("a1"))
            .with_statuses(&[Status::Resolved])
            .matches(&c));
    }

    #[test]
    fn message_unread_excludes_sender() {
        let msg = Message {
            id: MessageId::generate(),
            complaint_id: ComplaintId::from_ordinal(1),
            sender: UserId::from("u1"),
            text: "Any update?".into(),
            created_at: Utc::now(),
            read_by: vec![],
        };
        assert!(!msg.is_unread_for(&UserId::from("u1")));
        assert!(msg.is_unread_for(&UserId::from("a1")));
    }

    #[test]
    fn complaint_serializes_camel_case() {
        let c = sample(Status::Pending);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["complaintId"], "CMP000001");
        assert_eq!(json["statusHistory"][0]["status"], "pending");
        assert!(json["assignedAgent"].is_null());
    }
}
