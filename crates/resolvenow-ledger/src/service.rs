// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The complaint service: every inbound action passes the access policy,
//! mutates state through the ledger or the messaging store, persists, and
//! then publishes through the event router.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use resolvenow_bus::{ConnectionId, DomainEvent, EventRouter};
use resolvenow_core::validation::{validate_complaint, validate_new_complaint};
use resolvenow_core::{
    Attachment, AttachmentPolicy, Complaint, ComplaintFilter, ComplaintId, ComplaintRepository,
    Identity, Message, MessageRepository, NewComplaint, ResolveError, Role, Status, User,
    UserDirectory, UserId, ensure_access, ensure_admin,
};

use crate::ledger;
use crate::messaging::MessagingStore;
use crate::stats::{
    self, AdminStats, AgentStats, AgentWorkload, ComplaintSummary, SubmitterStats, UserActivity,
};

/// Facade over the repositories, the ledger and the event router.
#[derive(Clone)]
pub struct ComplaintService {
    complaints: Arc<dyn ComplaintRepository>,
    messages: MessagingStore,
    users: Arc<dyn UserDirectory>,
    router: Arc<EventRouter>,
    attachments: AttachmentPolicy,
}

impl ComplaintService {
    pub fn new(
        complaints: Arc<dyn ComplaintRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserDirectory>,
        router: Arc<EventRouter>,
    ) -> Self {
        Self {
            complaints,
            messages: MessagingStore::new(messages),
            users,
            router,
            attachments: AttachmentPolicy::default(),
        }
    }

    /// Builds a service whose three repositories share one backend.
    pub fn from_store<S>(store: Arc<S>, router: Arc<EventRouter>) -> Self
    where
        S: ComplaintRepository + MessageRepository + UserDirectory + 'static,
    {
        Self::new(store.clone(), store.clone(), store, router)
    }

    pub fn with_attachment_policy(mut self, policy: AttachmentPolicy) -> Self {
        self.attachments = policy;
        self
    }

    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    pub fn users(&self) -> &Arc<dyn UserDirectory> {
        &self.users
    }

    async fn load(&self, id: &ComplaintId) -> Result<Complaint, ResolveError> {
        self.complaints
            .find_by_id(id)
            .await?
            .ok_or_else(|| ResolveError::complaint_not_found(id))
    }

    async fn load_for(
        &self,
        identity: &Identity,
        id: &ComplaintId,
    ) -> Result<Complaint, ResolveError> {
        let complaint = self.load(id).await?;
        ensure_access(identity, &complaint)?;
        Ok(complaint)
    }

    async fn persist(&self, complaint: &Complaint) -> Result<(), ResolveError> {
        validate_complaint(complaint)?;
        self.complaints.save(complaint).await
    }

    // ---- lifecycle ----

    /// Opens a complaint for `submitter` with a fresh, never reused id.
    pub async fn submit_complaint(
        &self,
        submitter: &Identity,
        fields: NewComplaint,
        attachments: Vec<Attachment>,
    ) -> Result<Complaint, ResolveError> {
        validate_new_complaint(&fields)?;
        self.attachments.check(&attachments)?;

        let ordinal = self.complaints.next_ordinal().await?;
        let now = Utc::now();
        let mut complaint = Complaint {
            complaint_id: ComplaintId::from_ordinal(ordinal),
            title: fields.title.trim().to_string(),
            description: fields.description.trim().to_string(),
            category: fields.category,
            priority: fields.priority,
            status: Status::Pending,
            submitter: submitter.id.clone(),
            assigned_agent: None,
            contact_method: fields.contact_method,
            attachments,
            status_history: Vec::new(),
            feedback: None,
            resolution: None,
            created_at: now,
            updated_at: now,
        };
        complaint.record_transition(Status::Pending, None, None, now);
        validate_complaint(&complaint)?;
        self.complaints.create(&complaint).await?;

        info!(complaint_id = %complaint.complaint_id, submitter = %submitter.id, "complaint submitted");
        self.router
            .publish(DomainEvent::ComplaintCreated {
                complaint: complaint.clone(),
            })
            .await;
        Ok(complaint)
    }

    pub async fn get_complaint(
        &self,
        viewer: &Identity,
        id: &ComplaintId,
    ) -> Result<Complaint, ResolveError> {
        self.load_for(viewer, id).await
    }

    /// Admin action: hands the complaint to `agent_id`.
    pub async fn assign_complaint(
        &self,
        actor: &Identity,
        id: &ComplaintId,
        agent_id: &UserId,
    ) -> Result<Complaint, ResolveError> {
        ensure_admin(actor, "assigning a complaint")?;
        let mut complaint = self.load(id).await?;
        let agent = self
            .users
            .find_user(agent_id)
            .await?
            .ok_or_else(|| ResolveError::user_not_found(agent_id))?;

        let previous = complaint.assigned_agent.clone();
        ledger::assign(&mut complaint, &agent, actor, Utc::now())?;
        self.persist(&complaint).await?;

        info!(complaint_id = %id, agent = %agent.id, "complaint assigned");
        if previous.is_some_and(|prev| prev != agent.id) {
            let evicted = self.router.revoke_stale_viewers(&complaint);
            debug!(complaint_id = %id, evicted, "previous agent removed from complaint room");
        }
        self.router
            .publish(DomainEvent::ComplaintAssigned {
                complaint: complaint.clone(),
                agent: agent.id.clone(),
            })
            .await;
        self.router
            .publish(DomainEvent::ComplaintUpdated {
                complaint: complaint.clone(),
            })
            .await;
        Ok(complaint)
    }

    /// Moves a complaint to the status named by `new_status`.
    pub async fn transition_status(
        &self,
        actor: &Identity,
        id: &ComplaintId,
        new_status: &str,
        comment: Option<String>,
    ) -> Result<Complaint, ResolveError> {
        let target = Status::parse_target(new_status)?;
        let mut complaint = self.load(id).await?;
        ledger::transition(&mut complaint, target, comment, actor, Utc::now())?;
        self.persist(&complaint).await?;

        info!(complaint_id = %id, status = %target, actor = %actor.id, "complaint status changed");
        self.router
            .publish(DomainEvent::ComplaintUpdated {
                complaint: complaint.clone(),
            })
            .await;
        Ok(complaint)
    }

    /// Rates a resolved complaint, which closes it.
    pub async fn submit_feedback(
        &self,
        submitter: &Identity,
        id: &ComplaintId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<(), ResolveError> {
        let mut complaint = self.load_for(submitter, id).await?;
        ledger::submit_feedback(&mut complaint, rating, comment, submitter, Utc::now())?;
        self.persist(&complaint).await?;

        info!(complaint_id = %id, rating, "feedback submitted, complaint closed");
        self.router
            .publish(DomainEvent::ComplaintUpdated { complaint })
            .await;
        Ok(())
    }

    /// Admin action: removes the complaint and its thread.
    pub async fn delete_complaint(
        &self,
        actor: &Identity,
        id: &ComplaintId,
    ) -> Result<(), ResolveError> {
        ensure_admin(actor, "deleting a complaint")?;
        self.load(id).await?;
        let removed = self.messages.delete_thread(id).await?;
        if !self.complaints.delete(id).await? {
            return Err(ResolveError::complaint_not_found(id));
        }
        info!(complaint_id = %id, messages = removed, "complaint deleted");
        Ok(())
    }

    // ---- messaging ----

    pub async fn send_message(
        &self,
        sender: &Identity,
        id: &ComplaintId,
        text: &str,
    ) -> Result<Message, ResolveError> {
        let complaint = self.load_for(sender, id).await?;
        let message = self.messages.append_message(id, &sender.id, text).await?;

        let sender_name = match self.users.find_user(&sender.id).await {
            Ok(Some(user)) => user.name,
            Ok(None) => sender.id.to_string(),
            Err(e) => {
                warn!(user = %sender.id, error = %e, "sender lookup failed, using id as name");
                sender.id.to_string()
            }
        };
        self.router
            .publish(DomainEvent::MessageSent {
                complaint,
                message: message.clone(),
                sender_name,
            })
            .await;
        Ok(message)
    }

    /// Returns the thread as it stood, then marks it read for `viewer`.
    pub async fn list_messages(
        &self,
        viewer: &Identity,
        id: &ComplaintId,
    ) -> Result<Vec<Message>, ResolveError> {
        self.load_for(viewer, id).await?;
        let thread = self.messages.list_messages(id).await?;
        self.messages.mark_read(id, &viewer.id).await?;
        Ok(thread)
    }

    pub async fn unread_count_for(
        &self,
        viewer: &Identity,
        id: &ComplaintId,
    ) -> Result<u64, ResolveError> {
        self.load_for(viewer, id).await?;
        self.messages.unread_count_for(id, &viewer.id).await
    }

    // ---- listings ----

    async fn summarize(
        &self,
        viewer: &Identity,
        complaints: Vec<Complaint>,
    ) -> Result<Vec<ComplaintSummary>, ResolveError> {
        let mut out = Vec::with_capacity(complaints.len());
        for complaint in complaints {
            let unread_messages = self
                .messages
                .unread_count_for(&complaint.complaint_id, &viewer.id)
                .await?;
            out.push(ComplaintSummary {
                complaint,
                unread_messages,
            });
        }
        Ok(out)
    }

    /// The caller's own complaints, newest first.
    pub async fn my_complaints(
        &self,
        submitter: &Identity,
    ) -> Result<Vec<ComplaintSummary>, ResolveError> {
        let found = self
            .complaints
            .find_by_filter(&ComplaintFilter::submitted_by(&submitter.id))
            .await?;
        self.summarize(submitter, found).await
    }

    /// Complaints assigned to the calling agent, newest first.
    pub async fn assigned_complaints(
        &self,
        agent: &Identity,
    ) -> Result<Vec<ComplaintSummary>, ResolveError> {
        if agent.role != Role::Agent {
            return Err(ResolveError::AccessDenied(
                "only agents have assigned complaints".into(),
            ));
        }
        let found = self
            .complaints
            .find_by_filter(&ComplaintFilter::assigned_to(&agent.id))
            .await?;
        self.summarize(agent, found).await
    }

    pub async fn all_complaints(
        &self,
        admin: &Identity,
    ) -> Result<Vec<ComplaintSummary>, ResolveError> {
        ensure_admin(admin, "listing every complaint")?;
        let found = self.complaints.find_by_filter(&ComplaintFilter::all()).await?;
        self.summarize(admin, found).await
    }

    // ---- aggregates ----

    pub async fn submitter_stats(&self, submitter: &Identity) -> Result<SubmitterStats, ResolveError> {
        stats::submitter_stats(self.complaints.as_ref(), &submitter.id).await
    }

    pub async fn agent_stats(&self, agent: &Identity) -> Result<AgentStats, ResolveError> {
        if agent.role != Role::Agent {
            return Err(ResolveError::AccessDenied(
                "agent statistics are only available to agents".into(),
            ));
        }
        stats::agent_stats(self.complaints.as_ref(), &agent.id).await
    }

    pub async fn admin_stats(&self, admin: &Identity) -> Result<AdminStats, ResolveError> {
        ensure_admin(admin, "viewing portal statistics")?;
        let repo = self.complaints.as_ref();
        let all = ComplaintFilter::all();
        Ok(AdminStats {
            total_complaints: repo.count_by_filter(&all).await?,
            pending_complaints: repo
                .count_by_filter(&all.clone().with_statuses(&[Status::Pending]))
                .await?,
            resolved_complaints: repo
                .count_by_filter(&all.clone().with_statuses(&[Status::Resolved]))
                .await?,
            total_users: self.users.list_by_role(Role::User).await?.len() as u64,
            total_agents: self.users.list_by_role(Role::Agent).await?.len() as u64,
        })
    }

    pub async fn agents_with_workload(
        &self,
        admin: &Identity,
    ) -> Result<Vec<AgentWorkload>, ResolveError> {
        ensure_admin(admin, "listing agents")?;
        let mut out = Vec::new();
        for agent in self.users.list_by_role(Role::Agent).await? {
            out.push(stats::agent_workload(self.complaints.as_ref(), agent).await?);
        }
        Ok(out)
    }

    pub async fn users_with_complaint_counts(
        &self,
        admin: &Identity,
    ) -> Result<Vec<UserActivity>, ResolveError> {
        ensure_admin(admin, "listing users")?;
        let mut out = Vec::new();
        for user in self.users.list_by_role(Role::User).await? {
            out.push(stats::user_activity(self.complaints.as_ref(), user).await?);
        }
        Ok(out)
    }

    /// Admin action: adds an agent to the directory.
    pub async fn register_agent(&self, admin: &Identity, agent: User) -> Result<User, ResolveError> {
        ensure_admin(admin, "registering an agent")?;
        if agent.name.trim().is_empty() || agent.email.trim().is_empty() {
            return Err(ResolveError::Validation(
                "agent name and email are required".into(),
            ));
        }
        if self.users.find_user(&agent.id).await?.is_some() {
            return Err(ResolveError::Validation(format!(
                "user `{}` already exists",
                agent.id
            )));
        }
        let agent = User {
            role: Role::Agent,
            ..agent
        };
        self.users.upsert_user(&agent).await?;
        info!(agent = %agent.id, "agent registered");
        Ok(agent)
    }

    // ---- socket surface ----

    /// Joins `conn` to a complaint room after checking the bound identity.
    pub async fn join_complaint_room(
        &self,
        conn: ConnectionId,
        id: &ComplaintId,
    ) -> Result<(), ResolveError> {
        if self.router.registry().identity_of(conn).is_none() {
            return Err(ResolveError::AccessDenied(
                "authenticate before joining a complaint room".into(),
            ));
        }
        let complaint = self.load(id).await?;
        self.router.join_complaint_room(conn, &complaint)
    }

    pub fn leave_complaint_room(&self, conn: ConnectionId, id: &ComplaintId) {
        self.router.leave_complaint_room(conn, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvenow_bus::{EventKind, OutboundEvent};
    use resolvenow_core::{Category, ErrorKind, Priority};
    use resolvenow_storage::MemoryStore;
    use tokio::sync::mpsc;

    use crate::seed::seed_demo_users;

    struct Fixture {
        service: ComplaintService,
        admin: Identity,
        agent: Identity,
        user: Identity,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        seed_demo_users(store.as_ref()).await.unwrap();
        let router = Arc::new(EventRouter::local(16));
        Fixture {
            service: ComplaintService::from_store(store, router),
            admin: Identity::new("admin", Role::Admin),
            agent: Identity::new("agent", Role::Agent),
            user: Identity::new("user", Role::User),
        }
    }

    fn fields(title: &str) -> NewComplaint {
        NewComplaint {
            title: title.into(),
            description: "The charger stopped working".into(),
            category: Category::ProductQuality,
            priority: Priority::High,
            contact_method: Default::default(),
        }
    }

    fn session(service: &ComplaintService, who: &Identity) -> (ConnectionId, mpsc::Receiver<OutboundEvent>) {
        let (conn, rx) = service.router().connect();
        service.router().authenticate(conn, who.clone()).unwrap();
        (conn, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<OutboundEvent>) -> Vec<OutboundEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test]
    async fn ids_are_sequential_and_not_reused_after_delete() {
        let f = fixture().await;
        let a = f.service.submit_complaint(&f.user, fields("one"), vec![]).await.unwrap();
        let b = f.service.submit_complaint(&f.user, fields("two"), vec![]).await.unwrap();
        assert_eq!(a.complaint_id.as_str(), "CMP000001");
        assert_eq!(b.complaint_id.as_str(), "CMP000002");

        f.service.delete_complaint(&f.admin, &b.complaint_id).await.unwrap();
        let c = f.service.submit_complaint(&f.user, fields("three"), vec![]).await.unwrap();
        assert_eq!(c.complaint_id.as_str(), "CMP000003");
        assert_eq!(c.status_history.len(), 1);
        assert_eq!(c.status_history[0].status, Status::Pending);
        assert!(c.status_history[0].updated_by.is_none());
    }

    #[tokio::test]
    async fn created_event_reaches_staff_only() {
        let f = fixture().await;
        let (_, mut staff_rx) = session(&f.service, &f.agent);
        let (_, mut user_rx) = session(&f.service, &f.user);
        f.service.submit_complaint(&f.user, fields("one"), vec![]).await.unwrap();

        let staff = drain(&mut staff_rx);
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].event, EventKind::ComplaintCreated);
        assert!(drain(&mut user_rx).is_empty());
    }

    #[tokio::test]
    async fn full_lifecycle_scenario() {
        let f = fixture().await;
        let c = f.service.submit_complaint(&f.user, fields("Refund"), vec![]).await.unwrap();
        let id = c.complaint_id.clone();
        let (_, mut agent_rx) = session(&f.service, &f.agent);

        let assigned = f
            .service
            .assign_complaint(&f.admin, &id, &f.agent.id)
            .await
            .unwrap();
        assert_eq!(assigned.status, Status::Assigned);
        let events = drain(&mut agent_rx);
        assert!(events
            .iter()
            .any(|e| e.event == EventKind::ComplaintAssigned && e.room == "user:agent"));

        f.service
            .transition_status(&f.agent, &id, "in-progress", None)
            .await
            .unwrap();
        let resolved = f
            .service
            .transition_status(&f.agent, &id, "resolved", Some("Refund issued".into()))
            .await
            .unwrap();
        let res = resolved.resolution.unwrap();
        assert_eq!(res.resolved_by, f.agent.id);
        assert_eq!(res.description, "Refund issued");

        f.service.submit_feedback(&f.user, &id, 4, None).await.unwrap();
        let closed = f.service.get_complaint(&f.user, &id).await.unwrap();
        assert_eq!(closed.status, Status::Closed);
        assert_eq!(closed.feedback.unwrap().rating, 4);

        let err = f.service.submit_feedback(&f.user, &id, 5, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn rejected_actions_leave_history_untouched() {
        let f = fixture().await;
        let c = f.service.submit_complaint(&f.user, fields("x"), vec![]).await.unwrap();
        let id = c.complaint_id;

        let err = f.service.submit_feedback(&f.user, &id, 4, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = f
            .service
            .transition_status(&f.admin, &id, "escalated", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = f
            .service
            .transition_status(&f.agent, &id, "resolved", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        let stored = f.service.get_complaint(&f.admin, &id).await.unwrap();
        assert_eq!(stored.status_history.len(), 1);
    }

    #[tokio::test]
    async fn assignment_validates_target() {
        let f = fixture().await;
        let c = f.service.submit_complaint(&f.user, fields("x"), vec![]).await.unwrap();
        let id = c.complaint_id;

        let err = f
            .service
            .assign_complaint(&f.admin, &id, &UserId::from("ghost"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = f
            .service
            .assign_complaint(&f.admin, &id, &f.user.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = f
            .service
            .assign_complaint(&f.agent, &id, &f.agent.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        let err = f
            .service
            .assign_complaint(&f.admin, &ComplaintId::from_ordinal(99), &f.agent.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn messages_mark_read_on_view_and_fan_out() {
        let f = fixture().await;
        let c = f.service.submit_complaint(&f.user, fields("x"), vec![]).await.unwrap();
        let id = c.complaint_id;
        f.service.assign_complaint(&f.admin, &id, &f.agent.id).await.unwrap();

        let (agent_conn, mut agent_rx) = session(&f.service, &f.agent);
        let (_, mut user_rx) = session(&f.service, &f.user);
        f.service.join_complaint_room(agent_conn, &id).await.unwrap();
        drain(&mut agent_rx);
        drain(&mut user_rx);

        f.service.send_message(&f.user, &id, "Any update?").await.unwrap();
        let agent_events = drain(&mut agent_rx);
        let full = agent_events
            .iter()
            .find(|e| e.room == format!("complaint:{id}"))
            .unwrap();
        assert_eq!(full.data["text"], "Any update?");
        let summary = agent_events.iter().find(|e| e.room == "user:agent").unwrap();
        assert_eq!(summary.data["senderName"], "John Customer");
        assert!(drain(&mut user_rx).is_empty());

        assert_eq!(f.service.unread_count_for(&f.agent, &id).await.unwrap(), 1);
        let badges = f.service.assigned_complaints(&f.agent).await.unwrap();
        assert_eq!(badges[0].unread_messages, 1);

        let thread = f.service.list_messages(&f.agent, &id).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(f.service.unread_count_for(&f.agent, &id).await.unwrap(), 0);
        assert_eq!(f.service.unread_count_for(&f.user, &id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn outsiders_cannot_read_threads_or_join_rooms() {
        let f = fixture().await;
        let c = f.service.submit_complaint(&f.user, fields("x"), vec![]).await.unwrap();
        let id = c.complaint_id;
        let stranger = Identity::new("u2", Role::User);

        let err = f.service.list_messages(&stranger, &id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        let err = f.service.send_message(&f.agent, &id, "hi").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        let (conn, _rx) = session(&f.service, &stranger);
        let err = f.service.join_complaint_room(conn, &id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        let (anon, _rx) = f.service.router().connect();
        let err = f.service.join_complaint_room(anon, &id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[tokio::test]
    async fn aggregates_count_by_status() {
        let f = fixture().await;
        let a = f.service.submit_complaint(&f.user, fields("a"), vec![]).await.unwrap();
        f.service.submit_complaint(&f.user, fields("b"), vec![]).await.unwrap();
        f.service
            .assign_complaint(&f.admin, &a.complaint_id, &f.agent.id)
            .await
            .unwrap();

        let mine = f.service.submitter_stats(&f.user).await.unwrap();
        assert_eq!((mine.total, mine.pending, mine.assigned), (2, 1, 1));
        let agent = f.service.agent_stats(&f.agent).await.unwrap();
        assert_eq!((agent.total, agent.assigned), (1, 1));
        let admin = f.service.admin_stats(&f.admin).await.unwrap();
        assert_eq!(admin.total_complaints, 2);
        assert_eq!(admin.pending_complaints, 1);
        assert_eq!((admin.total_users, admin.total_agents), (1, 1));

        let workload = f.service.agents_with_workload(&f.admin).await.unwrap();
        assert_eq!(workload[0].assigned_complaints, 1);
        let users = f.service.users_with_complaint_counts(&f.admin).await.unwrap();
        assert_eq!(users[0].complaints_count, 2);

        let listed = f.service.my_complaints(&f.user).await.unwrap();
        assert_eq!(listed[0].complaint.title, "b");
        assert!(f.service.admin_stats(&f.user).await.is_err());
    }

    #[tokio::test]
    async fn attachments_are_checked_at_submission() {
        let f = fixture().await;
        let bad = Attachment {
            filename: "1.exe".into(),
            original_name: "tool.exe".into(),
            path: "uploads/1.exe".into(),
            mime_type: "application/octet-stream".into(),
            size: 10,
        };
        let err = f
            .service
            .submit_complaint(&f.user, fields("x"), vec![bad])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(f.service.my_complaints(&f.user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_agent_forces_role() {
        let f = fixture().await;
        let new = User {
            id: UserId::from("agent-2"),
            name: "Agent Tom".into(),
            email: "tom@resolvenow.com".into(),
            role: Role::User,
            phone: Some("555-0101".into()),
        };
        let saved = f.service.register_agent(&f.admin, new.clone()).await.unwrap();
        assert_eq!(saved.role, Role::Agent);
        let err = f.service.register_agent(&f.admin, new).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
