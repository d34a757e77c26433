// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room registry: which live sessions are in which rooms.
//!
//! Membership is ephemeral and per-process. Two maps are kept in step: one
//! per session (identity, joined rooms, outbound sender) and one per room
//! (member set). No operation holds a guard on both maps at once.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use resolvenow_core::{ComplaintId, Identity, ResolveError, UserId};

use crate::events::OutboundEvent;

/// Logical room name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomKey {
    /// Personal notification channel, `user:<id>`.
    User(UserId),
    /// Viewers of one complaint, `complaint:<id>`.
    Complaint(ComplaintId),
    /// Every authenticated admin or agent session.
    Staff,
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKey::User(id) => write!(f, "user:{id}"),
            RoomKey::Complaint(id) => write!(f, "complaint:{id}"),
            RoomKey::Staff => f.write_str("staff"),
        }
    }
}

impl FromStr for RoomKey {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "staff" {
            return Ok(RoomKey::Staff);
        }
        match s.split_once(':') {
            Some(("user", id)) if !id.is_empty() => Ok(RoomKey::User(UserId(id.to_string()))),
            Some(("complaint", id)) => Ok(RoomKey::Complaint(id.parse()?)),
            _ => Err(ResolveError::Validation(format!("unknown room `{s}`"))),
        }
    }
}

/// Handle for one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Session {
    identity: Option<Identity>,
    rooms: HashSet<RoomKey>,
    outbound: mpsc::Sender<OutboundEvent>,
}

#[derive(Default)]
pub struct RoomRegistry {
    sessions: DashMap<ConnectionId, Session>,
    rooms: DashMap<RoomKey, HashSet<ConnectionId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new anonymous session delivering to `outbound`.
    pub fn register(&self, outbound: mpsc::Sender<OutboundEvent>) -> ConnectionId {
        let conn = ConnectionId::generate();
        self.sessions.insert(
            conn,
            Session {
                identity: None,
                rooms: HashSet::new(),
                outbound,
            },
        );
        debug!(%conn, "session registered");
        conn
    }

    /// Binds an authenticated identity to the session and joins its
    /// personal room, plus the staff room for admins and agents.
    ///
    /// Binding the same identity again is a no-op. Rebinding a different
    /// identity is rejected.
    pub fn bind_identity(&self, conn: ConnectionId, identity: Identity) -> Result<(), ResolveError> {
        {
            let mut session = self.sessions.get_mut(&conn).ok_or_else(|| {
                ResolveError::NotFound {
                    entity: "session",
                    id: conn.to_string(),
                }
            })?;
            match &session.identity {
                Some(bound) if bound == &identity => return Ok(()),
                Some(bound) => {
                    return Err(ResolveError::InvalidState(format!(
                        "session already bound to `{}`",
                        bound.id
                    )));
                }
                None => session.identity = Some(identity.clone()),
            }
        }

        self.join_room(conn, RoomKey::User(identity.id.clone()));
        if identity.is_staff() {
            self.join_room(conn, RoomKey::Staff);
        }
        debug!(%conn, user = %identity.id, role = %identity.role, "session bound");
        Ok(())
    }

    pub fn identity_of(&self, conn: ConnectionId) -> Option<Identity> {
        self.sessions.get(&conn).and_then(|s| s.identity.clone())
    }

    /// Adds the session to `room`. Returns false if it was already a member
    /// or the session is unknown.
    pub fn join_room(&self, conn: ConnectionId, room: RoomKey) -> bool {
        let newly_joined = match self.sessions.get_mut(&conn) {
            Some(mut session) => session.rooms.insert(room.clone()),
            None => return false,
        };
        if newly_joined {
            self.rooms.entry(room.clone()).or_default().insert(conn);
            // A disconnect may have raced the insert above.
            if !self.sessions.contains_key(&conn) {
                self.remove_member(&room, conn);
                return false;
            }
            debug!(%conn, %room, "joined room");
        }
        newly_joined
    }

    /// Removes the session from `room`. Leaving a room it is not in is a no-op.
    pub fn leave_room(&self, conn: ConnectionId, room: &RoomKey) -> bool {
        let was_member = self
            .sessions
            .get_mut(&conn)
            .map(|mut s| s.rooms.remove(room))
            .unwrap_or(false);
        if was_member {
            self.remove_member(room, conn);
            debug!(%conn, %room, "left room");
        }
        was_member
    }

    /// Current members of `room`.
    pub fn members_of(&self, room: &RoomKey) -> HashSet<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    pub fn rooms_of(&self, conn: ConnectionId) -> HashSet<RoomKey> {
        self.sessions
            .get(&conn)
            .map(|s| s.rooms.clone())
            .unwrap_or_default()
    }

    pub fn sender_of(&self, conn: ConnectionId) -> Option<mpsc::Sender<OutboundEvent>> {
        self.sessions.get(&conn).map(|s| s.outbound.clone())
    }

    /// Drops the session and removes it from every room it belonged to.
    pub fn on_disconnect(&self, conn: ConnectionId) {
        let Some((_, session)) = self.sessions.remove(&conn) else {
            return;
        };
        for room in &session.rooms {
            self.remove_member(room, conn);
        }
        debug!(%conn, rooms = session.rooms.len(), "session disconnected");
    }

    /// Removes members of `room` whose bound identity fails `allowed`.
    /// Anonymous members are removed as well. Returns how many were evicted.
    pub fn retain_members<F>(&self, room: &RoomKey, allowed: F) -> usize
    where
        F: Fn(&Identity) -> bool,
    {
        let mut evicted = 0;
        for conn in self.members_of(room) {
            let keep = self.identity_of(conn).is_some_and(|identity| allowed(&identity));
            if !keep && self.leave_room(conn, room) {
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(%room, evicted, "evicted sessions from room");
        }
        evicted
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn remove_member(&self, room: &RoomKey, conn: ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&conn);
        }
        self.rooms.remove_if(room, |_, members| members.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvenow_core::Role;
    use std::sync::Arc;

    fn registry_with_session() -> (RoomRegistry, ConnectionId, mpsc::Receiver<OutboundEvent>) {
        let registry = RoomRegistry::new();
        let (tx, rx) = mpsc::channel(8);
        let conn = registry.register(tx);
        (registry, conn, rx)
    }

    #[test]
    fn room_keys_render_and_parse() {
        let user = RoomKey::User(UserId::from("u1"));
        let complaint = RoomKey::Complaint(ComplaintId::from_ordinal(1));
        assert_eq!(user.to_string(), "user:u1");
        assert_eq!(complaint.to_string(), "complaint:CMP000001");
        assert_eq!(RoomKey::Staff.to_string(), "staff");
        for key in [user, complaint, RoomKey::Staff] {
            assert_eq!(key.to_string().parse::<RoomKey>().unwrap(), key);
        }
        assert!("lobby:1".parse::<RoomKey>().is_err());
        assert!("complaint:nope".parse::<RoomKey>().is_err());
    }

    #[test]
    fn binding_joins_personal_room() {
        let (registry, conn, _rx) = registry_with_session();
        registry
            .bind_identity(conn, Identity::new("u1", Role::User))
            .unwrap();
        let user_room = RoomKey::User(UserId::from("u1"));
        assert!(registry.members_of(&user_room).contains(&conn));
        assert!(registry.members_of(&RoomKey::Staff).is_empty());
    }

    #[test]
    fn staff_sessions_join_staff_room() {
        let (registry, conn, _rx) = registry_with_session();
        registry
            .bind_identity(conn, Identity::new("a1", Role::Agent))
            .unwrap();
        assert!(registry.members_of(&RoomKey::Staff).contains(&conn));
    }

    #[test]
    fn rebinding_a_different_identity_is_rejected() {
        let (registry, conn, _rx) = registry_with_session();
        let u1 = Identity::new("u1", Role::User);
        registry.bind_identity(conn, u1.clone()).unwrap();
        registry.bind_identity(conn, u1).unwrap();
        let err = registry
            .bind_identity(conn, Identity::new("u2", Role::User))
            .unwrap_err();
        assert_eq!(err.kind(), resolvenow_core::ErrorKind::InvalidState);
    }

    #[test]
    fn join_and_leave_are_idempotent() {
        let (registry, conn, _rx) = registry_with_session();
        let room = RoomKey::Complaint(ComplaintId::from_ordinal(1));
        assert!(registry.join_room(conn, room.clone()));
        assert!(!registry.join_room(conn, room.clone()));
        assert_eq!(registry.members_of(&room).len(), 1);
        assert!(registry.leave_room(conn, &room));
        assert!(!registry.leave_room(conn, &room));
        assert!(registry.members_of(&room).is_empty());
        assert_eq!(registry.room_count(), 0, "empty rooms are dropped");
    }

    #[test]
    fn retain_members_evicts_only_failing_sessions() {
        let registry = RoomRegistry::new();
        let room = RoomKey::Complaint(ComplaintId::from_ordinal(1));
        let mut conns = Vec::new();
        for id in ["a1", "a2"] {
            let (tx, _rx) = mpsc::channel(1);
            let conn = registry.register(tx);
            registry
                .bind_identity(conn, Identity::new(id, Role::Agent))
                .unwrap();
            registry.join_room(conn, room.clone());
            conns.push(conn);
        }

        let evicted = registry.retain_members(&room, |identity| identity.id.as_str() == "a2");
        assert_eq!(evicted, 1);
        let members = registry.members_of(&room);
        assert!(!members.contains(&conns[0]));
        assert!(members.contains(&conns[1]));
        assert!(!registry.rooms_of(conns[0]).contains(&room));
        assert!(
            registry
                .rooms_of(conns[0])
                .contains(&RoomKey::User(UserId::from("a1"))),
            "personal room is untouched"
        );
    }

    #[test]
    fn disconnect_leaves_every_room() {
        let (registry, conn, _rx) = registry_with_session();
        registry
            .bind_identity(conn, Identity::new("admin", Role::Admin))
            .unwrap();
        let room = RoomKey::Complaint(ComplaintId::from_ordinal(1));
        registry.join_room(conn, room.clone());

        registry.on_disconnect(conn);
        assert!(registry.members_of(&room).is_empty());
        assert!(registry.members_of(&RoomKey::Staff).is_empty());
        assert_eq!(registry.session_count(), 0);
        assert_eq!(registry.room_count(), 0);
        assert!(!registry.join_room(conn, room), "unknown sessions cannot join");
    }

    mod membership {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Join(usize, u64),
            Leave(usize, u64),
            Disconnect(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0..3usize, 1..4u64).prop_map(|(s, r)| Op::Join(s, r)),
                (0..3usize, 1..4u64).prop_map(|(s, r)| Op::Leave(s, r)),
                (0..3usize).prop_map(Op::Disconnect),
            ]
        }

        proptest! {
            #[test]
            fn both_views_of_membership_agree(ops in proptest::collection::vec(op(), 0..40)) {
                let registry = RoomRegistry::new();
                let mut receivers = Vec::new();
                let conns: Vec<_> = (0..3)
                    .map(|_| {
                        let (tx, rx) = mpsc::channel(1);
                        receivers.push(rx);
                        registry.register(tx)
                    })
                    .collect();
                let room = |r: u64| RoomKey::Complaint(ComplaintId::from_ordinal(r));

                for op in ops {
                    match op {
                        Op::Join(s, r) => { registry.join_room(conns[s], room(r)); }
                        Op::Leave(s, r) => { registry.leave_room(conns[s], &room(r)); }
                        Op::Disconnect(s) => registry.on_disconnect(conns[s]),
                    }
                    for &conn in &conns {
                        for r in 1..4 {
                            prop_assert_eq!(
                                registry.members_of(&room(r)).contains(&conn),
                                registry.rooms_of(conn).contains(&room(r))
                            );
                        }
                    }
                }
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sessions_do_not_interfere() {
        let registry = Arc::new(RoomRegistry::new());
        let room = RoomKey::Complaint(ComplaintId::from_ordinal(1));
        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = registry.clone();
            let room = room.clone();
            handles.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::channel(1);
                let conn = registry.register(tx);
                registry.join_room(conn, room.clone());
                if i % 2 == 0 {
                    registry.on_disconnect(conn);
                }
                conn
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(registry.members_of(&room).len(), 16);
        assert_eq!(registry.session_count(), 16);
    }
}
