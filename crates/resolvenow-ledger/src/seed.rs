// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Demo directory records for local runs.

use tracing::info;

use resolvenow_core::{ResolveError, Role, User, UserDirectory, UserId};

pub fn demo_users() -> Vec<User> {
    [
        ("admin", "Admin User", "admin@resolvenow.com", Role::Admin),
        ("agent", "Agent Sarah", "agent@resolvenow.com", Role::Agent),
        ("user", "John Customer", "user@resolvenow.com", Role::User),
    ]
    .into_iter()
    .map(|(id, name, email, role)| User {
        id: UserId::from(id),
        name: name.to_string(),
        email: email.to_string(),
        role,
        phone: None,
    })
    .collect()
}

/// Upserts the demo users. Safe to run repeatedly.
pub async fn seed_demo_users(directory: &dyn UserDirectory) -> Result<Vec<User>, ResolveError> {
    let users = demo_users();
    for user in &users {
        directory.upsert_user(user).await?;
    }
    info!(count = users.len(), "demo users seeded");
    Ok(users)
}
