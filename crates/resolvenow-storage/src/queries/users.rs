// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory operations.

use resolvenow_core::{ResolveError, Role, User, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::UserRow;

pub async fn upsert_user(db: &Database, user: &User) -> Result<(), ResolveError> {
    let row = UserRow::from_user(user);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, role, phone) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (id) DO UPDATE SET
                     name = excluded.name, email = excluded.email,
                     role = excluded.role, phone = excluded.phone",
                params![row.id, row.name, row.email, row.role, row.phone],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user(db: &Database, id: &UserId) -> Result<Option<User>, ResolveError> {
    let id = id.to_string();
    let row = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, email, role, phone FROM users WHERE id = ?1",
                params![id],
                UserRow::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    row.map(UserRow::into_user).transpose()
}

pub async fn list_users_by_role(db: &Database, role: Role) -> Result<Vec<User>, ResolveError> {
    let role = role.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, role, phone FROM users
                 WHERE role = ?1 ORDER BY name ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![role], UserRow::from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;
    rows.into_iter().map(UserRow::into_user).collect()
}
