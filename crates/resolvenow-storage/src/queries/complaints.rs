// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complaint document operations.

use resolvenow_core::{Complaint, ComplaintFilter, ComplaintId, ResolveError};
use rusqlite::{OptionalExtension, params, params_from_iter};

use crate::database::{Database, map_tr_err};
use crate::models::{COMPLAINT_COLUMNS, ComplaintRow};

/// Increments the sequence row and returns the new value in one statement.
pub async fn next_ordinal(db: &Database) -> Result<u64, ResolveError> {
    let value: i64 = db
        .connection()
        .call(|conn| {
            conn.query_row(
                "UPDATE complaint_sequence SET value = value + 1 WHERE id = 1 RETURNING value",
                [],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(value as u64)
}

/// Inserts a complaint. Returns false if the id or ordinal is taken.
pub async fn insert_complaint(db: &Database, complaint: &Complaint) -> Result<bool, ResolveError> {
    let row = ComplaintRow::from_complaint(complaint)?;
    let inserted = db
        .connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO complaints ({COMPLAINT_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
                ),
                params![
                    row.complaint_id,
                    row.ordinal,
                    row.title,
                    row.description,
                    row.category,
                    row.priority,
                    row.status,
                    row.submitter_id,
                    row.assigned_agent_id,
                    row.contact_method,
                    row.attachments,
                    row.status_history,
                    row.feedback,
                    row.resolution,
                    row.created_at,
                    row.updated_at,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(inserted == 1)
}

pub async fn get_complaint(
    db: &Database,
    id: &ComplaintId,
) -> Result<Option<Complaint>, ResolveError> {
    let id = id.to_string();
    let row = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_id = ?1"),
                params![id],
                ComplaintRow::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    row.map(ComplaintRow::into_complaint).transpose()
}

/// Builds the WHERE clause and positional parameters for a filter.
fn filter_clause(filter: &ComplaintFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(submitter) = &filter.submitter {
        params.push(submitter.to_string());
        clauses.push(format!("submitter_id = ?{}", params.len()));
    }
    if let Some(agent) = &filter.assigned_agent {
        params.push(agent.to_string());
        clauses.push(format!("assigned_agent_id = ?{}", params.len()));
    }
    if !filter.statuses.is_empty() {
        let mut slots = Vec::new();
        for status in &filter.statuses {
            params.push(status.to_string());
            slots.push(format!("?{}", params.len()));
        }
        clauses.push(format!("status IN ({})", slots.join(", ")));
    }

    let clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (clause, params)
}

/// Matching complaints, newest first.
pub async fn list_complaints(
    db: &Database,
    filter: &ComplaintFilter,
) -> Result<Vec<Complaint>, ResolveError> {
    let (clause, values) = filter_clause(filter);
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints{clause} ORDER BY ordinal DESC"
            ))?;
            let rows = stmt.query_map(params_from_iter(values.iter()), ComplaintRow::from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;
    rows.into_iter().map(ComplaintRow::into_complaint).collect()
}

pub async fn count_complaints(
    db: &Database,
    filter: &ComplaintFilter,
) -> Result<u64, ResolveError> {
    let (clause, values) = filter_clause(filter);
    let count: i64 = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT COUNT(*) FROM complaints{clause}"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(count as u64)
}

/// Replaces the stored document. Returns false if no row matched.
pub async fn update_complaint(db: &Database, complaint: &Complaint) -> Result<bool, ResolveError> {
    let row = ComplaintRow::from_complaint(complaint)?;
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE complaints SET title = ?2, description = ?3, category = ?4,
                     priority = ?5, status = ?6, submitter_id = ?7, assigned_agent_id = ?8,
                     contact_method = ?9, attachments = ?10, status_history = ?11,
                     feedback = ?12, resolution = ?13, updated_at = ?14
                 WHERE complaint_id = ?1",
                params![
                    row.complaint_id,
                    row.title,
                    row.description,
                    row.category,
                    row.priority,
                    row.status,
                    row.submitter_id,
                    row.assigned_agent_id,
                    row.contact_method,
                    row.attachments,
                    row.status_history,
                    row.feedback,
                    row.resolution,
                    row.updated_at,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(updated == 1)
}

pub async fn delete_complaint(db: &Database, id: &ComplaintId) -> Result<bool, ResolveError> {
    let id = id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM complaints WHERE complaint_id = ?1", params![id]))
        .await
        .map_err(map_tr_err)?;
    Ok(deleted == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use resolvenow_core::{Category, ContactMethod, Priority, Status, UserId};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn complaint(ordinal: u64, submitter: &str, status: Status) -> Complaint {
        let now = Utc::now();
        let mut c = Complaint {
            complaint_id: ComplaintId::from_ordinal(ordinal),
            title: format!("Complaint {ordinal}"),
            description: "Details".into(),
            category: Category::ServiceIssue,
            priority: Priority::Medium,
            status: Status::Pending,
            submitter: UserId::from(submitter),
            assigned_agent: None,
            contact_method: ContactMethod::Email,
            attachments: vec![],
            status_history: vec![],
            feedback: None,
            resolution: None,
            created_at: now,
            updated_at: now,
        };
        c.record_transition(status, None, None, now);
        c
    }

    #[tokio::test]
    async fn ordinals_strictly_increase() {
        let (db, _dir) = setup_db().await;
        let a = next_ordinal(&db).await.unwrap();
        let b = next_ordinal(&db).await.unwrap();
        let c = next_ordinal(&db).await.unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let (db, _dir) = setup_db().await;
        let c = complaint(1, "u1", Status::Pending);
        assert!(insert_complaint(&db, &c).await.unwrap());
        assert!(!insert_complaint(&db, &c).await.unwrap(), "duplicate id");

        let loaded = get_complaint(&db, &c.complaint_id).await.unwrap().unwrap();
        assert_eq!(loaded.title, c.title);
        assert_eq!(loaded.status_history.len(), 1);
        assert!(
            get_complaint(&db, &ComplaintId::from_ordinal(99))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn filters_and_counts() {
        let (db, _dir) = setup_db().await;
        insert_complaint(&db, &complaint(1, "u1", Status::Pending)).await.unwrap();
        insert_complaint(&db, &complaint(2, "u1", Status::Resolved)).await.unwrap();
        let mut assigned = complaint(3, "u2", Status::Assigned);
        assigned.assigned_agent = Some(UserId::from("a1"));
        insert_complaint(&db, &assigned).await.unwrap();

        let mine = list_complaints(&db, &ComplaintFilter::submitted_by(&UserId::from("u1")))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].complaint_id, ComplaintId::from_ordinal(2), "newest first");

        let open = ComplaintFilter::all().with_statuses(&[Status::Pending, Status::Assigned]);
        assert_eq!(count_complaints(&db, &open).await.unwrap(), 2);

        let agent = ComplaintFilter::assigned_to(&UserId::from("a1"));
        assert_eq!(count_complaints(&db, &agent).await.unwrap(), 1);
        assert_eq!(count_complaints(&db, &ComplaintFilter::all()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (db, _dir) = setup_db().await;
        let mut c = complaint(1, "u1", Status::Pending);
        insert_complaint(&db, &c).await.unwrap();

        c.record_transition(Status::InProgress, Some("looking".into()), None, Utc::now());
        assert!(update_complaint(&db, &c).await.unwrap());
        let loaded = get_complaint(&db, &c.complaint_id).await.unwrap().unwrap();
        assert_eq!(loaded.status, Status::InProgress);
        assert_eq!(loaded.status_history.len(), 2);

        assert!(delete_complaint(&db, &c.complaint_id).await.unwrap());
        assert!(!delete_complaint(&db, &c.complaint_id).await.unwrap());
        assert!(!update_complaint(&db, &c).await.unwrap());
    }
}
