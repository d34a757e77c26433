// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message log and read-receipt operations.

use chrono::{DateTime, Utc};
use resolvenow_core::{ComplaintId, Message, ResolveError, UserId};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{MessageRow, ReceiptRow, format_ts};

/// Appends a message. Receipts on a new message are always empty.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), ResolveError> {
    let id = msg.id.to_string();
    let complaint_id = msg.complaint_id.to_string();
    let sender = msg.sender.to_string();
    let text = msg.text.clone();
    let created_at = format_ts(&msg.created_at);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, complaint_id, sender_id, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, complaint_id, sender, text, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Messages for a complaint in insertion order, with their receipts.
pub async fn get_messages_for_complaint(
    db: &Database,
    complaint_id: &ComplaintId,
) -> Result<Vec<Message>, ResolveError> {
    let complaint_id = complaint_id.to_string();
    let (rows, receipts) = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, complaint_id, sender_id, text, created_at
                 FROM messages WHERE complaint_id = ?1 ORDER BY seq ASC",
            )?;
            let rows = stmt
                .query_map(params![complaint_id], MessageRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            let mut stmt = conn.prepare(
                "SELECT r.message_id, r.reader_id, r.read_at
                 FROM read_receipts r JOIN messages m ON m.id = r.message_id
                 WHERE m.complaint_id = ?1 ORDER BY r.read_at ASC, r.reader_id ASC",
            )?;
            let receipts = stmt
                .query_map(params![complaint_id], |row| {
                    Ok(ReceiptRow {
                        message_id: row.get(0)?,
                        reader_id: row.get(1)?,
                        read_at: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((rows, receipts))
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|row| row.into_message(&receipts))
        .collect()
}

/// Adds a receipt for `reader` on every unread message it did not send.
///
/// A single `INSERT OR IGNORE ... SELECT` so concurrent readers never lose
/// or duplicate receipts.
pub async fn mark_read(
    db: &Database,
    complaint_id: &ComplaintId,
    reader: &UserId,
    at: DateTime<Utc>,
) -> Result<u64, ResolveError> {
    let complaint_id = complaint_id.to_string();
    let reader = reader.to_string();
    let read_at = format_ts(&at);
    let added = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO read_receipts (message_id, reader_id, read_at)
                 SELECT id, ?2, ?3 FROM messages
                 WHERE complaint_id = ?1 AND sender_id != ?2",
                params![complaint_id, reader, read_at],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(added as u64)
}

pub async fn unread_count(
    db: &Database,
    complaint_id: &ComplaintId,
    viewer: &UserId,
) -> Result<u64, ResolveError> {
    let complaint_id = complaint_id.to_string();
    let viewer = viewer.to_string();
    let count: i64 = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM messages m
                 WHERE m.complaint_id = ?1 AND m.sender_id != ?2
                   AND NOT EXISTS (
                       SELECT 1 FROM read_receipts r
                       WHERE r.message_id = m.id AND r.reader_id = ?2
                   )",
                params![complaint_id, viewer],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(count as u64)
}

/// Deletes a complaint's thread; receipts follow via `ON DELETE CASCADE`.
pub async fn delete_messages_for_complaint(
    db: &Database,
    complaint_id: &ComplaintId,
) -> Result<u64, ResolveError> {
    let complaint_id = complaint_id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM messages WHERE complaint_id = ?1",
                params![complaint_id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(deleted as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvenow_core::MessageId;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn msg(complaint: u64, sender: &str, text: &str) -> Message {
        Message {
            id: MessageId::generate(),
            complaint_id: ComplaintId::from_ordinal(complaint),
            sender: UserId::from(sender),
            text: text.into(),
            created_at: Utc::now(),
            read_by: vec![],
        }
    }

    #[tokio::test]
    async fn messages_list_in_insertion_order() {
        let (db, _dir) = setup_db().await;
        for text in ["first", "second", "third"] {
            insert_message(&db, &msg(1, "u1", text)).await.unwrap();
        }
        insert_message(&db, &msg(2, "u1", "other thread")).await.unwrap();

        let list = get_messages_for_complaint(&db, &ComplaintId::from_ordinal(1))
            .await
            .unwrap();
        let texts: Vec<_> = list.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn mark_read_skips_own_messages_and_is_idempotent() {
        let (db, _dir) = setup_db().await;
        let cid = ComplaintId::from_ordinal(1);
        insert_message(&db, &msg(1, "u1", "Any update?")).await.unwrap();
        insert_message(&db, &msg(1, "a1", "Looking into it")).await.unwrap();

        let (u1, a1) = (UserId::from("u1"), UserId::from("a1"));
        assert_eq!(unread_count(&db, &cid, &a1).await.unwrap(), 1);
        assert_eq!(mark_read(&db, &cid, &a1, Utc::now()).await.unwrap(), 1);
        assert_eq!(mark_read(&db, &cid, &a1, Utc::now()).await.unwrap(), 0);
        assert_eq!(unread_count(&db, &cid, &a1).await.unwrap(), 0);
        assert_eq!(unread_count(&db, &cid, &u1).await.unwrap(), 1);

        for m in get_messages_for_complaint(&db, &cid).await.unwrap() {
            assert!(!m.is_read_by(&m.sender), "sender never reads own message");
        }
    }

    #[tokio::test]
    async fn concurrent_mark_read_never_duplicates() {
        let (db, _dir) = setup_db().await;
        let cid = ComplaintId::from_ordinal(1);
        for i in 0..10 {
            insert_message(&db, &msg(1, "u1", &format!("m{i}"))).await.unwrap();
        }
        let a1 = UserId::from("a1");
        let results = futures::future::join_all(
            (0..4).map(|_| mark_read(&db, &cid, &a1, Utc::now())),
        )
        .await;
        let total: u64 = results.into_iter().map(|r| r.unwrap()).sum();
        assert_eq!(total, 10);
        for m in get_messages_for_complaint(&db, &cid).await.unwrap() {
            assert_eq!(m.read_by.len(), 1);
        }
    }

    #[tokio::test]
    async fn delete_removes_thread_and_receipts() {
        let (db, _dir) = setup_db().await;
        let cid = ComplaintId::from_ordinal(1);
        insert_message(&db, &msg(1, "u1", "hello")).await.unwrap();
        mark_read(&db, &cid, &UserId::from("a1"), Utc::now()).await.unwrap();
        assert_eq!(delete_messages_for_complaint(&db, &cid).await.unwrap(), 1);
        assert!(get_messages_for_complaint(&db, &cid).await.unwrap().is_empty());

        let receipts: i64 = db
            .connection()
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM read_receipts", [], |r| r.get(0)))
            .await
            .map_err(map_tr_err)
            .unwrap();
        assert_eq!(receipts, 0);
    }
}
