// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure document validation, run before every persisted write.

use crate::error::ResolveError;
use crate::types::{Attachment, Complaint, NewComplaint};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Limits applied to attachment metadata at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
    pub max_files: usize,
    pub max_file_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            max_files: 5,
            max_file_bytes: 5 * 1024 * 1024,
            allowed_extensions: ["jpeg", "jpg", "png", "gif", "pdf", "doc", "docx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AttachmentPolicy {
    /// Checks count, size, extension and mime type of every attachment.
    pub fn check(&self, attachments: &[Attachment]) -> Result<(), ResolveError> {
        if attachments.len() > self.max_files {
            return Err(ResolveError::Validation(format!(
                "at most {} attachments are allowed, got {}",
                self.max_files,
                attachments.len()
            )));
        }
        for a in attachments {
            if a.size > self.max_file_bytes {
                return Err(ResolveError::Validation(format!(
                    "attachment `{}` is {} bytes, limit is {}",
                    a.original_name, a.size, self.max_file_bytes
                )));
            }
            let ext = a
                .original_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .unwrap_or_default();
            if !self.allowed_extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
                return Err(ResolveError::Validation(format!(
                    "attachment `{}` has an unsupported file type",
                    a.original_name
                )));
            }
            if !mime_matches_extension(&a.mime_type, &ext) {
                return Err(ResolveError::Validation(format!(
                    "attachment `{}` has mime type `{}` which does not match its extension",
                    a.original_name, a.mime_type
                )));
            }
        }
        Ok(())
    }
}

fn mime_matches_extension(mime: &str, ext: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    let expected: &[&str] = match ext {
        "jpg" | "jpeg" => &["image/jpeg", "image/jpg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "pdf" => &["application/pdf"],
        "doc" => &["application/msword"],
        "docx" => &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"],
        // Extensions added through configuration are accepted on name alone.
        _ => return true,
    };
    expected.contains(&mime.as_str())
}

/// Validates submitter-supplied fields for a new complaint.
pub fn validate_new_complaint(fields: &NewComplaint) -> Result<(), ResolveError> {
    require_text("title", &fields.title)?;
    require_text("description", &fields.description)?;
    Ok(())
}

/// Checks a feedback rating is within 1..=5.
pub fn validate_rating(rating: u8) -> Result<(), ResolveError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ResolveError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}

/// Trims message text, rejecting text that is empty afterwards.
pub fn normalize_message_text(text: &str) -> Result<String, ResolveError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::Validation("message text is required".into()));
    }
    Ok(trimmed.to_string())
}

/// Validates a full complaint document against its invariants.
pub fn validate_complaint(c: &Complaint) -> Result<(), ResolveError> {
    if c.complaint_id.ordinal().is_none_or(|n| n == 0) {
        return Err(ResolveError::Validation(format!(
            "malformed complaint id `{}`",
            c.complaint_id
        )));
    }
    require_text("title", &c.title)?;
    require_text("description", &c.description)?;

    if let Some(last) = c.status_history.last()
        && last.status != c.status
    {
        return Err(ResolveError::Validation(format!(
            "status `{}` does not match last history entry `{}`",
            c.status, last.status
        )));
    }
    if let Some(fb) = &c.feedback {
        validate_rating(fb.rating)?;
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), ResolveError> {
    if value.trim().is_empty() {
        Err(ResolveError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use chrono::Utc;

    fn attachment(name: &str, mime: &str, size: u64) -> Attachment {
        Attachment {
            filename: format!("1700000000-{name}"),
            original_name: name.into(),
            path: format!("uploads/{name}"),
            mime_type: mime.into(),
            size,
        }
    }

    fn doc() -> Complaint {
        let now = Utc::now();
        let mut c = Complaint {
            complaint_id: ComplaintId::from_ordinal(3),
            title: "Double charge".into(),
            description: "Charged twice for March".into(),
            category: Category::BillingProblem,
            priority: Priority::Medium,
            status: Status::Pending,
            submitter: UserId::from("u1"),
            assigned_agent: None,
            contact_method: ContactMethod::Both,
            attachments: vec![],
            status_history: vec![],
            feedback: None,
            resolution: None,
            created_at: now,
            updated_at: now,
        };
        c.record_transition(Status::Pending, None, None, now);
        c
    }

    #[test]
    fn valid_document_passes() {
        assert!(validate_complaint(&doc()).is_ok());
    }

    #[test]
    fn status_drift_is_rejected() {
        let mut c = doc();
        c.status = Status::Resolved;
        assert!(validate_complaint(&c).is_err());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut c = doc();
        c.title = "   ".into();
        let err = validate_complaint(&c).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn message_text_is_trimmed() {
        assert_eq!(normalize_message_text("  hi  ").unwrap(), "hi");
        assert!(normalize_message_text(" \n\t").is_err());
    }

    #[test]
    fn attachment_policy_limits() {
        let policy = AttachmentPolicy::default();
        assert!(policy.check(&[attachment("receipt.pdf", "application/pdf", 1024)]).is_ok());
        assert!(policy.check(&[attachment("photo.JPG", "image/jpeg", 10)]).is_ok());

        let too_big = attachment("scan.png", "image/png", 6 * 1024 * 1024);
        assert!(policy.check(&[too_big]).is_err());

        let exe = attachment("setup.exe", "application/octet-stream", 10);
        assert!(policy.check(&[exe]).is_err());

        let spoofed = attachment("note.pdf", "image/png", 10);
        assert!(policy.check(&[spoofed]).is_err());

        let six: Vec<_> = (0..6)
            .map(|i| attachment(&format!("{i}.gif"), "image/gif", 10))
            .collect();
        assert!(policy.check(&six).is_err());
    }
}
