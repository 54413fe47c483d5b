//! Hand-off of finished reports to a mail transport
//!
//! The transport itself lives outside this crate. [`OutboxMailer`] drops each
//! message into a directory where an external sender picks it up.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::MailConfig;
use crate::error::{DigipostError, Result};

/// A report mail ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

impl Envelope {
    /// Address the report in `attachment` to `requester`
    #[must_use]
    pub fn for_report(mail: &MailConfig, requester: &str, attachment: Vec<u8>) -> Self {
        Self {
            to: requester.to_string(),
            from: mail.sender.clone(),
            subject: mail.subject.clone(),
            body: mail.body.clone(),
            attachment_name: mail.attachment_name.clone(),
            attachment,
        }
    }
}

/// Something that can deliver an [`Envelope`]
pub trait Mailer: Send + Sync {
    fn send(&self, envelope: &Envelope) -> Result<()>;
}

/// Metadata written next to the attachment in the outbox
#[derive(Debug, Serialize)]
struct OutboxEntry<'a> {
    id: String,
    created: DateTime<Utc>,
    to: &'a str,
    from: &'a str,
    subject: &'a str,
    body: &'a str,
    attachment: String,
    attachment_name: &'a str,
}

/// Writes each envelope as `<id>.json` plus `<id>.xlsx` into a directory
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
}

impl OutboxMailer {
    /// Use `dir` as outbox, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            DigipostError::Delivery(format!("Failed to create outbox {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, envelope: &Envelope) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        let extension = Path::new(&envelope.attachment_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("xlsx");
        let attachment_file = format!("{id}.{extension}");

        fs::write(self.dir.join(&attachment_file), &envelope.attachment).map_err(|e| {
            DigipostError::Delivery(format!("Failed to write attachment {attachment_file}: {e}"))
        })?;

        let entry = OutboxEntry {
            id: id.clone(),
            created: Utc::now(),
            to: &envelope.to,
            from: &envelope.from,
            subject: &envelope.subject,
            body: &envelope.body,
            attachment: attachment_file,
            attachment_name: &envelope.attachment_name,
        };
        let json = serde_json::to_vec_pretty(&entry)?;
        let meta_path = self.dir.join(format!("{id}.json"));
        fs::write(&meta_path, json).map_err(|e| {
            DigipostError::Delivery(format!("Failed to write {}: {e}", meta_path.display()))
        })?;

        log::info!(
            "Queued report for {} in outbox {}",
            envelope.to,
            self.dir.display()
        );
        Ok(())
    }
}
