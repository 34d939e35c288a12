// ABOUTME: Translates raw filesystem changes into normalized outbound events
// File-bearing changes stat, apply the content policy, and read best-effort

use std::path::PathBuf;

use tracing::debug;

use super::mime;
use super::paths;
use super::policy::ContentPolicy;
use crate::remote::protocol::OutboundMessage;

/// The five notification kinds the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    FileCreated,
    FileModified,
    FileRemoved,
    FolderCreated,
    FolderRemoved,
}

/// One raw filesystem change, already filtered and normalized to the
/// watched root. Self-contained: translation borrows nothing shared.
#[derive(Debug, Clone)]
pub struct RawChange {
    pub kind: ChangeKind,
    pub absolute: PathBuf,
    pub relative: PathBuf,
}

impl RawChange {
    pub fn new(kind: ChangeKind, absolute: PathBuf, relative: PathBuf) -> Self {
        Self {
            kind,
            absolute,
            relative,
        }
    }
}

/// Translate one change into its outbound event.
///
/// Never fails: a file that vanished between notification and stat/read is
/// emitted with best-effort fields. Stat and read are the only suspension
/// points, and they are ordered before the emission for this change.
pub async fn translate(change: RawChange, policy: ContentPolicy) -> OutboundMessage {
    let path = paths::rooted_display(&change.relative);
    debug!(kind = ?change.kind, path = %path, "change detected");

    match change.kind {
        ChangeKind::FileCreated => {
            let (can_read, content) = file_payload(&change, policy).await;
            OutboundMessage::create_file(path, can_read, content)
        }
        ChangeKind::FileModified => {
            let (can_read, content) = file_payload(&change, policy).await;
            OutboundMessage::update_file(path, can_read, content)
        }
        ChangeKind::FileRemoved => OutboundMessage::delete_file(path),
        ChangeKind::FolderCreated => OutboundMessage::create_folder(path),
        ChangeKind::FolderRemoved => OutboundMessage::delete_folder(path),
    }
}

/// Resolve the `can_read` decision and, when allowed, the text content.
///
/// The decision is made from the MIME category and the stat'ed size. A failed
/// read keeps the stat-derived `can_read` and omits the content; a failed stat
/// means the file is already gone and nothing can be read.
async fn file_payload(change: &RawChange, policy: ContentPolicy) -> (bool, Option<String>) {
    let category = mime::category_for_path(&change.relative);

    let can_read = match tokio::fs::metadata(&change.absolute).await {
        Ok(metadata) => policy.can_read(category, metadata.len()),
        Err(error) => {
            debug!(path = %change.absolute.display(), %error, "stat failed, emitting without content");
            return (false, None);
        }
    };

    if !can_read {
        return (false, None);
    }

    match tokio::fs::read(&change.absolute).await {
        Ok(bytes) => (true, Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(error) => {
            debug!(path = %change.absolute.display(), %error, "read failed, emitting without content");
            (true, None)
        }
    }
}
