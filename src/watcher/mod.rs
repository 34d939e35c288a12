// ABOUTME: Recursive project watcher bridging notify events into the async pipeline
// Exclusions are applied at the subscription boundary, before events enter the channel

pub mod ignore;
pub mod mime;
pub mod paths;
pub mod policy;
pub mod translate;

pub use ignore::IgnoreSet;
pub use policy::ContentPolicy;
pub use translate::{ChangeKind, RawChange};

use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::remote::session::RemoteSession;

/// Capacity of the bridge channel between the watcher thread and the pipeline.
const CHANNEL_CAPACITY: usize = 100;

/// Watches one project tree and forwards each change to the remote session.
///
/// The notify watcher is hosted on a dedicated thread (its callback API is
/// blocking); raw changes cross into the async world over an mpsc channel.
/// Each notification is handled by its own spawned task, so a slow stat or
/// read delays only that one emission.
pub struct ProjectWatcher {
    root: PathBuf,
    ignore: IgnoreSet,
    policy: ContentPolicy,
    session: RemoteSession,
}

impl ProjectWatcher {
    pub fn new(
        root: impl Into<PathBuf>,
        ignore: IgnoreSet,
        policy: ContentPolicy,
        session: RemoteSession,
    ) -> Self {
        Self {
            root: root.into(),
            ignore,
            policy,
            session,
        }
    }

    /// Watch until the event source shuts down.
    ///
    /// A bad notification never stops the loop: translation is infallible and
    /// per-notification tasks are independent.
    pub async fn run(self) -> Result<()> {
        let root = tokio::fs::canonicalize(&self.root)
            .await
            .with_context(|| format!("Cannot resolve watch root {:?}", self.root))?;

        let mut changes = spawn_watch_thread(root.clone(), self.ignore.clone())?;
        info!(root = %root.display(), "watching project tree");

        while let Some(change) = changes.recv().await {
            let session = self.session.clone();
            let policy = self.policy;

            tokio::spawn(async move {
                let message = translate::translate(change, policy).await;
                session.send(message);
            });
        }

        Ok(())
    }
}

/// Start the blocking notify watcher on its own thread and return the async
/// receiving end of the bridge.
fn spawn_watch_thread(root: PathBuf, ignore: IgnoreSet) -> Result<mpsc::Receiver<RawChange>> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (sync_tx, sync_rx) = std::sync::mpsc::channel();

    let mut watcher =
        notify::recommended_watcher(sync_tx).context("Failed to create file system watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", root))?;

    thread::spawn(move || {
        // The watcher must live as long as the drain loop
        let _watcher = watcher;

        while let Ok(result) = sync_rx.recv() {
            let event = match result {
                Ok(event) => event,
                Err(error) => {
                    warn!(%error, "file system watch error");
                    continue;
                }
            };

            for change in changes_from_event(event, &root, &ignore) {
                if tx.blocking_send(change).is_err() {
                    // Pipeline dropped its receiver, nothing left to notify
                    return;
                }
            }
        }
    });

    Ok(rx)
}

/// Map one notify event onto the pipeline's change vocabulary, dropping
/// excluded paths, paths outside the root, and kinds the catalogue has no
/// event for.
fn changes_from_event(event: Event, root: &Path, ignore: &IgnoreSet) -> Vec<RawChange> {
    let mut changes = Vec::new();
    let mut push = |kind: ChangeKind, absolute: &Path| {
        if let Some(change) = normalize(kind, absolute, root, ignore) {
            changes.push(change);
        }
    };

    match event.kind {
        EventKind::Create(create_kind) => {
            for path in &event.paths {
                match create_kind {
                    CreateKind::File => push(ChangeKind::FileCreated, path),
                    CreateKind::Folder => push(ChangeKind::FolderCreated, path),
                    _ => push(created_kind_by_stat(path), path),
                }
            }
        }
        EventKind::Modify(ModifyKind::Name(mode)) => match (mode, event.paths.as_slice()) {
            (RenameMode::Both, [from, to]) => {
                push(ChangeKind::FileRemoved, from);
                push(created_kind_by_stat(to), to);
            }
            (RenameMode::From, paths) => {
                for path in paths {
                    push(ChangeKind::FileRemoved, path);
                }
            }
            (RenameMode::To, paths) => {
                for path in paths {
                    push(created_kind_by_stat(path), path);
                }
            }
            (_, paths) => {
                // Unspecified rename direction: existence decides
                for path in paths {
                    if path.exists() {
                        push(created_kind_by_stat(path), path);
                    } else {
                        push(ChangeKind::FileRemoved, path);
                    }
                }
            }
        },
        EventKind::Modify(_) => {
            // No folder-update event exists; directory modifications are noise
            for path in &event.paths {
                if path.is_file() {
                    push(ChangeKind::FileModified, path);
                }
            }
        }
        EventKind::Remove(remove_kind) => {
            for path in &event.paths {
                match remove_kind {
                    RemoveKind::Folder => push(ChangeKind::FolderRemoved, path),
                    // Files dominate, and the entry is gone before it can be stat'ed
                    _ => push(ChangeKind::FileRemoved, path),
                }
            }
        }
        _ => {}
    }

    changes
}

/// A create of unspecified kind is classified by a stat on the path.
fn created_kind_by_stat(path: &Path) -> ChangeKind {
    if path.is_dir() {
        ChangeKind::FolderCreated
    } else {
        ChangeKind::FileCreated
    }
}

fn normalize(
    kind: ChangeKind,
    absolute: &Path,
    root: &Path,
    ignore: &IgnoreSet,
) -> Option<RawChange> {
    let relative = paths::relative_to_root(absolute, root)?;
    if relative.as_os_str().is_empty() {
        // The root itself is never an event subject
        return None;
    }
    if ignore.is_excluded(&relative) {
        return None;
    }

    Some(RawChange::new(kind, absolute.to_path_buf(), relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::EventAttributes;

    fn create_event(kind: CreateKind, path: &str) -> Event {
        Event {
            kind: EventKind::Create(kind),
            paths: vec![PathBuf::from(path)],
            attrs: EventAttributes::default(),
        }
    }

    #[test]
    fn test_file_create_maps_to_file_created() {
        let ignore = IgnoreSet::compile(&[]).unwrap();
        let root = Path::new("/project");

        let changes =
            changes_from_event(create_event(CreateKind::File, "/project/a.txt"), root, &ignore);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::FileCreated);
        assert_eq!(changes[0].relative, PathBuf::from("a.txt"));
    }

    #[test]
    fn test_folder_create_maps_to_folder_created() {
        let ignore = IgnoreSet::compile(&[]).unwrap();
        let root = Path::new("/project");

        let changes =
            changes_from_event(create_event(CreateKind::Folder, "/project/src"), root, &ignore);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::FolderCreated);
    }

    #[test]
    fn test_excluded_path_is_dropped_at_the_boundary() {
        let ignore = IgnoreSet::compile(&["*.log".to_string()]).unwrap();
        let root = Path::new("/project");

        let changes = changes_from_event(
            create_event(CreateKind::File, "/project/debug.log"),
            root,
            &ignore,
        );

        assert!(changes.is_empty());
    }

    #[test]
    fn test_path_outside_root_is_dropped() {
        let ignore = IgnoreSet::compile(&[]).unwrap();
        let root = Path::new("/project");

        let changes = changes_from_event(
            create_event(CreateKind::File, "/elsewhere/a.txt"),
            root,
            &ignore,
        );

        assert!(changes.is_empty());
    }

    #[test]
    fn test_remove_kinds() {
        let ignore = IgnoreSet::compile(&[]).unwrap();
        let root = Path::new("/project");

        let event = Event {
            kind: EventKind::Remove(RemoveKind::Folder),
            paths: vec![PathBuf::from("/project/build")],
            attrs: EventAttributes::default(),
        };
        let changes = changes_from_event(event, root, &ignore);
        assert_eq!(changes[0].kind, ChangeKind::FolderRemoved);

        let event = Event {
            kind: EventKind::Remove(RemoveKind::File),
            paths: vec![PathBuf::from("/project/a.txt")],
            attrs: EventAttributes::default(),
        };
        let changes = changes_from_event(event, root, &ignore);
        assert_eq!(changes[0].kind, ChangeKind::FileRemoved);
    }

    #[test]
    fn test_access_events_are_dropped() {
        let ignore = IgnoreSet::compile(&[]).unwrap();
        let root = Path::new("/project");

        let event = Event {
            kind: EventKind::Access(notify::event::AccessKind::Any),
            paths: vec![PathBuf::from("/project/a.txt")],
            attrs: EventAttributes::default(),
        };

        assert!(changes_from_event(event, root, &ignore).is_empty());
    }
}
