//! Change notifications for development mode.

use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use spdlog::{debug, info, warn};
use tokio::sync::mpsc;

pub const WATCHED_EXTENSIONS: [&str; 4] = ["tpl", "html", "css", "js"];

/// Watches directories and forwards the paths of changed sources.
/// Watching stops when this value is dropped.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
}

pub fn is_source(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => WATCHED_EXTENSIONS.contains(&ext),
        None => false,
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
}

impl SourceWatcher {
    pub fn watch(dirs: &[PathBuf]) -> io::Result<(SourceWatcher, mpsc::Receiver<PathBuf>)> {
        let (tx, rx) = mpsc::channel(100);

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                match res {
                    Ok(event) if is_change(&event.kind) => {
                        for path in event.paths.into_iter().filter(|p| is_source(p)) {
                            debug!("Source changed: {}", path.display());
                            if tx.blocking_send(path).is_err() {
                                return;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Watcher error: {}", e),
                }
            },
            Config::default(),
        ).map_err(|e| io::Error::new(ErrorKind::Other, format!("Failed to create watcher: {}", e)))?;

        for dir in dirs {
            if !dir.exists() {
                warn!("Not watching {}: path not found", dir.display());
                continue;
            }
            watcher.watch(dir, RecursiveMode::Recursive)
                .map_err(|e| io::Error::new(ErrorKind::Other, format!("Failed to watch {}: {}", dir.display(), e)))?;
            info!("Watching for changes: {}", dir.display());
        }

        Ok((SourceWatcher { _watcher: watcher }, rx))
    }
}
