use crate::{load, DashConfig};
use dash_core::{spawn_task, TaskHandle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Watches the config file and delivers a freshly loaded [`DashConfig`]
/// every time it changes on disk.
///
/// The parent directory is watched rather than the file itself so editors
/// that save by rename are still picked up.  Edits that fail to parse or
/// validate are logged and skipped; the previous config stays in effect.
/// Dropping the watcher stops watching and closes the receiver.
///
/// # Example
/// ```ignore
/// let (_watcher, mut rx) = ConfigWatcher::spawn(dash_config::default_path());
/// while let Some(config) = rx.recv().await {
///     monitor.set_thresholds(config.alerts, config.suggestions);
/// }
/// ```
#[derive(Debug)]
pub struct ConfigWatcher {
    task: TaskHandle,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver of reloaded configs.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<DashConfig>) {
        let (tx, rx) = mpsc::channel(1);
        let task = spawn_task(watch_loop(path.as_ref().to_path_buf(), tx));
        (Self { task }, rx)
    }

    pub fn is_watching(&self) -> bool {
        self.task.is_active()
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<DashConfig>) {
    use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

    let Some(dir) = path.parent().map(Path::to_path_buf) else {
        error!("Config path '{}' has no parent directory", path.display());
        return;
    };

    let (raw_tx, mut raw_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = raw_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", dir.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = raw_rx.recv().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("Watcher error: {e}");
                continue;
            }
        };

        let touches_config = event
            .paths
            .iter()
            .any(|p| p.file_name() == path.file_name());
        if !touches_config || !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            continue;
        }

        match load(&path) {
            Ok(config) => {
                info!("Config reloaded from {}", path.display());
                if tx.send(config).await.is_err() {
                    break; // receiver dropped
                }
            }
            Err(e) => warn!("Ignoring config change: {e}"),
        }
    }
}
