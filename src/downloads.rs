//! Download progress on the primary window's taskbar/dock icon.
//!
//! The webview only reports when a download starts and when it finishes, so
//! progress is reconstructed: received bytes come from the size of the file
//! being written, the total from a `HEAD` request made with the profile's
//! cookies. Without a known total the indicator is indeterminate.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_LENGTH, COOKIE};
use tauri::webview::{DownloadEvent, Webview};
use tauri::window::{ProgressBarState, ProgressBarStatus};
use tauri::{AppHandle, Manager, Runtime, Url};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use uuid::Uuid;

use crate::error::ShellError;
use crate::profile::ProfileId;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Polls without any growth before a download is given up on (5 minutes).
const STALL_LIMIT: u32 = 1200;
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Suffixes webviews use for in-flight files next to the final destination.
const PARTIAL_SUFFIXES: &[&str] = &["crdownload", "download", "part"];

/// What the taskbar/dock progress indicator shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressDisplay {
    None,
    Indeterminate,
    /// Always within `[0, 1]`
    Fraction(f64),
}

impl ProgressDisplay {
    pub fn from_bytes(received: u64, total: Option<u64>) -> Self {
        match total {
            Some(total) if total > 0 => {
                ProgressDisplay::Fraction((received as f64 / total as f64).clamp(0.0, 1.0))
            }
            _ => ProgressDisplay::Indeterminate,
        }
    }

    pub fn to_progress_bar(self) -> ProgressBarState {
        let (status, progress) = match self {
            ProgressDisplay::None => (ProgressBarStatus::None, None),
            ProgressDisplay::Indeterminate => (ProgressBarStatus::Indeterminate, None),
            ProgressDisplay::Fraction(fraction) => (
                ProgressBarStatus::Normal,
                Some((fraction * 100.0).round() as u64),
            ),
        };
        ProgressBarState {
            status: Some(status),
            progress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed,
    Interrupted,
}

#[derive(Debug)]
struct TrackedDownload {
    url: Url,
    destination: PathBuf,
    received: u64,
    total: Option<u64>,
}

impl TrackedDownload {
    fn display(&self) -> ProgressDisplay {
        ProgressDisplay::from_bytes(self.received, self.total)
    }
}

/// Downloads that have started and not yet finished.
#[derive(Debug, Default)]
pub struct DownloadTracker {
    downloads: HashMap<Uuid, TrackedDownload>,
}

impl DownloadTracker {
    pub fn begin(&mut self, url: Url, destination: PathBuf) -> Uuid {
        let id = Uuid::new_v4();
        self.downloads.insert(
            id,
            TrackedDownload {
                url,
                destination,
                received: 0,
                total: None,
            },
        );
        id
    }

    pub fn is_active(&self, id: Uuid) -> bool {
        self.downloads.contains_key(&id)
    }

    pub fn destination(&self, id: Uuid) -> Option<PathBuf> {
        self.downloads.get(&id).map(|d| d.destination.clone())
    }

    /// Returns the new display, or `None` once the download has finished.
    pub fn set_total(&mut self, id: Uuid, total: u64) -> Option<ProgressDisplay> {
        let download = self.downloads.get_mut(&id)?;
        download.total = Some(total);
        Some(download.display())
    }

    /// Returns the new display, or `None` once the download has finished.
    pub fn record_received(&mut self, id: Uuid, received: u64) -> Option<ProgressDisplay> {
        let download = self.downloads.get_mut(&id)?;
        download.received = received;
        Some(download.display())
    }

    /// Forget a download the host never reported as finished. Returns false
    /// if it already finished, so the reset still happens only once.
    pub fn abandon(&mut self, id: Uuid) -> bool {
        self.downloads.remove(&id).is_some()
    }

    /// Match a finish event to a tracked download and forget it.
    ///
    /// Yields an outcome at most once per download; a repeated or unknown
    /// finish event yields `None`.
    pub fn finish(
        &mut self,
        url: &Url,
        path: Option<&Path>,
        success: bool,
    ) -> Option<(Uuid, DownloadOutcome)> {
        let id = self
            .downloads
            .iter()
            .filter(|(_, d)| &d.url == url)
            .max_by_key(|(_, d)| path.is_some_and(|p| p == d.destination))
            .map(|(id, _)| *id)?;
        self.downloads.remove(&id);

        let outcome = if success {
            DownloadOutcome::Completed
        } else {
            DownloadOutcome::Interrupted
        };
        Some((id, outcome))
    }
}

/// Counts consecutive polls that saw no new bytes.
#[derive(Debug, Default)]
struct StallWatch {
    last: Option<u64>,
    unchanged: u32,
}

impl StallWatch {
    /// Record a size sample. Returns true once the limit is reached.
    fn observe(&mut self, size: u64, limit: u32) -> bool {
        if self.last == Some(size) {
            self.unchanged += 1;
        } else {
            self.last = Some(size);
            self.unchanged = 0;
        }
        self.unchanged >= limit
    }
}

/// Managed wrapper so the tracker can be shared with polling tasks.
#[derive(Default)]
pub struct DownloadState(Mutex<DownloadTracker>);

impl DownloadState {
    fn with<T>(&self, f: impl FnOnce(&mut DownloadTracker) -> T) -> T {
        let mut tracker = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tracker)
    }
}

/// `on_download` hook for the primary window. Always lets the download run.
pub fn handle_download<R: Runtime>(webview: Webview<R>, event: DownloadEvent<'_>) -> bool {
    let app = webview.app_handle().clone();
    match event {
        DownloadEvent::Requested { url, destination } => {
            log::info!("Download started: {} -> {}", url, destination.display());
            let id = app
                .state::<DownloadState>()
                .with(|tracker| tracker.begin(url.clone(), destination.clone()));
            set_primary_progress(&app, ProgressDisplay::Indeterminate);
            spawn_size_probe(app.clone(), webview.label().to_string(), id, url);
            spawn_progress_poller(app, id);
        }
        DownloadEvent::Finished { url, path, success } => {
            let finished = app
                .state::<DownloadState>()
                .with(|tracker| tracker.finish(&url, path.as_deref(), success));
            let Some((_, outcome)) = finished else {
                log::debug!("Ignoring finish event for untracked download {}", url);
                return true;
            };

            set_primary_progress(&app, ProgressDisplay::None);
            match outcome {
                DownloadOutcome::Completed => log::info!("Download finished: {}", url),
                DownloadOutcome::Interrupted => {
                    log::warn!("Download interrupted: {}", url);
                    show_interrupted_dialog(&app);
                }
            }
        }
        _ => {}
    }
    true
}

fn set_primary_progress<R: Runtime>(app: &AppHandle<R>, display: ProgressDisplay) {
    let Some(window) = app.get_webview_window(ProfileId::Primary.window_label()) else {
        return;
    };
    if let Err(e) = window.set_progress_bar(display.to_progress_bar()) {
        log::warn!("Failed to update download progress: {}", e);
    }
}

/// Apply a progress update from a background task. The download is checked
/// again on the main thread so an update racing with completion cannot land
/// after the reset.
fn post_progress<R: Runtime>(app: &AppHandle<R>, id: Uuid, display: ProgressDisplay) {
    let handle = app.clone();
    let posted = app.run_on_main_thread(move || {
        if handle.state::<DownloadState>().with(|tracker| tracker.is_active(id)) {
            set_primary_progress(&handle, display);
        }
    });
    if let Err(e) = posted {
        log::warn!("Failed to post download progress: {}", e);
    }
}

fn post_reset<R: Runtime>(app: &AppHandle<R>) {
    let handle = app.clone();
    let posted = app.run_on_main_thread(move || {
        set_primary_progress(&handle, ProgressDisplay::None);
    });
    if let Err(e) = posted {
        log::warn!("Failed to post download progress: {}", e);
    }
}

fn spawn_progress_poller<R: Runtime>(app: AppHandle<R>, id: Uuid) {
    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        let mut stall = StallWatch::default();
        loop {
            ticker.tick().await;
            let state = app.state::<DownloadState>();
            let Some(destination) = state.with(|tracker| tracker.destination(id)) else {
                break;
            };
            let received = observed_size(&destination);
            if stall.observe(received, STALL_LIMIT) {
                if state.with(|tracker| tracker.abandon(id)) {
                    log::warn!(
                        "Download to {} stalled without finishing, clearing progress",
                        destination.display()
                    );
                    post_reset(&app);
                }
                break;
            }
            let Some(display) = state.with(|tracker| tracker.record_received(id, received))
            else {
                break;
            };
            post_progress(&app, id, display);
        }
    });
}

fn spawn_size_probe<R: Runtime>(app: AppHandle<R>, label: String, id: Uuid, url: Url) {
    tauri::async_runtime::spawn(async move {
        match probe_total_bytes(&app, &label, url).await {
            Ok(Some(total)) => {
                let display = app
                    .state::<DownloadState>()
                    .with(|tracker| tracker.set_total(id, total));
                if let Some(display) = display {
                    post_progress(&app, id, display);
                }
            }
            Ok(None) => log::debug!("Download size unknown, progress stays indeterminate"),
            Err(e) => log::debug!("Could not determine download size: {}", e),
        }
    });
}

async fn probe_total_bytes<R: Runtime>(
    app: &AppHandle<R>,
    label: &str,
    url: Url,
) -> Result<Option<u64>, ShellError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Ok(None);
    }

    // Blocks until the webview answers, so keep it off the async workers.
    let cookies = match app.get_webview_window(label) {
        Some(window) => {
            let cookie_url = url.clone();
            tauri::async_runtime::spawn_blocking(move || window.cookies_for_url(cookie_url))
                .await??
        }
        None => Vec::new(),
    };
    let header = cookie_header(cookies.iter().map(|c| (c.name(), c.value())));

    let mut request = reqwest::Client::new()
        .head(url.as_str())
        .timeout(PROBE_TIMEOUT);
    if let Some(header) = header {
        request = request.header(COOKIE, header);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Ok(None);
    }
    Ok(content_length(response.headers()))
}

fn cookie_header<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Option<String> {
    let joined = pairs
        .into_iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ");
    (!joined.is_empty()).then_some(joined)
}

/// Read from the header itself: the body length of a `HEAD` response is 0.
fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|len| *len > 0)
}

fn partial_candidates(destination: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![destination.to_path_buf()];
    if let Some(name) = destination.file_name() {
        for suffix in PARTIAL_SUFFIXES {
            let mut partial = name.to_os_string();
            partial.push(".");
            partial.push(suffix);
            candidates.push(destination.with_file_name(partial));
        }
    }
    candidates
}

/// Bytes written so far. An in-flight sibling wins over the destination,
/// which may still hold an older file of the same name.
fn observed_size(destination: &Path) -> u64 {
    let size = |path: &Path| fs::metadata(path).ok().map(|meta| meta.len());
    partial_candidates(destination)
        .iter()
        .skip(1)
        .filter_map(|path| size(path))
        .max()
        .or_else(|| size(destination))
        .unwrap_or(0)
}

fn show_interrupted_dialog<R: Runtime>(app: &AppHandle<R>) {
    let mut dialog = app
        .dialog()
        .message("The download was interrupted")
        .title("Download error")
        .kind(MessageDialogKind::Error);
    if let Some(window) = app.get_webview_window(ProfileId::Primary.window_label()) {
        dialog = dialog.parent(&window);
    }
    // Runs on the main thread, where blocking_show would deadlock.
    dialog.show(|_| {});
}
