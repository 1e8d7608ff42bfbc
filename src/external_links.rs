use tauri::webview::{NewWindowFeatures, NewWindowResponse};
use tauri::{AppHandle, Runtime};
use tauri_plugin_opener::OpenerExt;
use url::Url;

pub(crate) fn should_open_external(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => !is_localhost_url(url),
        "mailto" | "tel" => true,
        _ => false,
    }
}

// Never hand local dev servers to the system browser.
fn is_localhost_url(url: &Url) -> bool {
    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]")
    )
}

/// `on_new_window` hook: pages never get a second webview window; links
/// they try to pop out go to the system default handler instead.
pub(crate) fn handle_new_window<R: Runtime>(
    app: &AppHandle<R>,
    url: Url,
    _features: NewWindowFeatures,
) -> NewWindowResponse<R> {
    if should_open_external(&url) {
        log::info!("Opening externally: {}", url);
        if let Err(e) = app.opener().open_url(url.as_str(), None::<&str>) {
            log::warn!("Failed to open {} externally: {}", url, e);
        }
    } else {
        log::debug!("Blocked new window for {}", url);
    }
    NewWindowResponse::Deny
}
