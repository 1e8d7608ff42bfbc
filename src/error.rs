/// Errors that can occur while managing the profile windows
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Window host error: {0}")]
    Tauri(#[from] tauri::Error),

    #[error("Settings store error: {0}")]
    Store(#[from] tauri_plugin_store::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Window not found: {0}")]
    MissingWindow(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}
