/// Fatal startup failures. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("no global `window`")]
    NoWindow,
    #[error("no document on window")]
    NoDocument,
    #[error("canvas element `#{0}` not found")]
    MissingCanvas(String),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("surface reports no supported formats")]
    UnsupportedSurface,
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Panel persistence failures. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("browser storage error: {0}")]
    Browser(String),
}
