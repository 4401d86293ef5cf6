//! Structured error types for tableshape.
//!
//! Fatal preconditions (reading output before the first update, using a
//! disposed source) and device/config failures. Unresolvable fonts and
//! zero-width borders are not errors.

/// All errors that can occur while configuring or rendering a table shape.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Output was requested before the first successful `update`.
    #[error("no rendered output: update must be called before reading the command list")]
    NotRendered,

    /// The shape source has already released its device resources.
    #[error("table shape source has been disposed")]
    Disposed,

    /// Drawing device failure (resource creation, end-draw).
    #[error("Device error: {0}")]
    Device(String),

    /// Invalid configuration values.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON (de)serialization failure.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The rendering thread went away while a task was queued for it.
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

impl From<String> for TableError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for TableError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<TableError> for wasm_bindgen::JsValue {
    fn from(e: TableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
