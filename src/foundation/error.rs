/// Convenience result type used across gridpulse.
pub type GridResult<T> = Result<T, GridError>;

/// Top-level error taxonomy.
///
/// The component itself never fails on degenerate configuration; these errors cover
/// configuration parsing, rasterization and IO around it.
#[derive(thiserror::Error, Debug)]
pub enum GridError {
    /// Invalid user-provided data (configuration files, CLI overrides).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while turning a frame into SVG text or pixels.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GridError {
    /// Build a [`GridError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GridError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GridError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
