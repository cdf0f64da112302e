/// Convenience result type used across routeviz.
pub type VizResult<T> = Result<T, VizError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Nothing here is fatal to playback: callers get the error back and the controller keeps its
/// previous state.
#[derive(thiserror::Error, Debug)]
pub enum VizError {
    /// Malformed step data (not an array, wrong field types, failed backend envelope).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A step index outside `[0, len)`.
    #[error("not found: {0}")]
    NotFound(String),

    /// The drawing surface rejected an operation.
    #[error("surface error: {0}")]
    Surface(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VizError {
    /// Build a [`VizError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`VizError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`VizError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`VizError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for the recoverable out-of-range condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
