/// Convenience result type used across traitforge.
pub type TraitforgeResult<T> = Result<T, TraitforgeError>;

/// Top-level error taxonomy used by generator and composition APIs.
#[derive(thiserror::Error, Debug)]
pub enum TraitforgeError {
    /// Invalid user-provided configuration or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or malformed outline descriptor or path data.
    #[error("outline error: {0}")]
    Outline(String),

    /// A generator could not produce any usable geometry.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TraitforgeError {
    /// Build a [`TraitforgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TraitforgeError::Outline`] value.
    pub fn outline(msg: impl Into<String>) -> Self {
        Self::Outline(msg.into())
    }

    /// Build a [`TraitforgeError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`TraitforgeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for TraitforgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
