/// Crate-wide result alias.
pub type StoryplateResult<T> = Result<T, StoryplateError>;

/// Errors surfaced by the storyplate library.
///
/// The render path never propagates asset or route failures to its caller; those are turned into
/// placeholders or omitted visuals and logged. The variants still exist so lower layers can report
/// them precisely.
#[derive(thiserror::Error, Debug)]
pub enum StoryplateError {
    /// Malformed or out-of-contract input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image or font could not be fetched or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// The route point set cannot be projected (fewer than two points or zero extent).
    #[error("empty route: {0}")]
    EmptyRoute(String),

    /// An encoded polyline could not be decoded.
    #[error("polyline decode error: {0}")]
    PolylineDecode(String),

    /// A raster operation failed.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with context attached by `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryplateError {
    /// Build a [`StoryplateError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryplateError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`StoryplateError::EmptyRoute`].
    pub fn empty_route(msg: impl Into<String>) -> Self {
        Self::EmptyRoute(msg.into())
    }

    /// Build a [`StoryplateError::PolylineDecode`].
    pub fn polyline(msg: impl Into<String>) -> Self {
        Self::PolylineDecode(msg.into())
    }

    /// Build a [`StoryplateError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StoryplateError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for failures that only degrade a single visual (asset, route, polyline).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Asset(_) | Self::EmptyRoute(_) | Self::PolylineDecode(_)
        )
    }
}

impl From<serde_json::Error> for StoryplateError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
