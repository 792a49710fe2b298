//! Error types for template resolution and rendering.

use crate::source::SourceError;

/// Errors returned by [`Templates`](crate::Templates) construction and
/// execution.
///
/// The variants follow the lifecycle of a call: configuration is checked at
/// construction, sources are resolved and parsed when an executor is built,
/// and rendering runs last. Underlying causes are preserved so callers can
/// inspect them (e.g. `minijinja::ErrorKind` on parse/render failures).
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template source was configured.
    #[error("no template source configured")]
    MissingSource,

    /// The source provider failed to resolve a glob pattern.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A matched template source failed to parse.
    #[error("template parse failed: {0}")]
    Parse(#[source] minijinja::Error),

    /// Rendering failed: the named template does not exist among the parsed
    /// sources, or the supplied data does not satisfy a reference the
    /// template makes.
    #[error("template render failed: {0}")]
    Render(#[source] minijinja::Error),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
