//! Facade configuration.

use std::sync::Arc;

use crate::source::TemplateSource;

/// Configuration for [`Templates`](crate::Templates).
///
/// Built with chained setters and validated by
/// [`Templates::new`](crate::Templates::new); a source provider is the one
/// required field.
///
/// # Example
///
/// ```rust
/// use tmplcache::{Config, DirSource};
///
/// let config = Config::new()
///     .source(DirSource::new("./templates"))
///     .common_glob("common/*.html.tmpl");
/// ```
#[derive(Clone, Default)]
pub struct Config {
    pub(crate) source: Option<Arc<dyn TemplateSource>>,
    pub(crate) disable_cache: bool,
    pub(crate) common_glob: Option<String>,
}

impl Config {
    /// Creates an empty configuration: no source, caching enabled, no common
    /// glob.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the template source provider. Required.
    pub fn source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Disables the executor cache.
    ///
    /// Every execute call then re-reads and re-parses its sources, which
    /// turns edits to a [`DirSource`](crate::DirSource) tree into live
    /// reloads at the cost of parsing on every call.
    pub fn disable_cache(mut self, disable: bool) -> Self {
        self.disable_cache = disable;
        self
    }

    /// Sets a pattern whose sources are merged into every parse.
    ///
    /// Common sources are parsed before the glob-specific ones, so the
    /// latter may override names and blocks the common set defines.
    pub fn common_glob(mut self, pattern: impl Into<String>) -> Self {
        self.common_glob = Some(pattern.into());
        self
    }
}
