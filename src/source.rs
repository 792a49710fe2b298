//! Template source providers.
//!
//! This module defines [`TemplateSource`], the seam between the cache and
//! wherever template text actually lives. A provider resolves a glob pattern
//! to the set of named sources it matches; the facade never touches the
//! filesystem (or anything else) directly.
//!
//! Two providers ship with the crate:
//!
//! - [`DirSource`]: reads templates from a directory tree on disk. Sources
//!   are re-read on every resolution, which is what makes hot reload work
//!   when caching is disabled.
//! - [`EmbeddedSource`]: serves templates from an in-memory map, for content
//!   compiled into the binary or assembled at startup.
//!
//! # Glob Semantics
//!
//! Patterns are matched with `globset`, compiled so that `*` does not cross
//! directory separators: `common/*.html.tmpl` matches direct children of
//! `common/`, not `common/nested/base.html.tmpl`. Names are always
//! slash-separated relative paths, regardless of platform.
//!
//! A pattern that matches nothing is an error ([`SourceError::NoMatches`]),
//! not an empty set: rendering against zero sources can only fail later with
//! a less useful message.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

/// A named template source returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Slash-separated name the template is registered under, e.g.
    /// `"common/base.html.tmpl"`.
    pub name: String,
    /// Template text.
    pub content: String,
}

/// Errors raised while resolving a glob pattern against a provider.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The pattern itself does not parse as a glob.
    #[error("invalid glob pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The pattern matched no sources.
    #[error("no templates match \"{pattern}\"")]
    NoMatches { pattern: String },

    /// A matched source could not be read.
    #[error("failed to read template \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A glob-capable read interface over named template sources.
///
/// Implementations must be safe to call from multiple threads at once; the
/// facade shares one provider across all concurrent `execute` calls.
pub trait TemplateSource: Send + Sync {
    /// Returns every source matching `pattern`, in stable name-sorted order.
    ///
    /// # Errors
    ///
    /// Fails if the pattern is invalid, matches nothing, or a matched source
    /// cannot be read.
    fn read_glob(&self, pattern: &str) -> Result<Vec<SourceFile>, SourceError>;
}

/// Compiles a pattern with `*` confined to a single path level.
fn compile(pattern: &str) -> Result<GlobMatcher, SourceError> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| SourceError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
    Ok(glob.compile_matcher())
}

/// Template provider backed by a directory tree.
///
/// Templates are addressed by their slash-separated path relative to the
/// root. Files are read from disk on every [`read_glob`](TemplateSource::read_glob)
/// call; nothing is cached at this layer.
///
/// # Example
///
/// ```rust,ignore
/// let source = DirSource::new("./templates");
/// let files = source.read_glob("pages/*.html.tmpl")?;
/// ```
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Creates a provider rooted at `root`.
    ///
    /// The directory is not checked here; a missing or unreadable root
    /// surfaces as a [`SourceError`] on first resolution.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the configured root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Slash-separated path of `entry` relative to `root`.
fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

impl TemplateSource for DirSource {
    fn read_glob(&self, pattern: &str) -> Result<Vec<SourceFile>, SourceError> {
        let matcher = compile(pattern)?;

        let mut matched: Vec<(String, PathBuf)> = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                SourceError::Io {
                    path,
                    source: err.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = relative_name(&self.root, entry.path()) else {
                continue;
            };
            if matcher.is_match(Path::new(&name)) {
                matched.push((name, entry.into_path()));
            }
        }

        if matched.is_empty() {
            return Err(SourceError::NoMatches {
                pattern: pattern.to_string(),
            });
        }
        matched.sort_by(|a, b| a.0.cmp(&b.0));

        matched
            .into_iter()
            .map(|(name, path)| {
                let content =
                    std::fs::read_to_string(&path).map_err(|source| SourceError::Io {
                        path: path.clone(),
                        source,
                    })?;
                Ok(SourceFile { name, content })
            })
            .collect()
    }
}

/// Template provider backed by an in-memory map.
///
/// Useful for templates embedded in the binary (e.g. via `include_str!`
/// tables) and for tests. Names should be slash-separated relative paths so
/// the same globs work against either provider.
///
/// # Example
///
/// ```rust
/// use tmplcache::{EmbeddedSource, TemplateSource};
///
/// let source = EmbeddedSource::from_entries(&[
///     ("pages/index.html.tmpl", "<h1>{{ title }}</h1>"),
///     ("pages/about.html.tmpl", "<p>{{ body }}</p>"),
/// ]);
/// let files = source.read_glob("pages/*.html.tmpl").unwrap();
/// assert_eq!(files.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddedSource {
    templates: BTreeMap<String, String>,
}

impl EmbeddedSource {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider from `(name, content)` pairs.
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        let templates = entries
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();
        Self { templates }
    }

    /// Adds or replaces a template.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.templates.insert(name.into(), content.into());
    }
}

impl TemplateSource for EmbeddedSource {
    fn read_glob(&self, pattern: &str) -> Result<Vec<SourceFile>, SourceError> {
        let matcher = compile(pattern)?;

        // BTreeMap iteration is already name-sorted.
        let matched: Vec<SourceFile> = self
            .templates
            .iter()
            .filter(|(name, _)| matcher.is_match(Path::new(name)))
            .map(|(name, content)| SourceFile {
                name: name.clone(),
                content: content.clone(),
            })
            .collect();

        if matched.is_empty() {
            return Err(SourceError::NoMatches {
                pattern: pattern.to_string(),
            });
        }
        Ok(matched)
    }
}
