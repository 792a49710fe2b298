//! The `Templates` facade: cached execution of glob-selected template sets.

use std::sync::Arc;

use dashmap::DashMap;
use minijinja::Value;
use serde::Serialize;
use tracing::warn;

use crate::config::Config;
use crate::error::{Result, TemplateError};
use crate::executor::Executor;
use crate::pool::BufferPool;
use crate::source::TemplateSource;

/// Renders named templates from glob-selected source sets, caching one
/// parsed executor per distinct glob.
///
/// The facade is `Send + Sync`; share one instance behind a reference or an
/// `Arc` and call [`execute`](Self::execute) from as many threads as needed.
/// The cache is additive-only and lives as long as the facade: there is no
/// eviction and no invalidation, which is the right trade for template sets
/// that change only on deploy. During development, construct with
/// [`Config::disable_cache`] to re-parse sources on every call instead.
///
/// # Example
///
/// ```rust
/// use serde::Serialize;
/// use tmplcache::{Config, EmbeddedSource, Templates};
///
/// #[derive(Serialize)]
/// struct Page {
///     title: String,
/// }
///
/// let source = EmbeddedSource::from_entries(&[
///     ("index.html.tmpl", "<h1>{{ title }}</h1>"),
/// ]);
/// let templates = Templates::new(Config::new().source(source)).unwrap();
///
/// let html = templates
///     .execute("index.html.tmpl", "index.html.tmpl", &Page { title: "Hi".into() })
///     .unwrap();
/// assert_eq!(html, "<h1>Hi</h1>");
/// ```
pub struct Templates {
    source: Arc<dyn TemplateSource>,
    common_glob: Option<String>,
    disable_cache: bool,
    executors: DashMap<String, Arc<Executor>>,
    buffers: BufferPool,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates")
            .field("common_glob", &self.common_glob)
            .field("disable_cache", &self.disable_cache)
            .field("executors", &self.executors)
            .field("buffers", &self.buffers)
            .finish_non_exhaustive()
    }
}

impl Templates {
    /// Creates a facade from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingSource`] if no source provider was
    /// configured.
    pub fn new(config: Config) -> Result<Self> {
        let source = config.source.ok_or(TemplateError::MissingSource)?;
        if config.disable_cache {
            warn!("template caching disabled, sources are parsed on every execute");
        }
        Ok(Self {
            source,
            common_glob: config.common_glob,
            disable_cache: config.disable_cache,
            executors: DashMap::new(),
            buffers: BufferPool::new(),
        })
    }

    /// Renders `template_name` from the set selected by `glob` with `data`.
    ///
    /// The set is the common-glob sources (if configured) plus everything
    /// `glob` matches. With caching enabled (the default) the parsed set is
    /// reused for every later call with the same `glob` string; with caching
    /// disabled it is rebuilt from the provider on each call.
    ///
    /// # Errors
    ///
    /// Fails if the glob resolves to nothing, a source cannot be read, a
    /// source fails to parse, the named template is not in the set, or the
    /// data does not satisfy a reference the template makes. Errors are
    /// returned as-is; nothing is retried and no partial output is produced.
    pub fn execute<T: Serialize>(
        &self,
        glob: &str,
        template_name: &str,
        data: &T,
    ) -> Result<String> {
        let mut buffer = self.buffers.acquire();
        let value = Value::from_serialize(data);

        if self.disable_cache {
            let executor = self.build_executor(glob)?;
            executor.render_to(&mut buffer, template_name, &value)?;
        } else {
            let executor = self.executor_for(glob)?;
            executor.render_to(&mut buffer, template_name, &value)?;
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Resolves the cached executor for `glob`, building on first use.
    ///
    /// Two threads missing on the same unseen glob may both build; the
    /// `or_insert` retains whichever was stored first and the other build is
    /// dropped. That redundant parse is cheaper than holding a lock across
    /// source I/O on every cold key.
    fn executor_for(&self, glob: &str) -> Result<Arc<Executor>> {
        if let Some(executor) = self.executors.get(glob) {
            return Ok(executor.value().clone());
        }

        let built = Arc::new(self.build_executor(glob)?);
        Ok(self
            .executors
            .entry(glob.to_string())
            .or_insert(built)
            .value()
            .clone())
    }

    /// Builds a fresh executor: common sources first, then the glob's.
    fn build_executor(&self, glob: &str) -> Result<Executor> {
        let mut patterns = Vec::with_capacity(2);
        if let Some(common) = &self.common_glob {
            patterns.push(common.as_str());
        }
        patterns.push(glob);
        Executor::build(self.source.as_ref(), &patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EmbeddedSource, SourceError, SourceFile};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that counts resolutions, for cache-hit assertions.
    struct CountingSource {
        inner: EmbeddedSource,
        reads: Arc<AtomicUsize>,
    }

    impl TemplateSource for CountingSource {
        fn read_glob(&self, pattern: &str) -> std::result::Result<Vec<SourceFile>, SourceError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_glob(pattern)
        }
    }

    fn counting_config(entries: &[(&str, &str)]) -> (Config, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: EmbeddedSource::from_entries(entries),
            reads: reads.clone(),
        };
        (Config::new().source(source), reads)
    }

    #[test]
    fn test_facade_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Templates>();
    }

    #[test]
    fn test_new_without_source_fails() {
        let err = Templates::new(Config::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingSource));
    }

    #[test]
    fn test_new_with_source_succeeds() {
        assert!(Templates::new(Config::new().source(EmbeddedSource::new())).is_ok());
        assert!(Templates::new(
            Config::new()
                .source(EmbeddedSource::new())
                .common_glob("common/*.tmpl")
        )
        .is_ok());
    }

    #[test]
    fn test_second_execute_hits_cache() {
        let (config, reads) = counting_config(&[("a.txt.tmpl", "A={{ n }}")]);
        let templates = Templates::new(config).unwrap();

        let first = templates
            .execute("a.txt.tmpl", "a.txt.tmpl", &serde_json::json!({"n": 1}))
            .unwrap();
        let after_first = reads.load(Ordering::SeqCst);
        assert_eq!(first, "A=1");
        assert!(after_first > 0);

        let second = templates
            .execute("a.txt.tmpl", "a.txt.tmpl", &serde_json::json!({"n": 1}))
            .unwrap();
        assert_eq!(second, first);
        assert_eq!(reads.load(Ordering::SeqCst), after_first);
    }

    #[test]
    fn test_disable_cache_rereads_every_call() {
        let (config, reads) = counting_config(&[("a.txt.tmpl", "A")]);
        let templates = Templates::new(config.disable_cache(true)).unwrap();

        templates
            .execute("a.txt.tmpl", "a.txt.tmpl", &serde_json::json!({}))
            .unwrap();
        let after_first = reads.load(Ordering::SeqCst);

        templates
            .execute("a.txt.tmpl", "a.txt.tmpl", &serde_json::json!({}))
            .unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), after_first * 2);
    }

    #[test]
    fn test_distinct_globs_get_distinct_executors() {
        let source =
            EmbeddedSource::from_entries(&[("a.txt.tmpl", "from a"), ("b.txt.tmpl", "from b")]);
        let templates = Templates::new(Config::new().source(source)).unwrap();

        let a = templates
            .execute("a.txt.tmpl", "a.txt.tmpl", &serde_json::json!({}))
            .unwrap();
        let b = templates
            .execute("b.txt.tmpl", "b.txt.tmpl", &serde_json::json!({}))
            .unwrap();
        assert_eq!(a, "from a");
        assert_eq!(b, "from b");
    }

    #[test]
    fn test_zero_match_glob_is_source_error() {
        let source = EmbeddedSource::from_entries(&[("a.txt.tmpl", "A")]);
        let templates = Templates::new(Config::new().source(source)).unwrap();

        let err = templates
            .execute("missing/*.tmpl", "a.txt.tmpl", &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Source(SourceError::NoMatches { .. })
        ));
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let (config, reads) = counting_config(&[("a.txt.tmpl", "A")]);
        let templates = Templates::new(config).unwrap();

        assert!(templates
            .execute("missing/*.tmpl", "a.txt.tmpl", &serde_json::json!({}))
            .is_err());
        let after_failure = reads.load(Ordering::SeqCst);

        // The failed glob is retried against the provider, not served from
        // the cache.
        assert!(templates
            .execute("missing/*.tmpl", "a.txt.tmpl", &serde_json::json!({}))
            .is_err());
        assert!(reads.load(Ordering::SeqCst) > after_failure);
    }

    #[test]
    fn test_concurrent_cold_start_on_one_glob() {
        let (config, _reads) = counting_config(&[("a.txt.tmpl", "A={{ n }}")]);
        let templates = Templates::new(config).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        templates.execute("a.txt.tmpl", "a.txt.tmpl", &serde_json::json!({"n": 7}))
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap(), "A=7");
            }
        });

        // However many raced, exactly one executor was retained.
        assert_eq!(templates.executors.len(), 1);
    }
}
