//! # tmplcache - Cached MiniJinja Rendering over Glob-Selected Template Sets
//!
//! `tmplcache` sits between an application and MiniJinja: you name a glob of
//! template sources and a template to render, it parses the matching set
//! once, caches the parse, and renders against caller-supplied data. Repeated
//! renders under load skip the parse cost entirely; during development the
//! cache can be disabled so template edits show up on the next render with no
//! restart.
//!
//! ## Core Concepts
//!
//! - [`Templates`]: the facade; one [`execute`](Templates::execute) call
//!   renders one named template from one glob-selected set
//! - [`Config`]: source provider (required), cache toggle, optional common
//!   glob merged into every parse
//! - [`TemplateSource`]: where template text comes from - [`DirSource`] for
//!   a directory tree, [`EmbeddedSource`] for in-memory content, or your own
//!   implementation
//! - Common templates: sources matched by the configured common glob are
//!   parsed first in every set, so page templates can override the blocks
//!   and names they define
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Serialize;
//! use tmplcache::{Config, EmbeddedSource, Templates};
//!
//! #[derive(Serialize)]
//! struct Page {
//!     text: String,
//! }
//!
//! let source = EmbeddedSource::from_entries(&[
//!     ("common/base.html.tmpl", "hello {% block content %}{% endblock %}"),
//!     (
//!         "test.html.tmpl",
//!         "{% extends \"common/base.html.tmpl\" %}{% block content %}{{ text }}{% endblock %}",
//!     ),
//! ]);
//!
//! let templates = Templates::new(
//!     Config::new()
//!         .source(source)
//!         .common_glob("common/*.html.tmpl"),
//! )
//! .unwrap();
//!
//! let output = templates
//!     .execute("test.html.tmpl", "test.html.tmpl", &Page { text: "world".into() })
//!     .unwrap();
//! assert_eq!(output, "hello world");
//! ```
//!
//! ## Caching Model
//!
//! The cache maps each distinct glob string to its parsed template set. It is
//! lazily populated, additive-only, and lives for the facade's lifetime -
//! there is no eviction and no invalidation. If two threads race on the first
//! use of a glob both may parse, one parse is kept, and both calls succeed.
//!
//! With [`Config::disable_cache`] every call re-reads and re-parses its
//! sources. Paired with [`DirSource`] that is the hot-reload development
//! loop; a warning is logged once at construction as a reminder of the cost.
//!
//! ## Escaping
//!
//! Output escaping is MiniJinja's, selected per template name. Names ending
//! in a template extension (`.tmpl`, `.jinja`, `.j2`) have it stripped first,
//! so `page.html.tmpl` auto-escapes as HTML. Undefined-variable references
//! are strict: data that does not satisfy a template's references is a render
//! error, not empty output.

mod config;
mod error;
mod executor;
mod pool;
pub mod source;
mod templates;

pub use config::Config;
pub use error::{Result, TemplateError};
pub use source::{DirSource, EmbeddedSource, SourceError, SourceFile, TemplateSource};
pub use templates::Templates;
