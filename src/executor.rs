//! Parsed template sets.
//!
//! An [`Executor`] is one fully built MiniJinja environment holding every
//! source a glob resolution produced. It is immutable after construction,
//! which is what makes sharing it across threads from the cache safe.

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};

use crate::error::TemplateError;
use crate::source::TemplateSource;

/// Auto-escape selection for a template name.
///
/// MiniJinja keys escaping off the final extension, so `page.html.tmpl`
/// would not escape as HTML on its own. Strip one trailing template
/// extension before consulting the default detection.
fn auto_escape_for(name: &str) -> AutoEscape {
    let base = name
        .strip_suffix(".tmpl")
        .or_else(|| name.strip_suffix(".jinja"))
        .or_else(|| name.strip_suffix(".j2"))
        .unwrap_or(name);
    minijinja::default_auto_escape_callback(base)
}

/// A compiled, immutable set of templates ready to render.
#[derive(Debug)]
pub(crate) struct Executor {
    env: Environment<'static>,
}

impl Executor {
    /// Parses every source matched by `patterns`, in order, into one
    /// environment.
    ///
    /// Ordering is significant: a later source replaces an earlier one with
    /// the same name, so common sources go first and glob-specific sources
    /// can override them.
    pub(crate) fn build(
        source: &dyn TemplateSource,
        patterns: &[&str],
    ) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(auto_escape_for);

        for pattern in patterns {
            for file in source.read_glob(pattern)? {
                env.add_template_owned(file.name, file.content)
                    .map_err(TemplateError::Parse)?;
            }
        }

        Ok(Self { env })
    }

    /// Renders the named template with `data` into `out`.
    pub(crate) fn render_to(
        &self,
        out: &mut Vec<u8>,
        name: &str,
        data: &Value,
    ) -> Result<(), TemplateError> {
        let template = self.env.get_template(name).map_err(TemplateError::Render)?;
        template
            .render_to_write(data, &mut *out)
            .map_err(TemplateError::Render)?;
        Ok(())
    }
}
