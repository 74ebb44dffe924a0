//! View renderer
//!
//! Page templates rendered with Tera. The stock templates are embedded in
//! the binary; a directory configured as `views.path` can replace any of
//! them by file name (e.g. `tweets/index.html`).

use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

use crate::config::ViewsConfig;

mod error;
pub mod filters;

pub use error::ViewError;

/// Stock templates shipped with the binary
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct EmbeddedTemplates;

pub struct ViewRenderer {
    tera: Tera,
}

impl ViewRenderer {
    /// Renderer over the embedded templates only
    pub fn embedded() -> Result<Self> {
        Self::build(embedded_templates()?)
    }

    /// Embedded templates, with every `.html` file under `dir` taking precedence
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut templates = embedded_templates()?;
        let mut overrides = Vec::new();
        collect_templates_from_dir(dir, dir, &mut overrides)
            .with_context(|| format!("Failed to read view overrides from {:?}", dir))?;

        for (name, content) in overrides {
            tracing::debug!("Overriding template {}", name);
            templates.retain(|(existing, _)| existing != &name);
            templates.push((name, content));
        }

        Self::build(templates)
    }

    pub fn from_config(config: &ViewsConfig) -> Result<Self> {
        match &config.path {
            Some(dir) if dir.is_dir() => Self::with_overrides(dir),
            Some(dir) => {
                tracing::warn!("View override directory {:?} not found, using embedded templates", dir);
                Self::embedded()
            }
            None => Self::embedded(),
        }
    }

    fn build(templates: Vec<(String, String)>) -> Result<Self> {
        let mut tera = Tera::default();
        // add_raw_templates resolves `extends` chains once every template is present
        tera.add_raw_templates(templates)
            .map_err(|e| ViewError::TemplateError(describe(&e)))?;
        filters::register(&mut tera);
        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, ViewError> {
        self.tera
            .render(template, context)
            .map_err(|e| ViewError::TemplateError(format!("Failed to render '{}': {}", template, describe(&e))))
    }
}

/// Flatten a Tera error and its causes into one line
fn describe(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

fn embedded_templates() -> Result<Vec<(String, String)>> {
    let mut templates = Vec::new();
    for name in EmbeddedTemplates::iter() {
        let file = EmbeddedTemplates::get(&name)
            .with_context(|| format!("Embedded template vanished: {}", name))?;
        let content = String::from_utf8(file.data.into_owned())
            .map_err(|_| ViewError::TemplateError(format!("{} is not valid UTF-8", name)))?;
        templates.push((name.into_owned(), content));
    }
    Ok(templates)
}

fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<()> {
    for entry in fs::read_dir(current_path)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ViewError::TemplateError("Failed to get relative path".to_string()))?;
            // Forward slashes so names match on every platform
            let name = relative_path.to_string_lossy().replace('\\', "/");
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {:?}", path))?;
            templates.push((name, content));
        }
    }
    Ok(())
}
