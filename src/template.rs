//! Rendering of command output through user-supplied Jinja2 templates.

use color_eyre::{eyre::eyre, Result};
use minijinja::{path_loader, AutoEscape, Environment};
use serde::Serialize;
use std::path::Path;

/// Default template, relative to the working directory
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/default.md.j2";

/// Renders data using a Jinja2 template file.
///
/// Other templates in the same directory can be included or extended.
pub struct TemplateRenderer {
  env: Environment<'static>,
  template_name: String,
}

impl TemplateRenderer {
  pub fn new(template_path: &Path) -> Result<Self> {
    if !template_path.is_file() {
      return Err(eyre!("Template file not found: {}", template_path.display()));
    }

    let template_name = template_path
      .file_name()
      .and_then(|n| n.to_str())
      .ok_or_else(|| eyre!("Invalid template file name: {}", template_path.display()))?
      .to_string();
    let dir = template_path
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .unwrap_or_else(|| Path::new("."))
      .to_path_buf();

    let mut env = Environment::new();
    env.set_loader(path_loader(dir));
    env.set_auto_escape_callback(auto_escape_for);

    Ok(Self { env, template_name })
  }

  pub fn render<S: Serialize>(&self, data: S) -> Result<String> {
    let template = self
      .env
      .get_template(&self.template_name)
      .map_err(|e| eyre!("Error loading template {}: {}", self.template_name, e))?;

    template
      .render(data)
      .map_err(|e| eyre!("Error rendering template {}: {}", self.template_name, e))
  }
}

/// HTML escaping for `.html`, `.xml` and `.md` templates
fn auto_escape_for(name: &str) -> AutoEscape {
  match Path::new(name).extension().and_then(|e| e.to_str()) {
    Some("html" | "xml" | "md") => AutoEscape::Html,
    _ => AutoEscape::None,
  }
}
