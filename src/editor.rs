use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Resolve the description of a new issue.
///
/// - `None` opens `$EDITOR` on an empty temporary file
/// - `@path` reads the description from `path`
/// - anything else is used as is
pub fn resolve_description(arg: Option<&str>) -> Result<String> {
  match arg {
    None => edit_text(),
    Some(text) => match text.strip_prefix('@') {
      Some(path) => std::fs::read_to_string(Path::new(path))
        .map_err(|e| eyre!("Failed to read description from {}: {}", path, e)),
      None => Ok(text.to_string()),
    },
  }
}

/// Let the user write text in their editor and return it.
pub fn edit_text() -> Result<String> {
  let editor = editor_command(std::env::var("EDITOR").ok());
  debug!("Editor detected as {}", editor.join(" "));
  edit_with(&editor)
}

fn edit_with(editor: &[String]) -> Result<String> {
  let (program, args) = editor
    .split_first()
    .ok_or_else(|| eyre!("No editor configured"))?;

  let file = tempfile::Builder::new()
    .suffix(".tmp")
    .tempfile()
    .map_err(|e| eyre!("Failed to create temporary file: {}", e))?;

  // Spawn editor (blocking)
  let status = Command::new(program)
    .args(args)
    .arg(file.path())
    .status()
    .map_err(|e| eyre!("Failed to spawn editor {}: {}", program, e))?;

  if !status.success() {
    return Err(eyre!("Editor exited with non-zero status: {:?}", status.code()));
  }

  std::fs::read_to_string(file.path())
    .map_err(|e| eyre!("Failed to read edited text from {}: {}", file.path().display(), e))
}

/// Editor command line from `$EDITOR`, defaulting to vim.
///
/// vim gets `backupcopy=yes` so it writes into the temporary file in place
/// instead of replacing it.
fn editor_command(editor_var: Option<String>) -> Vec<String> {
  let mut command: Vec<String> = editor_var
    .as_deref()
    .unwrap_or("vim")
    .split_whitespace()
    .map(String::from)
    .collect();

  if command.is_empty() {
    command.push("vim".to_string());
  }
  if command == ["vim"] {
    command.push("+set backupcopy=yes".to_string());
  }

  command
}
