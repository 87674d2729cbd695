pub mod check;
pub mod play;
pub mod show;

use std::fs::File;
use std::path::Path;

use palaver_core::Template;

/// Load a template document from disk.
fn load_template(path: &Path) -> Result<Template, String> {
    let file = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    Template::from_reader(file).map_err(|e| e.to_string())
}
