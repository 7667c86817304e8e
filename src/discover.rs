//! Module discovery: walk a source tree for `.lean` files and derive
//! module names from their relative paths.

use std::path::Path;

use walkdir::WalkDir;

/// Module names under `root`, sorted, one component per path segment.
///
/// `prefix` filters on the dotted name, e.g. `Mathlib.Order`.
pub fn lean_modules(root: &Path, prefix: Option<&str>) -> Vec<Vec<String>> {
    let mut modules = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("lean") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let mut components: Vec<String> = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if components.is_empty() {
            continue;
        }
        if let Some(prefix) = prefix {
            if !components.join(".").starts_with(prefix) {
                components.clear();
            }
        }
        if !components.is_empty() {
            modules.push(components);
        }
    }
    modules.sort();
    modules
}
