//! Glob expansion for the command-line file patterns.

use globset::GlobBuilder;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::PatternError;

const WILDCARDS: &[char] = &['*', '?', '[', '{'];

/// Expand a shell-style glob into the files it matches, sorted by name.
///
/// Wildcards never cross a path separator, so `photos/*.jpg` only looks
/// directly inside `photos`. A pattern with no wildcards yields itself when
/// the path exists. Matching nothing is not an error.
///
/// # Example
///
/// ```rust,no_run
/// use labelbatch::discovery::expand;
///
/// for path in expand("photos/*.jpg").unwrap() {
///     println!("{}", path.display());
/// }
/// ```
pub fn expand(pattern: &str) -> Result<Vec<PathBuf>, PatternError> {
    // Candidates come from the walker in normalized form, so the matcher must
    // be too: "dir//*.png" and "dir/./*.png" both become "dir/*.png".
    let normalized: PathBuf = Path::new(pattern).components().collect();
    let matcher = GlobBuilder::new(&normalized.to_string_lossy())
        .literal_separator(true)
        .build()
        .map_err(|e| PatternError {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })?
        .compile_matcher();

    if !has_wildcard(pattern) {
        let path = PathBuf::from(pattern);
        return Ok(if path.exists() { vec![path] } else { Vec::new() });
    }

    let (base, depth) = split_base(&normalized);
    let walk_root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.clone()
    };

    let mut matches = Vec::new();
    for entry in WalkDir::new(&walk_root)
        .follow_links(true)
        .min_depth(depth)
        .max_depth(depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_dir() {
            continue;
        }
        // Relative patterns are matched without the "./" the walker adds.
        let candidate = if base.as_os_str().is_empty() {
            entry
                .path()
                .strip_prefix(&walk_root)
                .unwrap_or(entry.path())
                .to_path_buf()
        } else {
            entry.path().to_path_buf()
        };
        if matcher.is_match(&candidate) {
            matches.push(candidate);
        }
    }

    log::debug!("{pattern} matched {} file(s)", matches.len());
    Ok(matches)
}

fn has_wildcard(text: &str) -> bool {
    text.contains(WILDCARDS)
}

/// Split a pattern into the literal directory prefix and the number of
/// path components below it that contain the wildcards.
fn split_base(pattern: &Path) -> (PathBuf, usize) {
    let components: Vec<Component> = pattern.components().collect();
    let first_wild = components
        .iter()
        .position(|c| has_wildcard(&c.as_os_str().to_string_lossy()))
        .unwrap_or(components.len());

    let base: PathBuf = components[..first_wild].iter().collect();
    (base, components.len() - first_wild)
}
