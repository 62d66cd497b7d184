//! Path helpers shared by the loader, normalizer and walker.
//!
//! Declared references stay lexical: nothing here touches the filesystem.
//! Canonical (symlink-resolved) paths only appear in the walker.

use std::path::{Component, Path, PathBuf};

/// Resolve `path` against an optional root. Absolute paths pass through.
pub fn resolve_path(root: Option<&Path>, path: &Path) -> PathBuf {
    match root {
        Some(root) if !path.is_absolute() => root.join(path),
        _ => path.to_path_buf(),
    }
}

/// True for `./x`, `../x`, `.` and `..`.
pub fn is_relative_reference(reference: &str) -> bool {
    reference == "."
        || reference == ".."
        || reference.starts_with("./")
        || reference.starts_with("../")
}

/// Join `reference` onto `base` and fold `.`/`..` segments.
///
/// Absolute references ignore `base`. Leading `..` segments that cannot be
/// folded are kept.
pub fn join_lexical(base: &str, reference: &str) -> String {
    let reference_path = Path::new(reference);
    if reference_path.is_absolute() {
        return normalize_lexical(reference_path);
    }
    normalize_lexical(&Path::new(base).join(reference_path))
}

pub fn normalize_lexical(path: &Path) -> String {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return ".".to_string();
    }
    parts
        .iter()
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

/// Directory of `source_path`, expressed relative to `root` when it lies
/// under it.
pub fn source_dir(source_path: &str, root: Option<&Path>) -> String {
    let parent = Path::new(source_path).parent().unwrap_or(Path::new(""));
    let relative = match root {
        Some(root) => parent.strip_prefix(root).unwrap_or(parent),
        None => parent,
    };
    relative.to_string_lossy().into_owned()
}

/// Join a lookup candidate onto the program path unless it is absolute.
pub fn join_candidate(program_path: &str, candidate: &str) -> String {
    let candidate_path = Path::new(candidate);
    if candidate_path.is_absolute() {
        return candidate.to_string();
    }
    Path::new(program_path)
        .join(candidate_path)
        .to_string_lossy()
        .into_owned()
}
