//! Lexical path helpers.
//!
//! Module paths are joined and normalized without touching the filesystem,
//! so `./a/../b.json` resolves the same way whether or not `a` exists.

use std::path::{Component, Path, PathBuf};

/// Removes `.` components and folds `..` into the preceding component.
///
/// A `..` that would climb above the root is dropped; one at the start of a
/// relative path is kept.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use optlayer_core::path::normalize;
///
/// assert_eq!(normalize(Path::new("/a/./b/../c.json")), PathBuf::from("/a/c.json"));
/// assert_eq!(normalize(Path::new("../x/./y")), PathBuf::from("../x/y"));
/// ```
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Joins `relative` onto `base` and normalizes the result.
///
/// An empty `relative` yields `base` itself.
pub fn join(base: &Path, relative: &str) -> PathBuf {
    if relative.is_empty() {
        return normalize(base);
    }
    normalize(&base.join(relative))
}

/// Directory containing `path`, or `path` itself when it has no parent.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}

/// Renders `path` relative to `cwd` when it lies below it.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use optlayer_core::path::display_relative;
///
/// assert_eq!(display_relative(Path::new("/w/conf/a.json"), Path::new("/w")), "conf/a.json");
/// assert_eq!(display_relative(Path::new("/other/a.json"), Path::new("/w")), "/other/a.json");
/// ```
pub fn display_relative(path: &Path, cwd: &Path) -> String {
    let path = normalize(path);
    let cwd = normalize(cwd);
    match path.strip_prefix(&cwd) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
