//! Shell-like path expansion for configured media and state paths.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the home directory. Other paths are returned
/// unchanged; blank input yields an empty path.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Like [`expand`], then resolves a relative result against `base_dir`.
///
/// Used for media paths written relative to the config file.
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: &Path) -> PathBuf {
    let expanded = expand(path);

    if expanded.as_os_str().is_empty() || expanded.is_absolute() {
        return expanded;
    }

    base_dir.join(expanded)
}

/// Renders `path` relative to `root` when it lies inside it.
#[must_use]
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_blank() {
        assert_eq!(expand(""), PathBuf::new());
        assert_eq!(expand("   "), PathBuf::new());
    }

    #[test]
    fn test_expand_keeps_absolute_and_relative() {
        assert_eq!(expand("/srv/walls"), PathBuf::from("/srv/walls"));
        assert_eq!(expand("walls/summer"), PathBuf::from("walls/summer"));
    }

    #[test]
    fn test_expand_tilde() {
        let result = expand("~/Pictures/Wallpapers");
        assert!(!result.to_string_lossy().starts_with('~'));
        assert!(result.to_string_lossy().ends_with("Pictures/Wallpapers"));
    }

    #[test]
    fn test_expand_trims_whitespace() {
        assert_eq!(expand("  /srv/walls  "), PathBuf::from("/srv/walls"));
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let base = Path::new("/home/me/.config/backdrop");
        assert_eq!(
            expand_and_resolve("walls", base),
            PathBuf::from("/home/me/.config/backdrop/walls")
        );
        assert_eq!(expand_and_resolve("/srv/walls", base), PathBuf::from("/srv/walls"));
        assert_eq!(expand_and_resolve("", base), PathBuf::new());
    }

    #[test]
    fn test_resolve_tilde_ignores_base() {
        let resolved = expand_and_resolve("~/walls", Path::new("/etc"));
        assert!(!resolved.starts_with("/etc"));
    }

    #[test]
    fn test_display_relative() {
        let root = Path::new("/srv/walls");
        assert_eq!(display_relative(Path::new("/srv/walls/a/b.jpg"), root), "a/b.jpg");
        assert_eq!(display_relative(Path::new("/tmp/c.jpg"), root), "/tmp/c.jpg");
    }
}
