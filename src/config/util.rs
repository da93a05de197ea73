//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/public/blog/  ← start
/// /home/user/site/amp-purge.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Expand `~` and resolve `path` against `root`.
pub fn resolve_from_root(path: &Path, root: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    };
    if expanded.is_relative() {
        root.join(expanded)
    } else {
        expanded
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("public/blog");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("amp-purge.toml"), "").unwrap();

        let found = find_config_file(Path::new("amp-purge.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("amp-purge.toml"));
    }

    #[test]
    fn test_find_config_missing() {
        let dir = tempfile::tempdir().unwrap();
        let name = Path::new("amp-purge-missing-8c1f.toml");
        assert_eq!(find_config_file(name, dir.path()), None);
    }

    #[test]
    fn test_find_config_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        assert_eq!(find_config_file(&path, Path::new("/")), None);

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }

    #[test]
    fn test_resolve_from_root() {
        let root = Path::new("/srv/site");
        assert_eq!(
            resolve_from_root(Path::new("public"), root),
            PathBuf::from("/srv/site/public")
        );
        assert_eq!(
            resolve_from_root(Path::new("/var/www"), root),
            PathBuf::from("/var/www")
        );
    }
}
