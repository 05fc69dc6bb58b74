//! Standard directories and path helpers.

use std::path::{Component, Path, PathBuf};

/// Get the snaptrail configuration directory.
///
/// - `$XDG_CONFIG_HOME/snaptrail` if set
/// - `~/.config/snaptrail` otherwise
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("snaptrail"))
}

/// Get the snaptrail data directory.
///
/// - `$XDG_DATA_HOME/snaptrail` if set
/// - `~/.local/share/snaptrail` otherwise
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("snaptrail"))
}

/// Default location of the snapshot history store.
pub fn history_dir() -> Option<PathBuf> {
    data_dir().map(|p| p.join("history"))
}

/// Get the snaptrail logs directory.
pub fn logs_dir() -> Option<PathBuf> {
    data_dir().map(|p| p.join("logs"))
}

/// Normalize a path by removing `.` and `..` components.
///
/// Unlike `canonicalize`, this doesn't require the path to exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            _ => result.push(component),
        }
    }

    result
}

/// Final path component as a string, or the whole input when there is none.
pub fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Logical identifier for a source path: normalized, `/`-separated.
pub fn source_key(path: &Path) -> String {
    normalize(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
        .replace("//", "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_are_namespaced() {
        if let Some(dir) = config_dir() {
            assert!(dir.ends_with("snaptrail"));
        }
        if let Some(dir) = history_dir() {
            assert!(dir.ends_with("snaptrail/history"));
        }
    }

    #[test]
    fn test_normalize() {
        let path = Path::new("/home/user/./project/../project/src");
        assert_eq!(normalize(path), PathBuf::from("/home/user/project/src"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("src/app/main.py"), "main.py");
        assert_eq!(file_name("main.py"), "main.py");
        assert_eq!(file_name(".."), "..");
    }

    #[test]
    fn test_source_key() {
        assert_eq!(source_key(Path::new("./src/../lib/a.py")), "lib/a.py");
        assert_eq!(source_key(Path::new("/abs/b.py")), "/abs/b.py");
    }
}
