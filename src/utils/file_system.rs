use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn ensure_dir_exists(path: &Path) -> Result<(), String> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
        log::info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Removes `path` recursively. Returns `Ok(false)` if there was nothing to remove.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool, String> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path).map_err(|e| format!("Failed to remove directory {:?}: {}", path, e))?;
    log::info!("Removed directory: {:?}", path);
    Ok(true)
}

/// Lists the regular files directly inside `dir`, sorted by file name.
///
/// Unreadable or missing directories yield an empty list.
pub fn files_in_dir(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("Skipping unreadable entry in {:?}: {}", dir, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

pub fn to_forward_slashes(text: &str) -> String {
    text.replace('\\', "/")
}

/// Renders `path` relative to `base` with forward slashes and a leading `./`.
///
/// Falls back to the full path if `path` does not live under `base`.
pub fn relative_display(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => format!("./{}", to_forward_slashes(&rel.to_string_lossy())),
        Err(_) => to_forward_slashes(&path.to_string_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_files_in_dir_is_flat_and_sorted() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("b.c")).unwrap();
        File::create(dir.path().join("a.c")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        File::create(dir.path().join("nested").join("c.c")).unwrap();

        let names: Vec<String> = files_in_dir(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.c", "b.c"]);
    }

    #[test]
    fn test_files_in_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(files_in_dir(&dir.path().join("does-not-exist")).is_empty());
    }

    #[test]
    fn test_ensure_and_remove_dir() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("build").join("Debug");
        ensure_dir_exists(&target).unwrap();
        ensure_dir_exists(&target).unwrap();
        assert!(target.is_dir());

        assert_eq!(remove_dir_if_exists(&target), Ok(true));
        assert_eq!(remove_dir_if_exists(&target), Ok(false));
    }

    #[test]
    fn test_relative_display() {
        let base = Path::new("/work/project");
        assert_eq!(relative_display(Path::new("/work/project/build/Debug"), base), "./build/Debug");
        assert_eq!(relative_display(base, base), ".");
        assert_eq!(relative_display(Path::new("/elsewhere/x"), base), "/elsewhere/x");
    }
}
