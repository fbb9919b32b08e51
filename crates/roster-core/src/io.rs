use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Readers never observe a half-written manifest.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Serialize `value` as YAML and write it atomically.
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_yaml::to_string(value)?;
    atomic_write(path, data.as_bytes())
}

/// Read and deserialize a YAML file. Returns `Ok(None)` when the file is absent.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    Ok(Some(serde_yaml::from_str(&data)?))
}

/// Names of the immediate subdirectories of `dir`, sorted. Missing `dir` yields
/// an empty list.
pub fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Load every `<dir>/<name>/manifest.yaml` below `dir`, skipping directories
/// without a manifest.
pub fn load_manifests<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for name in subdirectories(dir)? {
        let manifest: PathBuf = dir.join(&name).join(crate::paths::MANIFEST_FILE);
        if let Some(item) = read_yaml(&manifest)? {
            out.push(item);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_yaml_creates_manifest_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".roster/skills/teaching/manifest.yaml");
        write_yaml(&path, &vec!["teaching"]).unwrap();
        let back: Option<Vec<String>> = read_yaml(&path).unwrap();
        assert_eq!(back, Some(vec!["teaching".to_string()]));
    }

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        atomic_write(&path, b"version: 1").unwrap();
        atomic_write(&path, b"version: 2").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 2");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn read_yaml_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let value: Option<Vec<String>> = read_yaml(&dir.path().join("nope.yaml")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn read_yaml_reports_malformed_manifests() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.yaml");
        std::fs::write(&path, "name: [unclosed").unwrap();
        let err = read_yaml::<Vec<String>>(&path).unwrap_err();
        assert!(matches!(err, crate::RosterError::Yaml(_)));
    }

    #[test]
    fn load_manifests_skips_empty_dirs() {
        let dir = TempDir::new().unwrap();
        write_yaml(&dir.path().join("b/manifest.yaml"), &vec!["two"]).unwrap();
        write_yaml(&dir.path().join("a/manifest.yaml"), &vec!["one"]).unwrap();
        std::fs::create_dir_all(dir.path().join("c")).unwrap();

        let loaded: Vec<Vec<String>> = load_manifests(dir.path()).unwrap();
        assert_eq!(loaded, vec![vec!["one".to_string()], vec!["two".to_string()]]);
    }
}
