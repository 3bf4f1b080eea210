use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting state files.
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

/// Read a file, treating "not found" as `None`. Any other failure is surfaced.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load a YAML document, falling back to `T::default()` when the file is absent.
/// A present but malformed file is an error.
pub fn load_yaml_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match read_optional(path)? {
        Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(T::default()),
        Some(bytes) => Ok(serde_yaml::from_slice(&bytes)?),
        None => Ok(T::default()),
    }
}

/// Serialize `value` as YAML and atomically replace `path`.
pub fn save_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_yaml::to_string(value)?;
    atomic_write(path, data.as_bytes())
}

/// Recursively collect regular files under `dir`, sorted. Hidden directories
/// and common build output directories are skipped. A missing `dir` yields
/// an empty list.
pub fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if !dir.is_dir() {
        return Ok(out);
    }
    walk_into(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if name.starts_with('.') || matches!(name.as_ref(), "node_modules" | "target") {
                continue;
            }
            walk_into(&entry.path(), out)?;
        } else if file_type.is_file() {
            out.push(entry.path());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/test.yaml");
        atomic_write(&path, b"data").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "data");
    }

    #[test]
    fn read_optional_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_optional(&dir.path().join("nope")).unwrap().is_none());
    }

    #[test]
    fn load_yaml_missing_and_empty_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.yaml");
        let m: BTreeMap<String, u32> = load_yaml_or_default(&path).unwrap();
        assert!(m.is_empty());
        std::fs::write(&path, "\n").unwrap();
        let m: BTreeMap<String, u32> = load_yaml_or_default(&path).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn load_yaml_corrupt_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.yaml");
        std::fs::write(&path, "a: [unclosed").unwrap();
        assert!(load_yaml_or_default::<BTreeMap<String, u32>>(&path).is_err());
    }

    #[test]
    fn walk_files_skips_hidden_and_sorts() {
        let dir = TempDir::new().unwrap();
        atomic_write(&dir.path().join("b.txt"), b"").unwrap();
        atomic_write(&dir.path().join("sub/a.txt"), b"").unwrap();
        atomic_write(&dir.path().join(".git/config"), b"").unwrap();
        let files = walk_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b.txt"), dir.path().join("sub/a.txt")]
        );
    }
}
