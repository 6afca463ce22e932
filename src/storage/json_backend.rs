use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::errors::LedgerResult;
use crate::storage::{invalid_key, KeyValueStore};

const ENTRY_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed store keeping one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: PathBuf) -> LedgerResult<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn entry_path(&self, key: &str) -> LedgerResult<PathBuf> {
        let name = canonical_key(key).ok_or_else(|| invalid_key(key))?;
        Ok(self.root.join(format!("{}.{}", name, ENTRY_EXTENSION)))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let path = self.entry_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        let path = self.entry_path(key)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Keeps ASCII letters, digits, `-` and `_`; anything else becomes `_`.
fn canonical_key(key: &str) -> Option<String> {
    let sanitized: String = key
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &[u8]) -> LedgerResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LedgerError;
    use tempfile::tempdir;

    #[test]
    fn absent_entries_read_as_none() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("data")).expect("create storage");
        assert!(storage.get("transactions").unwrap().is_none());
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn set_writes_through_temp_file() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf()).expect("create storage");
        storage.set("appTheme", b"true").expect("write entry");

        let path = storage.entry_path("appTheme").unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("appTheme.json"));
        assert_eq!(fs::read(&path).unwrap(), b"true");
        assert!(!tmp_path(&path).exists(), "temp file should be renamed away");
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf()).expect("create storage");
        let path = storage.entry_path("../secrets").unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(matches!(
            storage.set("..", b"x"),
            Err(LedgerError::Persistence(_))
        ));
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf()).expect("create storage");
        storage.set("transactions", b"[]").unwrap();

        // A directory squatting on the temp path makes File::create fail.
        let path = storage.entry_path("transactions").unwrap();
        fs::create_dir_all(tmp_path(&path)).unwrap();

        assert!(storage.set("transactions", b"[1]").is_err());
        assert_eq!(storage.get("transactions").unwrap().as_deref(), Some(&b"[]"[..]));
    }
}
