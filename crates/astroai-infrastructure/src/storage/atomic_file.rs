//! Atomic, locked file documents.
//!
//! Writes go to a temp file in the same directory, are fsynced and then
//! renamed over the target. Read-modify-write cycles hold an exclusive
//! `fs2` lock on a sidecar `.lock` file.

use astroai_core::error::{AstroError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// On-disk encoding of an [`AtomicFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn decode<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        Ok(match self {
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        })
    }

    fn encode<T: Serialize>(&self, data: &T) -> Result<String> {
        Ok(match self {
            FileFormat::Toml => toml::to_string_pretty(data)?,
            FileFormat::Json => serde_json::to_string_pretty(data)?,
        })
    }
}

/// A single serde document stored in one file.
#[derive(Debug, Clone)]
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            _phantom: PhantomData,
        }
    }

    pub fn toml(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Toml)
    }

    pub fn json(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. A missing or blank file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        self.format.decode(&content).map(Some)
    }

    /// Replaces the document.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let encoded = self.format.encode(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(encoded.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Locked read-modify-write. Starts from `default_value` when the file
    /// is missing and returns the document as written.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<T>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data)?;
        self.save(&data)?;

        Ok(data)
    }

    /// Removes the file. Missing files are fine.
    pub fn remove(&self) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| AstroError::io(format!("{} has no parent directory", self.path.display())))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| AstroError::io(format!("{} has no file name", self.path.display())))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock on `<path>.lock`, released on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AstroError::storage(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        label: String,
        count: u32,
    }

    fn counter() -> Counter {
        Counter {
            label: "visits".to_string(),
            count: 0,
        }
    }

    #[test]
    fn test_toml_and_json_documents() {
        let temp_dir = TempDir::new().unwrap();
        for file in [
            AtomicFile::<Counter>::toml(temp_dir.path().join("counter.toml")),
            AtomicFile::<Counter>::json(temp_dir.path().join("counter.json")),
        ] {
            assert!(file.load().unwrap().is_none());
            file.save(&counter()).unwrap();
            assert_eq!(file.load().unwrap(), Some(counter()));
        }
    }

    #[test]
    fn test_update_accumulates_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("counter.json");
        let file = AtomicFile::<Counter>::json(path.clone());

        let written = file
            .update(counter(), |c| {
                c.count += 10;
                Ok(())
            })
            .unwrap();
        assert_eq!(written.count, 10);

        file.update(counter(), |c| {
            c.count += 5;
            Ok(())
        })
        .unwrap();
        assert_eq!(file.load().unwrap().unwrap().count, 15);

        assert!(!path.with_file_name(".counter.json.tmp").exists());
        assert!(!path.with_extension("lock").exists());
    }

    #[test]
    fn test_failed_update_keeps_previous_document() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Counter>::json(temp_dir.path().join("counter.json"));
        file.save(&counter()).unwrap();

        let result = file.update(counter(), |c| {
            c.count = 99;
            Err(AstroError::internal("abort"))
        });
        assert!(result.is_err());
        assert_eq!(file.load().unwrap().unwrap().count, 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Counter>::json(temp_dir.path().join("counter.json"));
        file.save(&counter()).unwrap();
        file.remove().unwrap();
        file.remove().unwrap();
        assert!(file.load().unwrap().is_none());
    }
}
