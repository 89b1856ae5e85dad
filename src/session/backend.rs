//! Storage backends for the persisted session.
//!
//! The file backend writes a uniquely named sibling temp file and renames it
//! over the target, so readers see either the old contents or the new ones,
//! even when several processes save at once.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tempfile::NamedTempFile;

/// Raw storage for one serialized session.
pub trait SessionBackend: Send + Sync {
    /// Return the stored contents, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than "not found".
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the stored contents in one step.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&self, contents: &str) -> io::Result<()>;

    /// Remove the stored contents. Succeeds if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than "not found".
    fn remove(&self) -> io::Result<()>;
}

/// Session persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/carbook/session.json`, falling back to the home dir
    /// and then the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("carbook").join("session.json")
        } else if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".carbook").join("session.json")
        } else {
            PathBuf::from(".carbook").join("session.json")
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionBackend for FileBackend {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        // Each write gets its own temp file; it is deleted on drop if any
        // step before the rename fails.
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(contents.as_bytes())?;
        temp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))?;
        }

        temp.persist(&self.path).map_err(|error| error.error)?;
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        }
    }
}

/// Process-local backend. Clones share the same slot, which lets tests
/// reopen a store over the same "disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    /// Backend pre-seeded with raw contents.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Raw stored contents.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionBackend for MemoryBackend {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_owned());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
