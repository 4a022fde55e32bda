use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// A single named slot holding the serialized history log
///
/// Reads and writes are whole-value; there is no incremental format.
pub trait Storage: Send + Sync {
    /// Name of the slot, used in diagnostics
    fn key(&self) -> &str;

    /// Current contents, or `None` if nothing was ever written
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the contents wholesale
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// Storage backed by one JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    key: String,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key = path.display().to_string();

        Self { path, key }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for FileStorage {
    fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // Rename over the old file so a crash mid-write never leaves half a log
        let staging = self.staging_path();
        std::fs::write(&staging, contents)?;
        std::fs::rename(&staging, &self.path)
    }
}

/// Process-local storage; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with raw contents
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Storage for MemoryStorage {
    fn key(&self) -> &str {
        "memory"
    }

    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_owned());
        Ok(())
    }
}
