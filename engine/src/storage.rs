use std::{
    cell::RefCell,
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use tempfile::NamedTempFile;

use crate::errors::StorageError;

/// Durable key/value blobs. Every write replaces the whole value.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

/// One file per key inside a directory. Writes go to a temp file in the same
/// directory first and are renamed over the target, so a reader never sees a
/// partially written blob.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let to_write_error = |source: io::Error| StorageError::Write {
            key: key.to_string(),
            source,
        };

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(to_write_error)?;
        temp.write_all(data).map_err(to_write_error)?;
        temp.as_file().sync_all().map_err(to_write_error)?;
        temp.persist(self.path_for(key))
            .map_err(|err| to_write_error(err.error))?;

        Ok(())
    }
}

/// In-process storage. Clones share the same map, which lets tests inspect
/// what the pipeline persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, data: impl Into<Vec<u8>>) {
        self.blobs.borrow_mut().insert(key.to_string(), data.into());
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.insert(key, data);
        Ok(())
    }
}
