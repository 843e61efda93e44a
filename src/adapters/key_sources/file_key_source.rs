use std::path::{Path, PathBuf};

use crate::core::traits::key_source::KeySource;

/// Public key stored in a file, armored or binary.
///
/// The identity is the path as given, so `keys/a.asc` and `./keys/a.asc`
/// are cached separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKeySource {
    path: PathBuf,
    id: String,
}

impl FileKeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path.display().to_string();
        Self { path, id }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeySource for FileKeySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_key(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}
