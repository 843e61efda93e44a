use std::path::{Path, PathBuf};

/// Handle to an isolated, ephemeral keyring directory.
///
/// The directory itself is owned by the session workspace; a `Keyring`
/// only names it so engines know where to import and look up keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyring {
    home: PathBuf,
}

impl Keyring {
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}
