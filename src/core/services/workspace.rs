use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::errors::Result;
use crate::core::models::keyring::Keyring;
use crate::core::traits::openpgp_engine::OpenPgpEngine;

const KEYRING_DIR: &str = "keyring";
const PLAINTEXT_FILE: &str = "payload";
const CIPHERTEXT_FILE: &str = "payload.gpg";

/// Private scratch directory for one export session.
///
/// Layout:
/// ```text
/// encryptXXXXXX/
///   keyring/        engine home, mode 0700
///   payload         plaintext written by the caller
///   payload.gpg     ciphertext produced by the engine
/// ```
///
/// `teardown` removes all of it exactly once; dropping an untorn
/// workspace removes the directory without releasing the engine.
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    keyring: Keyring,
    plaintext: PathBuf,
    ciphertext: PathBuf,
}

impl Workspace {
    /// Create a workspace under `parent`, or the system temp dir.
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("encrypt");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };

        let root = dir.path().to_path_buf();
        let keyring_home = root.join(KEYRING_DIR);
        create_private_dir(&keyring_home)?;

        Ok(Self {
            dir: Some(dir),
            keyring: Keyring::at(keyring_home),
            plaintext: root.join(PLAINTEXT_FILE),
            ciphertext: root.join(CIPHERTEXT_FILE),
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    pub fn plaintext_path(&self) -> &Path {
        &self.plaintext
    }

    pub fn ciphertext_path(&self) -> &Path {
        &self.ciphertext
    }

    /// Create the plaintext file. Fails if it already exists.
    pub fn create_plaintext(&self) -> Result<File> {
        Ok(File::options()
            .write(true)
            .create_new(true)
            .open(&self.plaintext)?)
    }

    pub fn is_torn_down(&self) -> bool {
        self.dir.is_none()
    }

    /// Release the engine and delete every artifact. Best-effort: failures
    /// are logged and never returned. Calling it again is a no-op.
    pub fn teardown<E: OpenPgpEngine + ?Sized>(&mut self, engine: &E) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        if let Err(e) = engine.release(&self.keyring) {
            tracing::warn!(error = %e, "failed to release keyring");
        }
        for artifact in [&self.plaintext, &self.ciphertext] {
            match std::fs::remove_file(artifact) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %artifact.display(), error = %e, "failed to delete temporary file")
                }
            }
        }
        if let Err(e) = dir.close() {
            tracing::warn!(path = %self.root.display(), error = %e, "failed to delete workspace");
        }
    }
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new().mode(0o700).create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir(path)
}
