use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::errors::{ExportError, Result};
use crate::core::models::export_receipt::ExportReceipt;
use crate::core::models::session_state::SessionState;
use crate::core::services::delivery::{self, ProgressFn};
use crate::core::services::encryption_engine::EncryptionEngine;
use crate::core::services::key_cache::KeyCache;
use crate::core::services::key_importer::KeyImporter;
use crate::core::services::recipient_resolver::RecipientResolver;
use crate::core::services::workspace::Workspace;
use crate::core::traits::key_source::KeySource;
use crate::core::traits::openpgp_engine::OpenPgpEngine;

/// What a session needs besides its destination and engine.
#[derive(Clone, Default)]
pub struct SessionOptions {
    /// Public keys to import into the session keyring.
    pub key_sources: Vec<Arc<dyn KeySource>>,
    /// Encrypt to these instead of every imported key, when non-empty.
    pub recipients: Option<Vec<String>>,
    /// Parent directory for the ephemeral workspace.
    pub temp_dir: Option<PathBuf>,
    /// Key cache to read through; `None` uses `KeyCache::shared()`.
    pub cache: Option<Arc<KeyCache>>,
}

/// A writable sink whose contents reach `destination` only as ciphertext.
///
/// Plaintext written to the session lands in a private workspace. `finish`
/// imports the keys, resolves recipients, encrypts, and copies the
/// ciphertext to the destination. `abort`, `finish` and `Drop` all end
/// with the workspace deleted; nothing reaches the destination unless
/// `finish` succeeds.
pub struct ExportSession<W: Write, E: OpenPgpEngine> {
    destination: W,
    engine: E,
    cache: Arc<KeyCache>,
    options: SessionOptions,
    progress: Option<ProgressFn>,
    workspace: Workspace,
    plaintext: Option<BufWriter<File>>,
    plaintext_bytes: u64,
    state: SessionState,
}

impl<W: Write, E: OpenPgpEngine> ExportSession<W, E> {
    /// Create the workspace and open the plaintext sink.
    pub fn open(destination: W, engine: E, options: SessionOptions) -> Result<Self> {
        let workspace = Workspace::create(options.temp_dir.as_deref())?;
        let plaintext = BufWriter::new(workspace.create_plaintext()?);
        tracing::info!(path = %workspace.plaintext_path().display(), "writing data to temporary file");

        Ok(Self {
            destination,
            engine,
            cache: options.cache.clone().unwrap_or_else(KeyCache::shared),
            options,
            progress: None,
            workspace,
            plaintext: Some(plaintext),
            plaintext_bytes: 0,
            state: SessionState::Created,
        })
    }

    /// Open a session, hand it to `fill`, then finish it, or abort it if
    /// `fill` fails.
    pub fn scoped<F>(destination: W, engine: E, options: SessionOptions, fill: F) -> Result<ExportReceipt>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut session = Self::open(destination, engine, options)?;
        match fill(&mut session) {
            Ok(()) => session.finish(),
            Err(e) => {
                session.abort();
                Err(e)
            }
        }
    }

    /// Report cumulative delivered ciphertext bytes to `progress`.
    pub fn with_progress(mut self, progress: impl FnMut(u64) + Send + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Root of this session's private workspace.
    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    /// Encrypt what was written and deliver it. The workspace is deleted
    /// whatever the outcome.
    pub fn finish(mut self) -> Result<ExportReceipt> {
        let outcome = self.seal_and_deliver();
        match &outcome {
            Ok(receipt) => {
                self.transition(SessionState::Delivered);
                tracing::info!(
                    bytes = receipt.ciphertext_bytes,
                    sha256 = %receipt.ciphertext_sha256,
                    "encrypted export delivered"
                );
            }
            Err(e) => {
                self.transition(SessionState::Failed);
                tracing::error!(error = %e, "encrypted export failed");
            }
        }
        self.cleanup();
        outcome
    }

    /// Discard everything written so far without encrypting.
    pub fn abort(mut self) {
        self.transition(SessionState::Aborted);
        self.cleanup();
    }

    fn seal_and_deliver(&mut self) -> Result<ExportReceipt> {
        if let Some(mut plaintext) = self.plaintext.take() {
            plaintext.flush()?;
            let file = plaintext.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }

        self.transition(SessionState::KeyringReady);
        let keyring = self.workspace.keyring();
        let imported_keys = KeyImporter::new(&self.engine, &self.cache)
            .import_all(keyring, &self.options.key_sources)?;

        self.transition(SessionState::Encrypting);
        let keyring = self.workspace.keyring();
        let recipients = RecipientResolver::new(&self.engine)
            .resolve(keyring, self.options.recipients.as_deref())?;
        if recipients.is_empty() {
            return Err(ExportError::NoRecipients);
        }
        EncryptionEngine::new(&self.engine).encrypt(
            keyring,
            self.workspace.plaintext_path(),
            self.workspace.ciphertext_path(),
            &recipients,
        )?;

        let ciphertext = BufReader::new(File::open(self.workspace.ciphertext_path())?);
        let delivery = delivery::copy_with_progress(
            ciphertext,
            &mut self.destination,
            self.progress.as_mut(),
        )?;

        Ok(ExportReceipt {
            plaintext_bytes: self.plaintext_bytes,
            ciphertext_bytes: delivery.bytes,
            ciphertext_sha256: delivery.sha256,
            recipients,
            imported_keys,
        })
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "export session transition");
        self.state = next;
    }

    fn cleanup(&mut self) {
        // Close the plaintext handle before deleting the file under it.
        self.plaintext = None;
        self.workspace.teardown(&self.engine);
    }
}

impl<W: Write, E: OpenPgpEngine> Write for ExportSession<W, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let sink = self
            .plaintext
            .as_mut()
            .ok_or_else(|| io::Error::other("export session no longer accepts data"))?;
        let n = sink.write(buf)?;
        self.plaintext_bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.plaintext.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write, E: OpenPgpEngine> Drop for ExportSession<W, E> {
    fn drop(&mut self) {
        if self.workspace.is_torn_down() {
            return;
        }
        if !self.state.is_terminal() {
            tracing::warn!(state = %self.state, "export session dropped before finishing, discarding data");
            self.transition(SessionState::Aborted);
        }
        self.cleanup();
    }
}
