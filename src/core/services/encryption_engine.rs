use std::path::Path;

use crate::core::errors::{ExportError, Result};
use crate::core::models::keyring::Keyring;
use crate::core::models::recipient_set::RecipientSet;
use crate::core::traits::openpgp_engine::OpenPgpEngine;

/// Runs one encrypt call and turns the engine's verdict into a `Result`.
pub struct EncryptionEngine<'a, E: OpenPgpEngine + ?Sized> {
    engine: &'a E,
}

impl<'a, E: OpenPgpEngine + ?Sized> EncryptionEngine<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Encrypt `plaintext` into `ciphertext` for `recipients`.
    ///
    /// An empty recipient set is rejected before the engine is invoked.
    pub fn encrypt(
        &self,
        keyring: &Keyring,
        plaintext: &Path,
        ciphertext: &Path,
        recipients: &RecipientSet,
    ) -> Result<()> {
        if recipients.is_empty() {
            return Err(ExportError::NoRecipients);
        }

        tracing::info!(
            engine = self.engine.name(),
            output = %ciphertext.display(),
            recipients = recipients.len(),
            "generating encrypted file"
        );
        let result = self
            .engine
            .encrypt_file(keyring, plaintext, ciphertext, recipients)?;

        if !result.ok {
            tracing::error!(
                status = result.status_text(),
                stderr = result.stderr_text(),
                "encryption failed"
            );
            return Err(ExportError::EncryptionFailed {
                status: result.status_text().to_string(),
                stderr: result.stderr_text().to_string(),
            });
        }

        tracing::info!("encryption complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::key_material::KeyMaterial;
    use crate::core::testing::{FAKE_HEADER, FakeEngine, fake_key};

    struct Fixture {
        dir: tempfile::TempDir,
        keyring: Keyring,
    }

    fn fixture(engine: &FakeEngine) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let keyring = Keyring::at(dir.path());
        engine
            .import_keys(&keyring, &KeyMaterial::from(fake_key("ABC123", "A", None).as_str()))
            .unwrap();
        std::fs::write(dir.path().join("plain"), b"hello world").unwrap();
        Fixture { dir, keyring }
    }

    #[test]
    fn empty_recipients_never_reach_engine() {
        let engine = FakeEngine::new();
        let fx = fixture(&engine);

        let result = EncryptionEngine::new(&engine).encrypt(
            &fx.keyring,
            &fx.dir.path().join("plain"),
            &fx.dir.path().join("plain.gpg"),
            &RecipientSet::default(),
        );

        assert!(matches!(result, Err(ExportError::NoRecipients)));
        assert_eq!(engine.encrypts(), 0);
    }

    #[test]
    fn success_writes_ciphertext() {
        let engine = FakeEngine::new();
        let fx = fixture(&engine);
        let out = fx.dir.path().join("plain.gpg");

        EncryptionEngine::new(&engine)
            .encrypt(
                &fx.keyring,
                &fx.dir.path().join("plain"),
                &out,
                &RecipientSet::new(vec!["ABC123".into()]),
            )
            .unwrap();

        let written = std::fs::read_to_string(out).unwrap();
        assert!(written.starts_with(FAKE_HEADER));
        assert!(written.ends_with("hello world"));
    }

    #[test]
    fn engine_failure_carries_diagnostics() {
        let engine = FakeEngine::new();
        let fx = fixture(&engine);

        let result = EncryptionEngine::new(&engine).encrypt(
            &fx.keyring,
            &fx.dir.path().join("plain"),
            &fx.dir.path().join("plain.gpg"),
            &RecipientSet::new(vec!["NOBODY".into()]),
        );

        match result {
            Err(ExportError::EncryptionFailed { status, stderr }) => {
                assert!(status.contains("INV_RECP"));
                assert!(stderr.contains("No public key"));
            }
            other => panic!("expected EncryptionFailed, got {other:?}"),
        }
    }

    #[test]
    fn missing_diagnostics_default_to_empty() {
        let engine = FakeEngine::failing();
        let fx = fixture(&engine);

        let result = EncryptionEngine::new(&engine).encrypt(
            &fx.keyring,
            &fx.dir.path().join("plain"),
            &fx.dir.path().join("plain.gpg"),
            &RecipientSet::new(vec!["ABC123".into()]),
        );

        match result {
            Err(ExportError::EncryptionFailed { status, stderr }) => {
                assert!(status.is_empty());
                assert!(stderr.is_empty());
            }
            other => panic!("expected EncryptionFailed, got {other:?}"),
        }
    }
}
