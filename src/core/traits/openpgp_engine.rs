use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::encryption_result::EncryptionResult;
use crate::core::models::imported_key::ImportedKey;
use crate::core::models::key_material::KeyMaterial;
use crate::core::models::keyring::Keyring;
use crate::core::models::recipient_set::RecipientSet;

/// Port for an OpenPGP-compatible engine operating on one keyring at a time.
///
/// Implementations live in `adapters::gpg` (GpgEngine). The core layer only
/// depends on this trait, never on a concrete engine.
pub trait OpenPgpEngine: Send + Sync {
    /// Import key material into `keyring`, returning the fingerprints the
    /// engine accepted.
    fn import_keys(&self, keyring: &Keyring, material: &KeyMaterial) -> Result<Vec<String>>;

    /// List every public key currently present in `keyring`.
    fn list_keys(&self, keyring: &Keyring) -> Result<Vec<ImportedKey>>;

    /// Encrypt `input` to `recipients` as binary (non-armored) OpenPGP,
    /// trusting every recipient key, and write the ciphertext to `output`.
    ///
    /// `Err` means the engine could not be run at all; an engine that ran
    /// and refused reports `Ok` with `ok == false`.
    fn encrypt_file(
        &self,
        keyring: &Keyring,
        input: &Path,
        output: &Path,
        recipients: &RecipientSet,
    ) -> Result<EncryptionResult>;

    /// Stop any helper processes the engine started for `keyring`.
    fn release(&self, _keyring: &Keyring) -> Result<()> {
        Ok(())
    }

    /// Human-readable name of this engine (e.g. "gpg").
    fn name(&self) -> &str;
}

impl<E: OpenPgpEngine + ?Sized> OpenPgpEngine for &E {
    fn import_keys(&self, keyring: &Keyring, material: &KeyMaterial) -> Result<Vec<String>> {
        (**self).import_keys(keyring, material)
    }

    fn list_keys(&self, keyring: &Keyring) -> Result<Vec<ImportedKey>> {
        (**self).list_keys(keyring)
    }

    fn encrypt_file(
        &self,
        keyring: &Keyring,
        input: &Path,
        output: &Path,
        recipients: &RecipientSet,
    ) -> Result<EncryptionResult> {
        (**self).encrypt_file(keyring, input, output, recipients)
    }

    fn release(&self, keyring: &Keyring) -> Result<()> {
        (**self).release(keyring)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
