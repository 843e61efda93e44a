//! Test doubles shared by the unit tests of `core::services`.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::errors::{ExportError, Result};
use crate::core::models::encryption_result::EncryptionResult;
use crate::core::models::imported_key::ImportedKey;
use crate::core::models::key_material::KeyMaterial;
use crate::core::models::keyring::Keyring;
use crate::core::models::recipient_set::RecipientSet;
use crate::core::traits::key_source::KeySource;
use crate::core::traits::openpgp_engine::OpenPgpEngine;

/// Key source that counts how often it was read.
pub struct CountingSource {
    id: String,
    text: String,
    reads: AtomicUsize,
}

impl CountingSource {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl KeySource for CountingSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_key(&self) -> std::io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone().into_bytes())
    }
}

/// Key source whose read always fails.
pub struct UnreadableSource {
    id: String,
}

impl UnreadableSource {
    pub fn new(id: &str) -> Self {
        Self { id: id.into() }
    }
}

impl KeySource for UnreadableSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_key(&self) -> std::io::Result<Vec<u8>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ))
    }
}

/// One line of fake key material: `FINGERPRINT|uid1;uid2|expires_epoch`.
///
/// An empty expiry field means the key never expires.
pub fn fake_key(fingerprint: &str, uid: &str, expires: Option<i64>) -> String {
    let expires = expires.map(|e| e.to_string()).unwrap_or_default();
    format!("{fingerprint}|{uid}|{expires}\n")
}

const KEYS_FILE: &str = "fake-keys.txt";
pub const FAKE_HEADER: &str = "FAKEPGP";

/// In-memory stand-in for an OpenPGP engine.
///
/// Keyring contents are stored inside the keyring directory itself, so two
/// sessions only share keys if they share a directory. "Ciphertext" is the
/// plaintext prefixed with a header naming the recipients.
#[derive(Default)]
pub struct FakeEngine {
    pub fail_encrypt: bool,
    imports: AtomicUsize,
    encrypts: AtomicUsize,
    releases: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_encrypt: true,
            ..Self::default()
        }
    }

    pub fn imports(&self) -> usize {
        self.imports.load(Ordering::SeqCst)
    }

    pub fn encrypts(&self) -> usize {
        self.encrypts.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    fn parse_line(line: &str) -> Option<ImportedKey> {
        let mut fields = line.split('|');
        let fingerprint = fields.next()?.trim();
        let uids = fields.next()?;
        let expires = fields.next()?.trim();
        if fingerprint.is_empty() {
            return None;
        }
        let expires = if expires.is_empty() {
            None
        } else {
            Some(chrono::DateTime::from_timestamp(expires.parse().ok()?, 0)?)
        };
        Some(ImportedKey {
            fingerprint: fingerprint.to_string(),
            key_id: fingerprint[fingerprint.len().saturating_sub(16)..].to_string(),
            user_ids: uids
                .split(';')
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .collect(),
            expires,
        })
    }
}

impl OpenPgpEngine for FakeEngine {
    fn import_keys(&self, keyring: &Keyring, material: &KeyMaterial) -> Result<Vec<String>> {
        self.imports.fetch_add(1, Ordering::SeqCst);
        let text = String::from_utf8_lossy(material.as_bytes()).into_owned();
        let parsed: Vec<_> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if parsed.is_empty() || parsed.iter().any(|l| Self::parse_line(l).is_none()) {
            return Err(ExportError::EngineFailed {
                operation: "import".into(),
                reason: "no valid OpenPGP data found".into(),
            });
        }

        let path = keyring.home().join(KEYS_FILE);
        let mut stored = std::fs::read_to_string(&path).unwrap_or_default();
        let mut fingerprints = Vec::new();
        for line in parsed {
            if let Some(key) = Self::parse_line(line) {
                if !stored.lines().any(|l| l.starts_with(&key.fingerprint)) {
                    stored.push_str(line);
                    stored.push('\n');
                }
                fingerprints.push(key.fingerprint);
            }
        }
        std::fs::write(&path, stored)?;
        Ok(fingerprints)
    }

    fn list_keys(&self, keyring: &Keyring) -> Result<Vec<ImportedKey>> {
        let path = keyring.home().join(KEYS_FILE);
        let stored = std::fs::read_to_string(path).unwrap_or_default();
        Ok(stored.lines().filter_map(Self::parse_line).collect())
    }

    fn encrypt_file(
        &self,
        keyring: &Keyring,
        input: &Path,
        output: &Path,
        recipients: &RecipientSet,
    ) -> Result<EncryptionResult> {
        self.encrypts.fetch_add(1, Ordering::SeqCst);
        if self.fail_encrypt {
            return Ok(EncryptionResult::failure(None, None));
        }

        let known = self.list_keys(keyring)?;
        if let Some(unknown) = recipients
            .iter()
            .find(|r| !known.iter().any(|k| k.fingerprint == *r))
        {
            return Ok(EncryptionResult::failure(
                Some(format!("INV_RECP 0 {unknown}")),
                Some(format!("{unknown}: skipped: No public key")),
            ));
        }

        let mut ciphertext = format!("{FAKE_HEADER} {}\n", recipients.as_slice().join(","))
            .into_bytes();
        ciphertext.extend(std::fs::read(input)?);
        std::fs::write(output, ciphertext)?;
        Ok(EncryptionResult::success())
    }

    fn release(&self, _keyring: &Keyring) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
