use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::errors::Result;
use crate::core::models::imported_key::{ExpiryStatus, ImportedKey};
use crate::core::models::keyring::Keyring;
use crate::core::services::key_cache::KeyCache;
use crate::core::traits::key_source::KeySource;
use crate::core::traits::openpgp_engine::OpenPgpEngine;

/// Loads public keys from their sources into one session keyring.
///
/// Expiration is reported but never enforced: an expired key is logged
/// as an error and still imported.
pub struct KeyImporter<'a, E: OpenPgpEngine + ?Sized> {
    engine: &'a E,
    cache: &'a KeyCache,
}

impl<'a, E: OpenPgpEngine + ?Sized> KeyImporter<'a, E> {
    pub fn new(engine: &'a E, cache: &'a KeyCache) -> Self {
        Self { engine, cache }
    }

    /// Import every source into `keyring`, in order.
    ///
    /// A source that cannot be read stops the import immediately. A source
    /// the engine rejects is logged and skipped.
    pub fn import_all(
        &self,
        keyring: &Keyring,
        sources: &[Arc<dyn KeySource>],
    ) -> Result<Vec<ImportedKey>> {
        self.import_all_at(keyring, sources, Utc::now())
    }

    /// Same as `import_all`, judging expiration against `now`.
    pub fn import_all_at(
        &self,
        keyring: &Keyring,
        sources: &[Arc<dyn KeySource>],
        now: DateTime<Utc>,
    ) -> Result<Vec<ImportedKey>> {
        let mut imported: Vec<ImportedKey> = Vec::new();

        for source in sources {
            let material = self.cache.get(source.as_ref())?;
            tracing::info!(source = source.id(), armored = material.is_armored(), "importing key");

            let fingerprints = match self.engine.import_keys(keyring, &material) {
                Ok(fingerprints) => fingerprints,
                Err(e) => {
                    tracing::warn!(source = source.id(), error = %e, "key import failed, skipping source");
                    continue;
                }
            };
            if fingerprints.is_empty() {
                continue;
            }

            let listed = self.engine.list_keys(keyring)?;
            for fingerprint in fingerprints {
                if imported.iter().any(|k| k.fingerprint == fingerprint) {
                    continue;
                }
                let Some(key) = listed.iter().find(|k| k.fingerprint == fingerprint) else {
                    continue;
                };
                report_expiry(key, now);
                imported.push(key.clone());
            }
        }

        Ok(imported)
    }
}

fn report_expiry(key: &ImportedKey, now: DateTime<Utc>) {
    match key.expiry_status(now) {
        ExpiryStatus::Expired => tracing::error!(
            fingerprint = %key.fingerprint,
            user_ids = ?key.user_ids,
            expires = ?key.expires,
            "key has expired"
        ),
        ExpiryStatus::ExpiringSoon => tracing::warn!(
            fingerprint = %key.fingerprint,
            user_ids = ?key.user_ids,
            expires = ?key.expires,
            "key will expire in the next week"
        ),
        ExpiryStatus::Valid | ExpiryStatus::NonExpiring => {}
    }
}
