use crate::core::errors::Result;
use crate::core::models::keyring::Keyring;
use crate::core::models::recipient_set::RecipientSet;
use crate::core::traits::openpgp_engine::OpenPgpEngine;

/// Decides who an export is encrypted to.
pub struct RecipientResolver<'a, E: OpenPgpEngine + ?Sized> {
    engine: &'a E,
}

impl<'a, E: OpenPgpEngine + ?Sized> RecipientResolver<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Explicit recipients win when non-empty; otherwise every key in
    /// `keyring` becomes a recipient, by fingerprint.
    pub fn resolve(&self, keyring: &Keyring, explicit: Option<&[String]>) -> Result<RecipientSet> {
        if let Some(explicit) = explicit.filter(|r| !r.is_empty()) {
            return Ok(RecipientSet::new(explicit.to_vec()));
        }

        Ok(self
            .engine
            .list_keys(keyring)?
            .into_iter()
            .map(|key| key.fingerprint)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::key_material::KeyMaterial;
    use crate::core::testing::{FakeEngine, fake_key};

    fn populated(engine: &FakeEngine) -> (tempfile::TempDir, Keyring) {
        let dir = tempfile::tempdir().unwrap();
        let keyring = Keyring::at(dir.path());
        let material = format!(
            "{}{}",
            fake_key("AAA111", "Alice", None),
            fake_key("BBB222", "Bob", None)
        );
        engine
            .import_keys(&keyring, &KeyMaterial::from(material.as_str()))
            .unwrap();
        (dir, keyring)
    }

    #[test]
    fn explicit_recipients_are_returned_unchanged() {
        let engine = FakeEngine::new();
        let (_dir, keyring) = populated(&engine);
        let explicit = vec!["partner@example.com".to_string()];

        let set = RecipientResolver::new(&engine)
            .resolve(&keyring, Some(&explicit))
            .unwrap();

        assert_eq!(set.as_slice(), explicit.as_slice());
    }

    #[test]
    fn falls_back_to_every_key_in_keyring() {
        let engine = FakeEngine::new();
        let (_dir, keyring) = populated(&engine);

        let set = RecipientResolver::new(&engine)
            .resolve(&keyring, Some(&[]))
            .unwrap();

        assert_eq!(set.as_slice(), ["AAA111", "BBB222"]);
    }

    #[test]
    fn empty_keyring_yields_empty_set() {
        let engine = FakeEngine::new();
        let dir = tempfile::tempdir().unwrap();

        let set = RecipientResolver::new(&engine)
            .resolve(&Keyring::at(dir.path()), None)
            .unwrap();

        assert!(set.is_empty());
    }
}
