use std::sync::Arc;

/// Raw OpenPGP public-key material, ASCII-armored or binary.
///
/// Cheap to clone: every clone shares the same immutable buffer, so one
/// cached read can feed any number of imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    bytes: Arc<[u8]>,
}

impl KeyMaterial {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the material looks like an ASCII-armored key block.
    pub fn is_armored(&self) -> bool {
        let trimmed = self.bytes.trim_ascii_start();
        trimmed.starts_with(b"-----BEGIN PGP")
    }
}

impl From<&str> for KeyMaterial {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}
