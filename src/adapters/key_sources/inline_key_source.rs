use crate::core::traits::key_source::KeySource;

/// Key material already held in memory, e.g. pulled from a secrets store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineKeySource {
    id: String,
    material: Vec<u8>,
}

impl InlineKeySource {
    pub fn new(id: impl Into<String>, material: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            material: material.into(),
        }
    }
}

impl KeySource for InlineKeySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_key(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.material.clone())
    }
}
