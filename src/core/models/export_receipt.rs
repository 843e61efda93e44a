use serde::Serialize;

use super::imported_key::ImportedKey;
use super::recipient_set::RecipientSet;

/// Summary of a delivered export, returned once the ciphertext is at its destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub plaintext_bytes: u64,
    pub ciphertext_bytes: u64,
    /// Lowercase hex SHA-256 of the delivered ciphertext.
    pub ciphertext_sha256: String,
    pub recipients: RecipientSet,
    pub imported_keys: Vec<ImportedKey>,
}
