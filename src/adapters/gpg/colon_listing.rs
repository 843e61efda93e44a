//! Parser for `gpg --with-colons --fixed-list-mode --list-keys` output.
//!
//! Only the records needed to describe a public key are read:
//! `pub` (key id, expiry), the `fpr` that follows it, and its `uid`s.
//! Subkey records and their fingerprints are skipped.

use chrono::{DateTime, Utc};

use crate::core::models::imported_key::ImportedKey;

const FIELD_KEY_ID: usize = 4;
const FIELD_EXPIRES: usize = 6;
const FIELD_USER_ID: usize = 9;
const FIELD_FINGERPRINT: usize = 9;

/// Parse every primary public key in a colon listing, in listing order.
pub fn parse_public_keys(listing: &str) -> Vec<ImportedKey> {
    let mut keys = Vec::new();
    let mut current: Option<ImportedKey> = None;
    // True between a `pub` record and its own `fpr` record.
    let mut awaiting_primary_fpr = false;

    for line in listing.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        match fields.first().copied() {
            Some("pub") => {
                keys.extend(current.take());
                current = Some(ImportedKey {
                    fingerprint: String::new(),
                    key_id: field(&fields, FIELD_KEY_ID).to_string(),
                    user_ids: Vec::new(),
                    expires: parse_timestamp(field(&fields, FIELD_EXPIRES)),
                });
                awaiting_primary_fpr = true;
            }
            Some("fpr") if awaiting_primary_fpr => {
                if let Some(key) = current.as_mut() {
                    key.fingerprint = field(&fields, FIELD_FINGERPRINT).to_string();
                }
                awaiting_primary_fpr = false;
            }
            Some("uid") => {
                if let Some(key) = current.as_mut() {
                    key.user_ids.push(unescape(field(&fields, FIELD_USER_ID)));
                }
            }
            Some("sub") => awaiting_primary_fpr = false,
            _ => {}
        }
    }
    keys.extend(current);

    keys.into_iter()
        .filter(|k| !k.fingerprint.is_empty())
        .collect()
}

fn field<'a>(fields: &[&'a str], index: usize) -> &'a str {
    fields.get(index).copied().unwrap_or_default()
}

/// Expiry is seconds since the epoch in fixed-list mode; empty means never.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let seconds: i64 = raw.trim().parse().ok()?;
    DateTime::from_timestamp(seconds, 0)
}

/// Undo gpg's `\xHH` escaping of user ids (used for `:` and control bytes).
fn unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'x') {
            let decoded = raw
                .get(i + 2..i + 4)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
