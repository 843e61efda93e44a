use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How close a key is to expiring, relative to a point in time.
///
/// Only ever advisory: an expired key is still imported and still
/// offered as a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    NonExpiring,
    Valid,
    ExpiringSoon,
    Expired,
}

/// Keys expiring within this window are flagged as expiring soon.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

impl ExpiryStatus {
    pub fn classify(expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match expires {
            None => Self::NonExpiring,
            Some(at) if at <= now => Self::Expired,
            Some(at) if at <= now + Duration::days(EXPIRY_WARNING_DAYS) => Self::ExpiringSoon,
            Some(_) => Self::Valid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NonExpiring => "never expires",
            Self::Valid => "valid",
            Self::ExpiringSoon => "expiring soon",
            Self::Expired => "expired",
        }
    }
}

/// A public key as it exists inside one session keyring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedKey {
    pub fingerprint: String,
    pub key_id: String,
    pub user_ids: Vec<String>,
    pub expires: Option<DateTime<Utc>>,
}

impl ImportedKey {
    pub fn expiry_status(&self, now: DateTime<Utc>) -> ExpiryStatus {
        ExpiryStatus::classify(self.expires, now)
    }
}

impl std::fmt::Display for ImportedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.user_ids.first() {
            Some(uid) => write!(f, "{} ({})", self.fingerprint, uid),
            None => write!(f, "{}", self.fingerprint),
        }
    }
}
