use std::fmt;

/// Lifecycle of an export session.
///
/// `Created` is the only state that accepts plaintext. Every session ends
/// in `Delivered`, `Failed` or `Aborted`, and its workspace is gone by then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    KeyringReady,
    Encrypting,
    Delivered,
    Failed,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Failed | Self::Aborted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::KeyringReady => "keyring-ready",
            Self::Encrypting => "encrypting",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
