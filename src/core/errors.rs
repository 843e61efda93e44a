use std::path::PathBuf;

/// All domain errors for an encrypted export.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(
        "Cannot read key source '{id}': {source}\n\n  \
         The export was aborted and no output was written.\n  \
         Check that the key file exists and is readable."
    )]
    KeySourceUnreadable {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "No recipients available for encryption\n\n  \
         No public key was imported and no explicit recipient was given.\n\n  \
         Solutions:\n    \
         → Pass at least one public key: --key partner.asc\n    \
         → Or list key files under [keys] in the config file"
    )]
    NoRecipients,

    #[error("Error while encrypting.  Status: {status}  StdErr: {stderr}")]
    EncryptionFailed { status: String, stderr: String },

    #[error(
        "OpenPGP engine '{engine}' is not available: {reason}\n\n  \
         Install GnuPG or point --gpg at the gpg binary."
    )]
    EngineUnavailable { engine: String, reason: String },

    #[error("OpenPGP engine failed during {operation}: {reason}")]
    EngineFailed { operation: String, reason: String },

    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists."
    )]
    FileNotFound { path: PathBuf },

    #[error(
        "Interrupted before the export completed\n\n  \
         Temporary files were deleted and no output was written."
    )]
    Interrupted,

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExportError>;
