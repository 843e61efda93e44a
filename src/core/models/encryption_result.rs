/// Outcome of a single engine encrypt call.
///
/// Diagnostics are optional because engines do not always report them;
/// consumers treat a missing value as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionResult {
    pub ok: bool,
    pub status: Option<String>,
    pub stderr: Option<String>,
}

impl EncryptionResult {
    pub fn success() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn failure(status: Option<String>, stderr: Option<String>) -> Self {
        Self {
            ok: false,
            status,
            stderr,
        }
    }

    pub fn status_text(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    pub fn stderr_text(&self) -> &str {
        self.stderr.as_deref().unwrap_or_default()
    }
}
