use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStdin, Command, Output, Stdio};
use std::thread;

use crate::adapters::gpg::colon_listing;
use crate::core::errors::{ExportError, Result};
use crate::core::models::encryption_result::EncryptionResult;
use crate::core::models::imported_key::ImportedKey;
use crate::core::models::key_material::KeyMaterial;
use crate::core::models::keyring::Keyring;
use crate::core::models::recipient_set::RecipientSet;
use crate::core::traits::openpgp_engine::OpenPgpEngine;

/// OpenPGP engine that shells out to the system `gpg` binary.
///
/// Every call runs with `--homedir` pointing at the session keyring, so the
/// user's own keyring is never read or modified.
#[derive(Debug, Clone)]
pub struct GpgEngine {
    /// Path to the gpg binary (defaults to "gpg").
    gpg_path: PathBuf,
    /// Path to gpgconf, used to stop agents started for a keyring.
    gpgconf_path: PathBuf,
}

impl GpgEngine {
    /// Create a new engine using the default `gpg` binary.
    pub fn new() -> Self {
        Self {
            gpg_path: PathBuf::from("gpg"),
            gpgconf_path: PathBuf::from("gpgconf"),
        }
    }

    /// Create a new engine with a custom gpg binary path.
    pub fn with_path(gpg_path: PathBuf) -> Self {
        Self {
            gpg_path,
            ..Self::new()
        }
    }

    pub fn with_gpgconf(mut self, gpgconf_path: PathBuf) -> Self {
        self.gpgconf_path = gpgconf_path;
        self
    }

    /// Check if GPG is available on the system.
    pub fn is_available(&self) -> bool {
        self.check_available().is_ok()
    }

    /// Like `is_available`, but explains why not.
    pub fn check_available(&self) -> Result<()> {
        let output = Command::new(&self.gpg_path)
            .arg("--version")
            .output()
            .map_err(|e| self.unavailable(e.to_string()))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(self.unavailable(format!("'--version' exited with {}", output.status)))
        }
    }

    fn unavailable(&self, reason: String) -> ExportError {
        ExportError::EngineUnavailable {
            engine: self.gpg_path.display().to_string(),
            reason,
        }
    }

    /// Run gpg against `keyring`, optionally feeding `stdin_data`.
    fn run_gpg<I, S>(&self, keyring: &Keyring, args: I, stdin_data: Option<&[u8]>) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.gpg_path);
        cmd.arg("--homedir")
            .arg(keyring.home())
            .args(["--batch", "--no-tty"])
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let Some(data) = stdin_data else {
            return cmd.stdin(Stdio::null()).output().map_err(|e| self.unavailable(e.to_string()));
        };

        cmd.stdin(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| self.unavailable(e.to_string()))?;
        let stdin = child.stdin.take();

        // gpg may fill its stdout/stderr pipes before it has read all of its
        // input, so the input is written while the output is drained.
        thread::scope(|scope| -> Result<Output> {
            let writer = scope.spawn(move || write_input(stdin, data));
            let output = child.wait_with_output()?;
            writer
                .join()
                .map_err(|_| io::Error::other("gpg input writer panicked"))??;
            Ok(output)
        })
    }
}

fn write_input(stdin: Option<ChildStdin>, data: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(data) {
        // gpg may stop reading early on garbage input; its status output says why.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

impl Default for GpgEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprints from `[GNUPG:] IMPORT_OK <reason> <fingerprint>` status lines.
fn imported_fingerprints(status: &str) -> Vec<String> {
    let mut fingerprints: Vec<String> = Vec::new();
    for line in status.lines() {
        let mut words = line.split_whitespace();
        if words.next() != Some("[GNUPG:]") || words.next() != Some("IMPORT_OK") {
            continue;
        }
        if let Some(fpr) = words.nth(1) {
            if !fingerprints.iter().any(|f| f == fpr) {
                fingerprints.push(fpr.to_string());
            }
        }
    }
    fingerprints
}

/// Verdict of one `gpg --encrypt` run. gpg can exit 0 after skipping every
/// recipient, so success also requires the output file to exist.
fn encryption_result(run: &Output, ciphertext_written: bool) -> EncryptionResult {
    if run.status.success() && ciphertext_written {
        EncryptionResult::success()
    } else {
        EncryptionResult::failure(non_empty(&run.stdout), non_empty(&run.stderr))
    }
}

fn non_empty(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes).trim().to_string();
    (!text.is_empty()).then_some(text)
}

impl OpenPgpEngine for GpgEngine {
    fn import_keys(&self, keyring: &Keyring, material: &KeyMaterial) -> Result<Vec<String>> {
        let output = self.run_gpg(
            keyring,
            ["--status-fd", "1", "--import"],
            Some(material.as_bytes()),
        )?;

        let fingerprints = imported_fingerprints(&String::from_utf8_lossy(&output.stdout));
        if fingerprints.is_empty() && !output.status.success() {
            return Err(ExportError::EngineFailed {
                operation: "import".into(),
                reason: non_empty(&output.stderr)
                    .unwrap_or_else(|| format!("gpg exited with {}", output.status)),
            });
        }
        Ok(fingerprints)
    }

    fn list_keys(&self, keyring: &Keyring) -> Result<Vec<ImportedKey>> {
        let output = self.run_gpg(
            keyring,
            ["--with-colons", "--fixed-list-mode", "--list-keys"],
            None,
        )?;
        if !output.status.success() {
            return Err(ExportError::EngineFailed {
                operation: "list keys".into(),
                reason: non_empty(&output.stderr)
                    .unwrap_or_else(|| format!("gpg exited with {}", output.status)),
            });
        }
        Ok(colon_listing::parse_public_keys(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    fn encrypt_file(
        &self,
        keyring: &Keyring,
        input: &Path,
        output: &Path,
        recipients: &RecipientSet,
    ) -> Result<EncryptionResult> {
        let mut args: Vec<&OsStr> = vec![
            OsStr::new("--yes"),
            OsStr::new("--status-fd"),
            OsStr::new("1"),
            OsStr::new("--trust-model"),
            OsStr::new("always"),
            // Recipients must come from the session keyring, never the network.
            OsStr::new("--auto-key-locate"),
            OsStr::new("local"),
            OsStr::new("--output"),
            output.as_os_str(),
            OsStr::new("--encrypt"),
        ];
        for recipient in recipients.iter() {
            args.push(OsStr::new("--recipient"));
            args.push(OsStr::new(recipient));
        }
        args.push(OsStr::new("--"));
        args.push(input.as_os_str());

        let run = self.run_gpg(keyring, args, None)?;
        Ok(encryption_result(&run, output.is_file()))
    }

    fn release(&self, keyring: &Keyring) -> Result<()> {
        let output = Command::new(&self.gpgconf_path)
            .arg("--homedir")
            .arg(keyring.home())
            .args(["--kill", "all"])
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(ExportError::EngineFailed {
                operation: "release".into(),
                reason: non_empty(&out.stderr)
                    .unwrap_or_else(|| format!("gpgconf exited with {}", out.status)),
            }),
            // No gpgconf means no agent was ever started through it.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "gpg"
    }
}
