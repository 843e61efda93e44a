//! Shared helpers for tests that drive a real gpg binary.
#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// True when a usable `gpg` is on PATH.
pub fn gpg_available() -> bool {
    Command::new("gpg")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// Skip the current test when gpg is missing.
macro_rules! require_gpg {
    () => {
        if !common::gpg_available() {
            eprintln!("skipping: gpg is not installed");
            return;
        }
    };
}

/// A private gpg home holding secret keys, standing in for the recipient.
pub struct RecipientHome {
    dir: TempDir,
}

impl RecipientHome {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn gpg(&self) -> Command {
        let mut cmd = Command::new("gpg");
        cmd.arg("--homedir")
            .arg(self.dir.path())
            .args(["--batch", "--no-tty", "--pinentry-mode", "loopback", "--passphrase", ""]);
        cmd
    }

    /// Generate an unprotected key and return its fingerprint.
    ///
    /// `expire` uses gpg syntax: "never", "3d", "1y".
    pub fn generate(&self, uid: &str, expire: &str) -> String {
        self.generate_with(uid, expire, None)
    }

    /// Generate a key as if the clock read `faked_time` (e.g. "20200101T000000").
    pub fn generate_backdated(&self, uid: &str, expire: &str, faked_time: &str) -> String {
        self.generate_with(uid, expire, Some(faked_time))
    }

    fn generate_with(&self, uid: &str, expire: &str, faked_time: Option<&str>) -> String {
        let mut cmd = self.gpg();
        if let Some(time) = faked_time {
            cmd.args(["--faked-system-time", time]);
        }
        let status = cmd
            .args(["--quick-gen-key", uid, "future-default", "default", expire])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "gpg key generation failed for {uid}");
        self.fingerprint(uid)
    }

    /// Fingerprint of the primary key matching `uid`.
    pub fn fingerprint(&self, uid: &str) -> String {
        let out = self
            .gpg()
            .args(["--with-colons", "--list-keys", uid])
            .output()
            .unwrap();
        String::from_utf8_lossy(&out.stdout)
            .lines()
            .find(|l| l.starts_with("fpr:"))
            .and_then(|l| l.split(':').nth(9))
            .map(str::to_string)
            .unwrap()
    }

    /// Write the public key for `uid` to `path`, armored or binary.
    pub fn export_public(&self, uid: &str, path: &Path, armor: bool) {
        let mut cmd = self.gpg();
        if armor {
            cmd.arg("--armor");
        }
        let out = cmd.args(["--export", uid]).output().unwrap();
        assert!(out.status.success() && !out.stdout.is_empty());
        std::fs::write(path, out.stdout).unwrap();
    }

    /// Decrypt with whatever secret keys this home holds.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Option<Vec<u8>> {
        let input = self.dir.path().join("incoming.gpg");
        std::fs::write(&input, ciphertext).unwrap();
        let out = self
            .gpg()
            .args(["--decrypt"])
            .arg(&input)
            .output()
            .unwrap();
        out.status.success().then_some(out.stdout)
    }
}

impl Drop for RecipientHome {
    fn drop(&mut self) {
        let _ = Command::new("gpgconf")
            .arg("--homedir")
            .arg(self.dir.path())
            .args(["--kill", "all"])
            .output();
    }
}

/// Number of entries directly under `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
