//! Encrypted export sessions.
//!
//! Plaintext written to an [`ExportSession`] never leaves its private
//! workspace: on `finish` the session imports the recipients' public keys
//! into an ephemeral keyring, encrypts with an OpenPGP engine (the system
//! `gpg` by default) and copies only the ciphertext to the destination.
//! The workspace is deleted on every exit path.
//!
//! ```no_run
//! use std::io::Write;
//! use std::sync::Arc;
//!
//! use encrypted_export::adapters::gpg::gpg_engine::GpgEngine;
//! use encrypted_export::adapters::key_sources::file_key_source::FileKeySource;
//! use encrypted_export::core::traits::key_source::KeySource;
//! use encrypted_export::{ExportSession, SessionOptions};
//!
//! # fn main() -> encrypted_export::core::errors::Result<()> {
//! let output = std::fs::File::create("orders.csv.gpg")?;
//! let partner: Arc<dyn KeySource> = Arc::new(FileKeySource::new("keys/partner.asc"));
//! let options = SessionOptions {
//!     key_sources: vec![partner],
//!     ..SessionOptions::default()
//! };
//!
//! let receipt = ExportSession::scoped(output, GpgEngine::new(), options, |sink| {
//!     sink.write_all(b"order_id,amount\n1,9.99\n")?;
//!     Ok(())
//! })?;
//! println!("delivered {} bytes", receipt.ciphertext_bytes);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod core;

pub use crate::core::errors::{ExportError, Result};
pub use crate::core::services::export_session::{ExportSession, SessionOptions};
pub use crate::core::services::key_cache::KeyCache;
