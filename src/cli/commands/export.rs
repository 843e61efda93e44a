use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use chrono::Utc;
use encrypted_export::core::errors::{ExportError, Result};
use encrypted_export::core::models::export_receipt::ExportReceipt;
use encrypted_export::core::models::imported_key::ExpiryStatus;
use encrypted_export::core::services::export_session::ExportSession;

use crate::cli::context::Settings;
use crate::cli::interrupt::{Feed, InterruptibleInput};
use crate::cli::output;
use crate::cli::{Cli, ExportArgs};

/// Execute the `encrypted-export export` command.
///
/// Ciphertext is staged next to the output file and only renamed into
/// place once the export succeeded, so a failed or interrupted run leaves
/// no output. An interrupt aborts the session so its workspace is deleted
/// before the process exits.
pub fn execute(cli: &Cli, args: &ExportArgs) -> Result<()> {
    let settings = Settings::resolve(cli, &args.keys)?;
    let engine = settings.engine();
    engine.check_available()?;

    let reader: Box<dyn Read + Send> = match &args.input {
        Some(path) if !path.is_file() => {
            return Err(ExportError::FileNotFound { path: path.clone() });
        }
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin()),
    };
    let input = InterruptibleInput::spawn(reader).on_termination_signals();

    let output_dir = match args.output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staged = tempfile::Builder::new()
        .prefix(".encrypted-export")
        .suffix(".partial")
        .tempfile_in(output_dir)?;

    if cli.verbose {
        for key in &settings.key_files {
            output::detail(&format!("Key: {}", key.display()));
        }
        for recipient in &settings.recipients {
            output::detail(&format!("Recipient: {recipient}"));
        }
    }

    let bar = output::delivery_bar(cli.quiet);
    let progress = bar.clone();
    let mut session = ExportSession::open(staged.as_file(), &engine, settings.session_options())?
        .with_progress(move |n| progress.set_position(n));

    if let Err(e) = copy_input(&input, &mut session) {
        session.abort();
        bar.finish_and_clear();
        return Err(e);
    }
    let receipt = session.finish();
    bar.finish_and_clear();
    let receipt = receipt?;
    if input.is_interrupted() {
        return Err(ExportError::Interrupted);
    }

    staged
        .persist(&args.output)
        .map_err(|e| ExportError::Io(e.error))?;

    if !cli.quiet {
        report(&receipt, &args.output);
    }
    Ok(())
}

fn copy_input<W: Write>(input: &InterruptibleInput, session: &mut W) -> Result<()> {
    loop {
        match input.next_feed() {
            Feed::Chunk(bytes) => session.write_all(&bytes)?,
            Feed::End => return Ok(()),
            Feed::Failed(e) => return Err(e.into()),
            Feed::Interrupted => {
                tracing::warn!("interrupted, discarding export");
                return Err(ExportError::Interrupted);
            }
        }
    }
}

fn report(receipt: &ExportReceipt, destination: &Path) {
    let now = Utc::now();
    for key in &receipt.imported_keys {
        match key.expiry_status(now) {
            ExpiryStatus::Expired => output::warning(&format!("Key {key} has expired")),
            ExpiryStatus::ExpiringSoon => {
                output::warning(&format!("Key {key} expires within a week"))
            }
            ExpiryStatus::Valid | ExpiryStatus::NonExpiring => {}
        }
    }

    output::success(&format!(
        "Encrypted {} byte(s) for {} recipient(s)",
        receipt.plaintext_bytes,
        receipt.recipients.len()
    ));
    output::success(&format!(
        "Saved {} byte(s) to {}",
        receipt.ciphertext_bytes,
        destination.display()
    ));
    output::detail(&format!("SHA-256: {}", receipt.ciphertext_sha256));
}
