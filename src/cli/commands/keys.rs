use chrono::Utc;
use serde::Serialize;

use encrypted_export::core::errors::Result;
use encrypted_export::core::models::imported_key::{ExpiryStatus, ImportedKey};
use encrypted_export::core::services::key_cache::KeyCache;
use encrypted_export::core::services::key_importer::KeyImporter;
use encrypted_export::core::services::workspace::Workspace;

use crate::cli::context::Settings;
use crate::cli::output;
use crate::cli::{Cli, KeyArgs, KeysAction};

/// Execute the `encrypted-export keys` command.
pub fn execute(cli: &Cli, action: &KeysAction) -> Result<()> {
    match action {
        KeysAction::Inspect { keys, json } => execute_inspect(cli, keys, *json),
    }
}

#[derive(Serialize)]
struct KeyReport<'a> {
    #[serde(flatten)]
    key: &'a ImportedKey,
    status: ExpiryStatus,
}

/// Import the keys into a throwaway keyring and print what came out.
fn execute_inspect(cli: &Cli, keys: &KeyArgs, json: bool) -> Result<()> {
    let settings = Settings::resolve(cli, keys)?;
    let engine = settings.engine();
    engine.check_available()?;

    let mut workspace = Workspace::create(settings.temp_dir.as_deref())?;
    let imported = KeyImporter::new(&engine, &KeyCache::shared())
        .import_all(workspace.keyring(), &settings.key_sources());
    workspace.teardown(&engine);
    let imported = imported?;

    let now = Utc::now();
    let reports: Vec<_> = imported
        .iter()
        .map(|key| KeyReport {
            key,
            status: key.expiry_status(now),
        })
        .collect();

    if json {
        let text = serde_json::to_string_pretty(&reports).map_err(std::io::Error::from)?;
        println!("{text}");
        return Ok(());
    }

    if reports.is_empty() {
        output::warning("No keys imported");
        return Ok(());
    }

    output::header(&format!("Imported keys ({})", reports.len()));
    for report in &reports {
        let line = format!("{} [{}]", report.key, report.status.label());
        match report.status {
            ExpiryStatus::Expired | ExpiryStatus::ExpiringSoon => output::warning(&line),
            ExpiryStatus::Valid | ExpiryStatus::NonExpiring => output::success(&line),
        }
        for uid in report.key.user_ids.iter().skip(1) {
            output::detail(uid);
        }
        if let Some(expires) = report.key.expires {
            output::detail(&format!("Expires: {}", expires.format("%Y-%m-%d %H:%M UTC")));
        }
    }
    Ok(())
}
