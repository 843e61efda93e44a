use std::path::PathBuf;
use std::sync::Arc;

use encrypted_export::adapters::gpg::gpg_engine::GpgEngine;
use encrypted_export::adapters::key_sources::file_key_source::FileKeySource;
use encrypted_export::config::app_config::AppConfig;
use encrypted_export::core::errors::Result;
use encrypted_export::core::services::export_session::SessionOptions;
use encrypted_export::core::traits::key_source::KeySource;

use crate::cli::{Cli, KeyArgs};

/// Settings for one command: the config file merged with command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub gpg_path: Option<PathBuf>,
    pub gpgconf_path: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub key_files: Vec<PathBuf>,
    pub recipients: Vec<String>,
}

impl Settings {
    /// Load the config file and apply flags on top.
    pub fn resolve(cli: &Cli, keys: &KeyArgs) -> Result<Self> {
        let config = AppConfig::load(cli.config.as_deref())?;
        Ok(Self::merge(config, cli, keys))
    }

    /// Flags win over the file: key files are added (without duplicates),
    /// recipients and paths replace the file's values when given.
    pub fn merge(config: AppConfig, cli: &Cli, keys: &KeyArgs) -> Self {
        let mut key_files = config.keys.files;
        for path in &keys.keys {
            if !key_files.contains(path) {
                key_files.push(path.clone());
            }
        }

        let recipients = if keys.recipients.is_empty() {
            config.keys.recipients
        } else {
            keys.recipients.clone()
        };

        Self {
            gpg_path: cli.gpg.clone().or(config.engine.gpg_path),
            gpgconf_path: config.engine.gpgconf_path,
            temp_dir: keys.temp_dir.clone().or(config.session.temp_dir),
            key_files,
            recipients,
        }
    }

    pub fn engine(&self) -> GpgEngine {
        let engine = match &self.gpg_path {
            Some(path) => GpgEngine::with_path(path.clone()),
            None => GpgEngine::new(),
        };
        match &self.gpgconf_path {
            Some(path) => engine.with_gpgconf(path.clone()),
            None => engine,
        }
    }

    pub fn key_sources(&self) -> Vec<Arc<dyn KeySource>> {
        self.key_files
            .iter()
            .map(|path| Arc::new(FileKeySource::new(path.clone())) as Arc<dyn KeySource>)
            .collect()
    }

    /// Session options using the process-wide key cache.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            key_sources: self.key_sources(),
            recipients: (!self.recipients.is_empty()).then(|| self.recipients.clone()),
            temp_dir: self.temp_dir.clone(),
            cache: None,
        }
    }
}
