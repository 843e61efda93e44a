pub mod commands;
pub mod context;
pub mod interrupt;
pub mod logging;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Encrypt data exports to OpenPGP recipients without leaving plaintext behind.
#[derive(Parser, Debug)]
#[command(name = "encrypted-export", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the gpg binary
    #[arg(long, global = true, env = "ENCRYPTED_EXPORT_GPG")]
    pub gpg: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt a file (or stdin) for the given public keys
    Export(ExportArgs),

    /// Inspect public keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// File to encrypt (default: stdin)
    pub input: Option<PathBuf>,

    /// Where to write the ciphertext
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub keys: KeyArgs,
}

/// Key selection shared by every command that builds a keyring.
#[derive(Args, Debug, Default)]
pub struct KeyArgs {
    /// Public key file to import. Repeat for several recipients
    #[arg(short, long = "key", value_name = "FILE")]
    pub keys: Vec<PathBuf>,

    /// Encrypt only to this recipient instead of every imported key
    #[arg(short, long = "recipient", value_name = "ID")]
    pub recipients: Vec<String>,

    /// Parent directory for the temporary workspace
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Import keys into a throwaway keyring and report their expiry
    Inspect {
        #[command(flatten)]
        keys: KeyArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
