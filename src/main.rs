mod cli;

use clap::Parser;
use encrypted_export::ExportError;

use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();
    cli::logging::init(args.verbose, args.quiet);

    let result = match &args.command {
        Commands::Export(export) => cli::commands::export::execute(&args, export),
        Commands::Keys { action } => cli::commands::keys::execute(&args, action),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        let code = match e {
            ExportError::Interrupted => 130,
            _ => 1,
        };
        std::process::exit(code);
    }
}
