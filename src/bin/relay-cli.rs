use std::path::PathBuf;

use clap::{Parser, Subcommand};

use edge_relay::files::kind;
use edge_relay::security::extract_user_id;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Offline helpers for the edge relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the user id carried by a token (signature is NOT verified)
    UserId {
        /// Raw token, with or without the "Bearer " prefix
        token: String,
    },
    /// Show how a local file would be classified on upload
    Classify {
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::UserId { token } => {
            let user_id = extract_user_id(&token)?;
            println!("{user_id}");
        }
        Commands::Classify { path } => {
            let content = std::fs::read(&path)?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let classification = kind::classify(&filename, &content);

            println!("kind:         {:?}", classification.kind);
            println!("kindfile:     {}", classification.kind.kindfile());
            println!("content-type: {}", classification.content_type);
            if let Some(sniffed) = kind::sniff_mime(&content) {
                println!("sniffed:      {sniffed}");
            }
        }
    }

    Ok(())
}
