use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the asset relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    /// Asset mount segment on the server.
    #[arg(short, long, default_value = "files")]
    mount: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Fetch an asset and report where it came from
    Fetch {
        /// Path relative to the mount, e.g. tickets/42/report.pdf
        path: String,
        /// Send X-Proxy-From as this peer (exercises loop prevention)
        #[arg(long)]
        as_peer: Option<String>,
        /// Write the body here instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/api/v1/health", base)).send().await?;
            print_json(res).await?;
        }
        Commands::Fetch { path, as_peer, output } => {
            let url = format!(
                "{}/{}/{}",
                base,
                cli.mount.trim_matches('/'),
                path.trim_start_matches('/')
            );
            let mut req = client.get(&url);
            if let Some(peer) = as_peer {
                req = req.header("X-Proxy-From", peer);
            }
            let res = req.send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: {} returned status {}", url, status);
                print_json(res).await?;
                return Ok(());
            }

            let content_type = res
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            let body = res.bytes().await?;
            match output {
                Some(file) => {
                    tokio::fs::write(&file, &body).await?;
                    println!("{} bytes ({}) written to {}", body.len(), content_type, file.display());
                }
                None => println!("{} {} bytes ({})", status, body.len(), content_type),
            }
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
