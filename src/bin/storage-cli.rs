use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "storage-cli")]
#[command(about = "Management CLI for the storage service", long_about = None)]
struct Cli {
    /// Base URL of the service's management API, as logged by the service
    /// at startup ("Management API bound").
    #[arg(short, long)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service uptime and lifecycle state
    Ping,
    /// Ask the service to shut down
    Shutdown,
    /// Push a configuration change for a category
    Change {
        category: String,
        /// JSON document, or a plain string
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Ping => {
            let res = client
                .get(format!("{}/foglamp/service/ping", base))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Shutdown => {
            let res = client
                .post(format!("{}/foglamp/service/shutdown", base))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Change { category, value } => {
            let items = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            let res = client
                .post(format!("{}/foglamp/change", base))
                .json(&json!({ "category": category, "items": items }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: management API returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
