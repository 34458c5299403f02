use clap::{Parser, Subcommand};
use serde_json::Value;
use tonic::transport::Channel;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

use quote_server::rpc::proto::quote_client::QuoteClient;
use quote_server::rpc::proto::GetQuoteRequest;
use quote_server::rpc::HEALTH_SERVICE_NAME;

#[derive(Parser)]
#[command(name = "quote-cli")]
#[command(about = "Client for the quote-of-the-day server", long_about = None)]
struct Cli {
    /// HTTP frontend base URL.
    #[arg(long, default_value = "http://localhost:8080", env = "QUOTE_HTTP_URL")]
    http_url: String,

    /// gRPC frontend endpoint.
    #[arg(long, default_value = "http://localhost:50051", env = "QUOTE_GRPC_URL")]
    grpc_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the quote over HTTP
    Http,
    /// Fetch the quote over gRPC
    Rpc,
    /// Check both frontends
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Http => {
            let res = reqwest::get(format!("{}/json", cli.http_url)).await?;
            print_response(res).await?;
        }
        Commands::Rpc => {
            let mut client = QuoteClient::connect(cli.grpc_url).await?;
            let response = client.get_quote(GetQuoteRequest {}).await?;
            println!("{}", response.into_inner().quote_text);
        }
        Commands::Health => {
            let res = reqwest::get(format!("{}/healthz", cli.http_url)).await?;
            println!("http: {}", res.status());

            let channel = Channel::from_shared(cli.grpc_url)?.connect().await?;
            let mut client = HealthClient::new(channel);
            let response = client
                .check(HealthCheckRequest {
                    service: HEALTH_SERVICE_NAME.to_string(),
                })
                .await?;
            let status = ServingStatus::try_from(response.into_inner().status)
                .unwrap_or(ServingStatus::Unknown);
            println!("grpc: {}", status.as_str_name());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
