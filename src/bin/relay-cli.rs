use alloy::hex;
use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol_types::SolCall;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use ballot_relay::blockchain::IElectionPosition;
use ballot_relay::http::{NonceResponse, RelayRequest, WireNonce, X_REQUEST_ID};
use ballot_relay::relay::codec::sign_meta_transaction;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator and voter CLI for the ballot relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin API key (admin commands only)
    #[arg(short, long, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay status and request counters (admin)
    Status,
    /// Relayer account, balance and RPC health (admin)
    Relayer,
    /// List registered positions
    Positions,
    /// Show the nonce an address must sign with
    Nonce { position: String, address: Address },
    /// Sign a vote locally and submit it through the relay
    Vote {
        #[arg(long)]
        position: String,
        #[arg(long)]
        candidate: u64,
        /// Environment variable holding the voter's private key
        #[arg(long, default_value = "VOTER_PRIVATE_KEY")]
        key_env: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/admin/status", url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Relayer => {
            let res = client.get(format!("{}/admin/relayer", url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Positions => {
            let res = client.get(format!("{}/api/v1/positions", url)).send().await?;
            print_response(res).await?;
        }
        Commands::Nonce { position, address } => {
            let res = client
                .get(format!("{}/api/v1/nonce/{}/{}", url, position, address))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Vote { position, candidate, key_env } => {
            let key = std::env::var(&key_env)
                .map_err(|_| format!("environment variable {} is not set", key_env))?;
            let signer: PrivateKeySigner = key.trim().trim_start_matches("0x").parse()?;

            let positions: BTreeMap<String, Address> = client
                .get(format!("{}/api/v1/positions", url))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            let target = *positions
                .get(&position)
                .ok_or_else(|| format!("position '{}' is not registered", position))?;

            let nonce: NonceResponse = client
                .get(format!("{}/api/v1/nonce/{}/{}", url, position, signer.address()))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            let nonce: U256 = nonce.nonce.parse()?;

            let payload = IElectionPosition::voteCall { candidateId: U256::from(candidate) }.abi_encode();
            let signature = sign_meta_transaction(&signer, target, &payload, nonce).await?;

            let request = RelayRequest {
                from: signer.address().to_string(),
                function_signature: hex::encode_prefixed(&payload),
                nonce: WireNonce::Str(nonce.to_string()),
                r: signature.r.to_string(),
                s: signature.s.to_string(),
                v: i64::from(signature.v),
                position,
            };

            let request_id = Uuid::new_v4().to_string();
            eprintln!("Submitting vote as {} (request {})", signer.address(), request_id);
            let res = client
                .post(format!("{}/api/v1/relay", url))
                .header(X_REQUEST_ID, request_id)
                .json(&request)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
