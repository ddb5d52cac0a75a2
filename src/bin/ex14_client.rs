use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use parbatch::client::{BatchClient, DEFAULT_INPUT, DEFAULT_SERVER_URL, read_batch};
use parbatch::exercises::{Exercise, PasswordStrength};
use parbatch::logging::{LogProfile, init_tracing};

#[derive(Parser)]
#[command(
    name = "ex14-client",
    about = "Post password candidates from a file to the /ex14 endpoint"
)]
struct Cli {
    /// Client name sent in the X-Client-Name header
    #[arg(long, default_value = "Elena")]
    name: String,
    /// Maximum number of lines to send (zero or negative = send all)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    max: i64,
    /// Line-oriented input file
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,
    /// Server base URL
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    url: String,
}

#[tokio::main]
async fn main() {
    init_tracing(LogProfile::Cli);
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let items = read_batch(&cli.input, cli.max)?;
    let payload = serde_json::to_vec(&items).context("failed to marshal json")?;
    let path = PasswordStrength::PATH;

    println!("Client {} Connected.", cli.name);
    println!(
        "Client {} made a POST request to {} with data {}",
        cli.name,
        path,
        String::from_utf8_lossy(&payload)
    );

    let client = BatchClient::new(cli.url, cli.name);
    let reply = client.post_json(path, payload).await?;

    println!("status: {}", reply.status);
    println!("body: {}", reply.body);
    for message in reply.server_messages() {
        println!("Server: {message}");
    }
    println!("Client {} receives response from server", client.client_name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_max_is_accepted() {
        let cli = Cli::try_parse_from(["ex14-client", "--max", "-1"]).expect("parse");
        assert_eq!(cli.max, -1);
        assert_eq!(cli.name, "Elena");
    }

    #[test]
    fn max_defaults_to_unlimited() {
        let cli = Cli::try_parse_from(["ex14-client"]).expect("parse");
        assert_eq!(cli.max, 0);
    }
}
