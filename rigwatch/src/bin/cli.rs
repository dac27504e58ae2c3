//! Command-line interface for rigwatch.
//!
//! Runs a single health check against the pool and prints the result.
//! Nothing is sent to the alert recipients.

use std::env;

use anyhow::Result;

use rigwatch::api_client;
use rigwatch::config;
use rigwatch::health;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: rigwatch-cli <command> [miner-id]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  status    Fetch pool statistics and classify rig health");
        eprintln!();
        eprintln!("Environment:");
        eprintln!(
            "  {}    Miner id used when none is given",
            config::MINER_ID
        );
        eprintln!(
            "  {}    Pool API base URL (default: {})",
            config::POOL_URL,
            api_client::DEFAULT_BASE_URL
        );
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status(args.get(2).cloned()).await?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring RIGWATCH_POOL_URL if set.
fn make_client() -> Result<api_client::Client> {
    let client = match env::var(config::POOL_URL) {
        Ok(url) => api_client::Client::with_base_url(url)?,
        Err(_) => api_client::Client::new()?,
    };
    Ok(client)
}

/// Print the rig's statistics and their classification.
async fn cmd_status(miner_id: Option<String>) -> Result<()> {
    let miner_id = match miner_id.or_else(|| env::var(config::MINER_ID).ok()) {
        Some(id) => id,
        None => anyhow::bail!("no miner id given and {} is not set", config::MINER_ID),
    };

    let client = make_client()?;
    let stats = client.get_stats(&miner_id).await?;
    let snapshot = api_client::into_snapshot(stats)?;
    let result = health::classify(&snapshot);

    println!("Miner:    {}", miner_id);
    println!("Sampled:  {}", snapshot.sampled_at);
    println!("Seen:     {}", snapshot.last_seen);
    println!("Workers:  {}", snapshot.active_workers);
    println!("Reported: {}", snapshot.reported_hashrate);
    println!("Current:  {}", snapshot.current_hashrate);
    println!("Average:  {}", snapshot.average_hashrate);
    println!(
        "Shares:   {} valid, {} stale, {} invalid",
        snapshot.valid_shares, snapshot.stale_shares, snapshot.invalid_shares
    );
    println!();
    println!("Health:   {}", result.health);
    println!("          {}", result.message);

    Ok(())
}
