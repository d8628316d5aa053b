use anyhow::{Context, Result};
use ircprobe::config::{self, token::random_token};
use ircprobe::{logging, SessionRegistry};
use std::path::PathBuf;
use tracing::{error, info};

/// Smoke check against the configured server: register a client, answer
/// keepalives, and verify a client-initiated PING round trip.
///
/// Usage: `ircprobe [config.toml]`
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = config::load_config(path.as_deref())?;
    logging::init(&cfg.logging);

    let endpoint = cfg.server.endpoint();
    info!("Probing {}", endpoint);

    let mut registry = SessionRegistry::new(cfg);
    let result = smoke_check(&mut registry).await;
    registry.close_all().await;

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    println!("{}: registration and PING/PONG OK", endpoint);
    Ok(())
}

async fn smoke_check(registry: &mut SessionRegistry) -> Result<()> {
    let nick = random_token();
    registry
        .open(&nick)
        .await
        .with_context(|| format!("Registration of {} failed", nick))?;
    registry
        .ping(&nick, &format!("LAG{}", random_token()))
        .await
        .context("PING round trip failed")?;
    Ok(())
}
