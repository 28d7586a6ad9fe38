use anyhow::Context;
use olx_phones::config::constants::{AGENTS_FILE, IDS_FILE, PROXIES_FILE, RESULT_FILE};
use olx_phones::engine::WorkerPool;
use olx_phones::feed::{clean_listing_id, read_lines, CsvSink};
use olx_phones::network::{cancel_channel, AccessError};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize Telemetry
    tracing_subscriber::fmt()
        .with_env_filter("olx_phones=debug,info")
        .with_target(false)
        .json()
        .init();

    let proxies = read_lines(PROXIES_FILE).with_context(|| format!("reading {PROXIES_FILE}"))?;
    let user_agents = read_lines(AGENTS_FILE).with_context(|| format!("reading {AGENTS_FILE}"))?;
    let ids = read_lines(IDS_FILE).with_context(|| format!("reading {IDS_FILE}"))?;

    let (cancel_tx, cancel) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    info!(proxies = proxies.len(), ids = ids.len(), "bootstrapping pool");
    let pool = WorkerPool::bootstrap(&proxies, &user_agents, &cancel).await?;
    info!(workers = pool.len(), "pool ready");

    let mut sink =
        CsvSink::create(RESULT_FILE).with_context(|| format!("creating {RESULT_FILE}"))?;

    for raw in &ids {
        let listing_id = clean_listing_id(raw);

        match pool.get_phone(&listing_id, &cancel).await {
            Ok(phone) => {
                let phone = phone.unwrap_or_default();
                sink.append(&listing_id, &phone)?;
                info!(listing = %listing_id, phone = %phone, "resolved");
            }
            Err(err) if err.is_blocked() => {
                // * Keeping going against a blocking endpoint only deepens the
                // * block; surface it and stop the whole run.
                error!(listing = %listing_id, error = %err, "worker blocked, halting the run");
                return Err(err.into());
            }
            Err(AccessError::Cancelled) => {
                warn!("cancelled, stopping");
                break;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("lookup failed for {listing_id}"));
            }
        }
    }

    Ok(())
}
