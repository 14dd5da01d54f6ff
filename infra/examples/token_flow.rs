//! Token lifecycle demo
//!
//! Issues a one-week token for user 1234, verifies it, refreshes it and shows
//! that the old token is revoked afterwards.
//!
//! Uses Redis at `APP__CACHE__URL` / `REDIS_URL` when reachable and an
//! in-memory store otherwise.
//!
//! Run with: cargo run -p st_infra --example token_flow

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use st_core::repositories::{MemoryRevocationStore, RevocationStore};
use st_core::{TokenError, TokenService, TokenServiceConfig};
use st_infra::cache::{CacheConfig, RedisRevocationStore};
use st_infra::{load_config, telemetry};

const USER_ID: i64 = 1234;
const ONE_WEEK: Duration = Duration::from_secs(7 * 24 * 3600);

async fn revocation_store(config: CacheConfig) -> Arc<dyn RevocationStore> {
    let fast_fail = config.with_retries(1, 0);
    match RedisRevocationStore::connect(fast_fail).await {
        Ok(store) => {
            println!("Using Redis revocation store");
            Arc::new(store)
        }
        Err(e) => {
            println!("Redis unavailable ({}), using in-memory revocation store", e);
            Arc::new(MemoryRevocationStore::new())
        }
    }
}

fn describe(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging).context("Failed to initialise tracing")?;

    let store = revocation_store(config.cache.clone()).await;
    let service = TokenService::new(store, TokenServiceConfig::from(&config.token))
        .context("Invalid token configuration")?;

    // Issue
    let token = service.issue(USER_ID, Some(ONE_WEEK))?;
    println!("\nIssued token:\n{}", token);

    // Verify
    let payload = service.decode(&token).await?;
    println!(
        "\nDecoded: user {} issued at {} expires at {}",
        payload.user_info.id,
        describe(payload.user_info.time),
        describe(payload.exp)
    );

    // Refresh; tokens minted within the same second would be identical
    tokio::time::sleep(Duration::from_secs(1)).await;
    let refreshed = service.refresh(&token, ONE_WEEK, None).await?;
    println!("\nRefreshed token:\n{}", refreshed);

    let payload = service.decode(&refreshed).await?;
    println!("Refreshed token expires at {}", describe(payload.exp));

    // The old token is spent
    match service.decode(&token).await {
        Err(TokenError::Revoked) => println!("\nOld token rejected: revoked"),
        Err(e) => println!("\nOld token rejected: {}", e),
        Ok(_) => println!("\nOld token unexpectedly still valid"),
    }

    match service.refresh(&token, ONE_WEEK, None).await {
        Err(e) => println!("Second refresh of old token failed: {} ({})", e, e.code()),
        Ok(_) => println!("Second refresh of old token unexpectedly succeeded"),
    }

    // Logout
    service.revoke(&refreshed, None).await?;
    println!(
        "Refreshed token revoked on logout: {}",
        service.is_revoked(&refreshed).await?
    );

    Ok(())
}
