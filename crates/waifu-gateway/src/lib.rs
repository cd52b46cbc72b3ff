//! # waifu-gateway
//!
//! Satori adapter for the pairing bot: the HTTP client used for member
//! lists and replies, the event WebSocket, command parsing, reply
//! rendering, and the dispatcher that routes events into the services.

pub mod client;
pub mod commands;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod render;

pub use client::{SatoriBot, SatoriClient};
pub use commands::{Command, CommandParser};
pub use connection::EventStream;
pub use dispatcher::Dispatcher;
pub use error::{SatoriError, SatoriResult};
pub use protocol::{Event, EventType, OpCode, Signal};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use waifu_cache::{MemoryCache, RedisPool, SharedCache};
use waifu_common::{AppConfig, AppError, AppResult};
use waifu_service::{DailyReset, ServiceContextBuilder};

/// Events buffered between the socket reader and the dispatcher
const EVENT_BUFFER: usize = 256;

/// How often the in-memory cache drops expired entries
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Pick the directory cache backend from configuration
pub async fn build_cache(config: &AppConfig) -> AppResult<SharedCache> {
    match &config.redis {
        Some(redis) => {
            let pool = RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
            if let Err(e) = pool.health_check().await {
                tracing::warn!(error = %e, "Redis health check failed; continuing");
            }
            Ok(Arc::new(pool))
        }
        None => {
            tracing::info!("No REDIS_URL configured, using in-memory directory cache");
            let cache = Arc::new(MemoryCache::new());
            cache.spawn_sweeper(CACHE_SWEEP_INTERVAL);
            Ok(cache)
        }
    }
}

/// Run the bot until the event stream ends
pub async fn run(config: AppConfig) -> AppResult<()> {
    let cache = build_cache(&config).await?;
    let ctx = ServiceContextBuilder::new()
        .cache(cache)
        .config(config.waifu.clone())
        .build()
        .map_err(AppError::from)?;

    let reset = DailyReset::new(config.waifu.reset_time).spawn(ctx.relationships_handle());

    let client = SatoriClient::new(&config.satori).map_err(AppError::from)?;
    let parser = CommandParser::new(&config.waifu.command_prefix, config.waifu.force_marry);
    let dispatcher = Dispatcher::new(ctx, client, parser);

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let stream = EventStream::new(config.satori.clone()).spawn(tx);

    tracing::info!(name = %config.app.name, "Bot started");
    while let Some(event) = rx.recv().await {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher.handle(event).await;
        });
    }

    reset.abort();
    stream.abort();
    Err(AppError::Gateway("event stream closed".to_string()))
}
