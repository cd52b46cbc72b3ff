//! Pairing bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p waifu-gateway --bin waifu-bot
//! ```
//!
//! Configuration is loaded from environment variables.

use tracing::{error, info};
use waifu_common::{
    try_init_tracing_with_config, AppConfig, AppResult, Environment, TracingConfig,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Pick the log format before anything else can fail
    let env = match std::env::var("APP_ENV").as_deref() {
        Ok("production") => Environment::Production,
        Ok("staging") => Environment::Staging,
        _ => Environment::Development,
    };
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_env(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(code = e.error_code(), fatal = e.is_fatal(), error = %e, "Bot stopped");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    info!("Starting waifu bot...");

    let config = AppConfig::from_env()?;

    info!(
        env = ?config.app.env,
        endpoint = %config.satori.endpoint,
        redis = config.redis.is_some(),
        avoid_ntr = config.waifu.avoid_ntr,
        only_active_user = config.waifu.only_active_user,
        force_marry = config.waifu.force_marry,
        reset_time = %config.waifu.reset_time,
        "Configuration loaded"
    );

    waifu_gateway::run(config).await
}
