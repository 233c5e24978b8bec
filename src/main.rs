//! Trading bot for Telegram - Main executable
//!
//! Wires the swap execution pipeline to its collaborators: the trading
//! backend, the per-chain transaction status checkers, and the Telegram
//! notification sink.
use std::env;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use log::info;
use teloxide::Bot;

use dex_trade_bot::api::HttpTradeApi;
use dex_trade_bot::chain::{ChainRegistry, EvmStatusChecker, PollConfig, SolanaStatusChecker};
use dex_trade_bot::config::Config;
use dex_trade_bot::notify::TelegramNotifier;
use dex_trade_bot::queue::{PipelineConfig, SwapPipeline};
use dex_trade_bot::session::SessionStore;

/// Application entry point
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging with default level of "info"
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    info!("Starting trading bot v{}", dex_trade_bot::VERSION);

    // Load and validate environment variables
    let bot_token = env::var("TELEGRAM_BOT_TOKEN")
        .context("TELEGRAM_BOT_TOKEN must be set in environment variables")?;

    let backend_api_url = env::var("BACKEND_API_URL")
        .context("BACKEND_API_URL must be set in environment variables")?;

    let config = Config::from_env();

    // One HTTP client for the backend and both RPC endpoints; the timeout
    // bounds every outbound call so a hung backend cannot stall a worker.
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let api = Arc::new(HttpTradeApi::new(http_client.clone(), backend_api_url));

    let mut chains = ChainRegistry::new(PollConfig {
        max_retries: config.poll_max_retries,
        interval: config.poll_interval,
    });
    chains.register(
        "SOLANA",
        Arc::new(SolanaStatusChecker::new(
            http_client.clone(),
            config.solana_rpc_url.clone(),
        )),
    );
    chains.register(
        "BSC",
        Arc::new(EvmStatusChecker::new(
            http_client,
            config.bsc_rpc_url.clone(),
        )),
    );

    let bot = Bot::new(bot_token);
    let notifier = Arc::new(TelegramNotifier::new(bot));
    let sessions = Arc::new(SessionStore::new());

    let pipeline = SwapPipeline::new(
        PipelineConfig {
            queue_capacity: config.queue_capacity,
            worker_count: config.worker_count,
            enqueue_grace: config.enqueue_grace,
            settle_delay: config.settle_delay,
        },
        api,
        Arc::new(chains),
        notifier,
        sessions,
    );

    pipeline.start();
    info!(
        "Swap pipeline running with {} workers. Press Ctrl+C to stop.",
        config.worker_count
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutting down swap pipeline...");
    pipeline.shutdown();

    Ok(())
}
