use std::env;
use std::time::Duration;

/// Runtime configuration for the bot and the swap pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Solana JSON-RPC endpoint used for signature status polling
    pub solana_rpc_url: String,

    /// BSC JSON-RPC endpoint used for receipt polling
    pub bsc_rpc_url: String,

    /// Client-side bound on every outbound HTTP call
    pub http_timeout: Duration,

    /// Capacity of the bounded swap job queue
    pub queue_capacity: usize,

    /// Number of pipeline workers
    pub worker_count: usize,

    /// How long a submission may wait for queue space before failing
    pub enqueue_grace: Duration,

    /// Pause before refreshing the position after a confirmed trade
    pub settle_delay: Duration,

    /// Confirmation poller retry budget
    pub poll_max_retries: u32,

    /// Delay between confirmation poll attempts
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            bsc_rpc_url: "https://bsc-dataseed.binance.org".to_string(),
            http_timeout: Duration::from_secs(30),
            queue_capacity: 1024,
            worker_count: 5,
            enqueue_grace: Duration::from_millis(100),
            settle_delay: Duration::from_secs(3),
            poll_max_retries: 10,
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl Config {
    /// Builds the configuration from environment variables, falling back to
    /// the defaults above for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            solana_rpc_url: env::var("SOLANA_RPC_URL").unwrap_or(defaults.solana_rpc_url),
            bsc_rpc_url: env::var("BSC_RPC_URL").unwrap_or(defaults.bsc_rpc_url),
            http_timeout: Duration::from_secs(env_u64("HTTP_TIMEOUT_SECS", 30)),
            queue_capacity: env_u64("SWAP_QUEUE_CAPACITY", 1024) as usize,
            worker_count: env_u64("SWAP_WORKER_COUNT", 5) as usize,
            enqueue_grace: Duration::from_millis(env_u64("SWAP_ENQUEUE_GRACE_MS", 100)),
            settle_delay: Duration::from_secs(env_u64("SWAP_SETTLE_DELAY_SECS", 3)),
            poll_max_retries: env_u64("POLL_MAX_RETRIES", 10) as u32,
            poll_interval: Duration::from_secs(env_u64("POLL_INTERVAL_SECS", 2)),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
