mod evm;
mod solana;

pub use evm::EvmStatusChecker;
pub use solana::SolanaStatusChecker;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::time::sleep;

/// Outcome of a single transaction status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Finalized on chain.
    Confirmed,
    /// Not yet visible to the RPC node; worth another look.
    NotFound,
    /// Landed on chain but reverted/errored.
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("transaction failed on-chain")]
    OnChainFailure,

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Still confirming on-chain, please check your trade history for the result")]
    MaxRetriesExceeded,
}

/// One status query against a chain's RPC endpoint.
#[async_trait]
pub trait TxStatusChecker: Send + Sync {
    async fn check(&self, tx: &str) -> Result<TxStatus, PollError>;
}

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub max_retries: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            interval: Duration::from_secs(2),
        }
    }
}

/// Maps chain codes to their status-check strategy and runs the bounded
/// confirmation poll loop.
pub struct ChainRegistry {
    checkers: HashMap<String, Arc<dyn TxStatusChecker>>,
    config: PollConfig,
}

impl ChainRegistry {
    pub fn new(config: PollConfig) -> Self {
        Self {
            checkers: HashMap::new(),
            config,
        }
    }

    pub fn register(&mut self, chain_code: &str, checker: Arc<dyn TxStatusChecker>) {
        self.checkers.insert(chain_code.to_uppercase(), checker);
    }

    /// Blocks until the transaction is confirmed or the retry budget runs out.
    ///
    /// Occupies the calling task for up to `max_retries` x `interval`.
    pub async fn poll_transaction(&self, chain_code: &str, tx: &str) -> Result<(), PollError> {
        debug!("polling transaction status: chain={} tx={}", chain_code, tx);

        let checker = self
            .checkers
            .get(&chain_code.to_uppercase())
            .ok_or_else(|| PollError::UnsupportedChain(chain_code.to_string()))?;

        for attempt in 1..=self.config.max_retries {
            match checker.check(tx).await? {
                TxStatus::Confirmed => {
                    info!("transaction {} confirmed", tx);
                    return Ok(());
                }
                TxStatus::Failed => return Err(PollError::OnChainFailure),
                TxStatus::NotFound => {
                    debug!(
                        "transaction {} not found, attempt {}, retrying...",
                        tx, attempt
                    );
                }
            }

            sleep(self.config.interval).await;
        }

        debug!(
            "transaction {} not confirmed after {} attempts",
            tx, self.config.max_retries
        );
        Err(PollError::MaxRetriesExceeded)
    }
}
