use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use super::{PollError, TxStatus, TxStatusChecker};

/// Status strategy for the Solana chain family, backed by
/// `getSignatureStatuses` with transaction-history search enabled.
pub struct SolanaStatusChecker {
    client: Client,
    rpc_url: String,
}

impl SolanaStatusChecker {
    pub fn new(client: Client, rpc_url: String) -> Self {
        Self { client, rpc_url }
    }
}

#[async_trait]
impl TxStatusChecker for SolanaStatusChecker {
    async fn check(&self, tx: &str) -> Result<TxStatus, PollError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getSignatureStatuses",
            "params": [
                [tx],
                { "searchTransactionHistory": true }
            ]
        });

        let resp: Value = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(msg) = resp.pointer("/error/message").and_then(Value::as_str) {
            return Err(PollError::Rpc(msg.to_string()));
        }

        let values = resp
            .pointer("/result/value")
            .and_then(Value::as_array)
            .ok_or_else(|| PollError::Rpc("empty response".to_string()))?;
        let status = values
            .first()
            .ok_or_else(|| PollError::Rpc("empty response".to_string()))?;

        if status.is_null() {
            debug!("signature {} not yet visible", tx);
            return Ok(TxStatus::NotFound);
        }

        // A null `err` field means the transaction landed cleanly.
        if status.get("err").map(Value::is_null).unwrap_or(true) {
            Ok(TxStatus::Confirmed)
        } else {
            Ok(TxStatus::Failed)
        }
    }
}
