use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use super::{PollError, TxStatus, TxStatusChecker};

/// Status strategy for EVM chains (BSC and friends), backed by
/// `eth_getTransactionReceipt`.
pub struct EvmStatusChecker {
    client: Client,
    rpc_url: String,
}

impl EvmStatusChecker {
    pub fn new(client: Client, rpc_url: String) -> Self {
        Self { client, rpc_url }
    }
}

#[async_trait]
impl TxStatusChecker for EvmStatusChecker {
    async fn check(&self, tx: &str) -> Result<TxStatus, PollError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getTransactionReceipt",
            "params": [tx]
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

        let receipt = resp.get("result").unwrap_or(&Value::Null);
        if receipt.is_null() {
            debug!("receipt for {} not yet visible", tx);
            return Ok(TxStatus::NotFound);
        }

        match receipt.get("status").and_then(Value::as_str) {
            Some("0x1") => Ok(TxStatus::Confirmed),
            _ => Ok(TxStatus::Failed),
        }
    }
}
