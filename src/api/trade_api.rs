use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::entity::{BotError, Position, SwapRequest, UserProfile};

/// Backend body code for a successful call.
const CODE_OK: i64 = 200;
/// Backend body code for "call accepted, trade declined, tell the user".
/// Distinct from a hard failure: nothing happened on-chain.
const CODE_SOFT_REJECT: i64 = 102;

/// Outcome of a backend swap submission.
#[derive(Debug, Clone)]
pub enum SwapSubmitOutcome {
    /// The backend placed the swap; `tx` is the on-chain reference to poll.
    Accepted { tx: String },
    /// The backend declined the trade with a user-facing message.
    SoftReject { message: String },
}

/// The trading backend REST API, as consumed by the swap pipeline.
#[async_trait]
pub trait TradeApi: Send + Sync {
    async fn submit_swap(
        &self,
        swap: &SwapRequest,
        profile: &UserProfile,
    ) -> Result<SwapSubmitOutcome, BotError>;

    async fn get_position(
        &self,
        wallet_address: &str,
        token_address: &str,
        chain_code: &str,
        profile: &UserProfile,
    ) -> Result<Position, BotError>;
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SwapData {
    #[serde(default)]
    tx: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainConfig {
    #[serde(default)]
    wrapped: String,
    #[serde(default)]
    symbol_address: String,
}

/// [`TradeApi`] over the backend's HTTP endpoints.
pub struct HttpTradeApi {
    client: Client,
    base_url: String,
}

impl HttpTradeApi {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// The backend rejects wrapped native addresses; swaps must carry the
    /// chain's symbol address instead.
    async fn wrapped_address_map(
        &self,
        profile: &UserProfile,
    ) -> Result<HashMap<String, String>, BotError> {
        let resp: ApiEnvelope<Vec<ChainConfig>> = self
            .client
            .post(format!("{}/api/appv2/getChainConfigs", self.base_url))
            .bearer_auth(&profile.token_value)
            .json(&json!({}))
            .send()
            .await?
            .json()
            .await?;

        let chains = resp.data.unwrap_or_default();
        Ok(chains
            .into_iter()
            .map(|c| (c.wrapped.to_lowercase(), c.symbol_address.to_lowercase()))
            .collect())
    }
}

#[async_trait]
impl TradeApi for HttpTradeApi {
    async fn submit_swap(
        &self,
        swap: &SwapRequest,
        profile: &UserProfile,
    ) -> Result<SwapSubmitOutcome, BotError> {
        let mut swap = swap.clone();

        let address_map = self.wrapped_address_map(profile).await.map_err(|e| {
            error!("failed to load chain configs: {}", e);
            BotError::BackendSubmit("failed to load chain configs".to_string())
        })?;
        if let Some(a) = address_map.get(&swap.from_token_address.to_lowercase()) {
            swap.from_token_address = a.clone();
        }
        if let Some(a) = address_map.get(&swap.to_token_address.to_lowercase()) {
            swap.to_token_address = a.clone();
        }

        debug!(
            "submitting swap: wallet={} from={} to={} amount={}",
            swap.wallet_id, swap.from_token_address, swap.to_token_address, swap.amount
        );

        let resp = self
            .client
            .post(format!("{}/api/auth/trade/swap", self.base_url))
            .bearer_auth(&profile.token_value)
            .json(&swap)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BotError::BackendSubmit(format!(
                "backend returned {}",
                resp.status()
            )));
        }

        let body: ApiEnvelope<SwapData> = resp.json().await?;
        match body.code {
            CODE_SOFT_REJECT => Ok(SwapSubmitOutcome::SoftReject { message: body.msg }),
            CODE_OK => {
                let tx = body.data.map(|d| d.tx).unwrap_or_default();
                if tx.is_empty() {
                    return Err(BotError::BackendSubmit(
                        "missing transaction reference".to_string(),
                    ));
                }
                Ok(SwapSubmitOutcome::Accepted { tx })
            }
            code => Err(BotError::BackendSubmit(format!(
                "code {}: {}",
                code, body.msg
            ))),
        }
    }

    async fn get_position(
        &self,
        wallet_address: &str,
        token_address: &str,
        chain_code: &str,
        profile: &UserProfile,
    ) -> Result<Position, BotError> {
        let request_body = json!({
            "walletAddress": wallet_address,
            "baseAddress": token_address,
            "chainCode": chain_code,
        });

        let resp: ApiEnvelope<Position> = self
            .client
            .post(format!(
                "{}/api/auth/order/getPositionByWalletAddress",
                self.base_url
            ))
            .bearer_auth(&profile.token_value)
            .json(&request_body)
            .send()
            .await?
            .json()
            .await?;

        if resp.code != CODE_OK {
            return Err(BotError::BackendSubmit(format!(
                "code {}: {}",
                resp.code, resp.msg
            )));
        }

        resp.data
            .ok_or_else(|| BotError::BackendSubmit("empty position response".to_string()))
    }
}
