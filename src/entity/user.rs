use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A user wallet as the backend reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub wallet_id: String,
    pub wallet_key: String,
    #[serde(rename = "wallet")]
    pub address: String,
    pub chain_code: String,
}

/// Snapshot of the user profile taken when the trade is confirmed, so the
/// pipeline never has to re-fetch it mid-flight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uuid: String,
    /// Bearer token for authenticated backend calls.
    pub token_value: String,
    #[serde(default)]
    pub slippage: String,
    #[serde(default)]
    pub tg_default_wallet_id: String,
    /// Wallets keyed by chain code.
    #[serde(default)]
    pub wallets: HashMap<String, Vec<Wallet>>,
}

impl UserProfile {
    /// Chain code of the wallet that signs the trade, resolved by wallet id.
    pub fn chain_code_for_wallet(&self, wallet_id: &str) -> Option<String> {
        for wallets in self.wallets.values() {
            for wallet in wallets {
                if wallet.wallet_id == wallet_id {
                    return Some(wallet.chain_code.clone());
                }
            }
        }
        None
    }
}
