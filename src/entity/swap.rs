use serde::{Deserialize, Serialize};

/// Trade direction as the backend encodes it: `"0"` is buy, `"1"` is sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    #[serde(rename = "0")]
    Buy,
    #[serde(rename = "1")]
    Sell,
}

impl TradeDirection {
    pub fn is_buy(&self) -> bool {
        matches!(self, TradeDirection::Buy)
    }
}

/// Request body of the backend "submit swap" call.
///
/// `amount` is the raw integer amount already scaled by the from-token
/// decimals; human-readable amounts never cross this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub amount: String,
    pub wallet_id: String,
    pub wallet_key: String,
    pub from_token_address: String,
    pub from_token_decimals: u32,
    pub to_token_address: String,
    pub to_token_decimals: u32,
    pub slippage: String,
    #[serde(rename = "type")]
    pub direction: TradeDirection,
    pub trade_type: String,
    pub price: String,
    pub profit_flag: f64,
}
