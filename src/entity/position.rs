use serde::{Deserialize, Serialize};

/// A user's position in one token, as returned by the backend position lookup.
/// The backend ships all numeric fields as pre-formatted strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    #[serde(default)]
    pub chain_code: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub average_price: String,
    #[serde(default)]
    pub total_earn: String,
    #[serde(default)]
    pub total_earn_rate: String,
}
