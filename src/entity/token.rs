use serde::{Deserialize, Serialize};

/// Token metadata as returned by the backend; used for message rendering only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMeta {
    #[serde(default)]
    pub name: String,
    pub symbol: String,
    pub address: String,
    /// The backend ships decimals as a string.
    #[serde(default)]
    pub decimals: String,
    #[serde(default)]
    pub chain_code: String,
}
