use crate::entity::{SwapRequest, TokenMeta, UserProfile, Wallet};

/// Phase of a swap job; drives worker dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStatus {
    Processing,
    Success,
    Failed,
}

/// One user trade intent moving through the swap pipeline.
///
/// A job is owned by exactly one worker at a time; `status` is only mutated
/// between phases and `tx` only once the backend has accepted the swap.
#[derive(Debug, Clone)]
pub struct SwapJob {
    pub status: SwapStatus,
    pub request: SwapRequest,
    /// The signing wallet used for the trade.
    pub wallet: Wallet,
    /// Token metadata cached for notification rendering.
    pub base_token: TokenMeta,
    pub quote_token: TokenMeta,
    /// Chat the job's notifications route to.
    pub chat_id: i64,
    /// Profile snapshot taken at submission time.
    pub profile: UserProfile,
    /// On-chain transaction reference, set after backend acceptance.
    pub tx: Option<String>,
    /// Human amount string, already adjusted for percentage sells.
    pub display_amount: String,
}
