mod trade_api;

pub use trade_api::{HttpTradeApi, SwapSubmitOutcome, TradeApi};
