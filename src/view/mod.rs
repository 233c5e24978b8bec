//! Message text rendering for pipeline notifications.

use crate::entity::{Position, SwapJob};
use crate::utils;

/// Support contact appended to failure notifications.
pub const SUPPORT_URL: &str = r#"<a href="https://t.me/dex_trade_support">Contact support</a>"#;

/// "Confirming on-chain" notice, with an explorer link when the chain is known.
pub fn pending_text(chain_code: &str, tx: &str) -> String {
    match explorer_link(chain_code, tx) {
        Some(link) => format!("⏳ Confirming on-chain {}", link),
        None => "⏳ Confirming on-chain".to_string(),
    }
}

pub fn trade_success_text(job: &SwapJob) -> String {
    let base = &job.base_token.symbol;
    if job.request.direction.is_buy() {
        format!(
            "✅ {} buy {} {}, trade succeeded, ",
            base, job.display_amount, job.quote_token.symbol
        )
    } else {
        format!(
            "✅ {} sell {} {}, trade succeeded, ",
            base, job.display_amount, base
        )
    }
}

pub fn trade_failed_text(job: &SwapJob) -> String {
    let base = &job.base_token.symbol;
    if job.request.direction.is_buy() {
        format!(
            "❌ {} buy {} {}, trade failed, ",
            base, job.display_amount, job.quote_token.symbol
        )
    } else {
        format!(
            "❌ {} sell {} {}, trade failed, ",
            base, job.display_amount, base
        )
    }
}

/// HTML anchor to the chain explorer, if the chain is known.
pub fn explorer_link(chain_code: &str, tx: &str) -> Option<String> {
    utils::chain_scan_url(chain_code, tx)
        .map(|url| format!(r#"<a href="{}">View on explorer</a>"#, url))
}

/// Compact HTML view of a refreshed position, sent and pinned after a
/// successful trade.
pub fn render_position(position: &Position) -> String {
    format!(
        "<b>{symbol}</b> ({chain})\n\
         Price: ${price}\n\
         Holding: {amount} (${volume})\n\
         Avg entry: ${average}\n\
         PnL: {earn} ({rate}%)",
        symbol = position.symbol,
        chain = position.chain_code,
        price = position.price,
        amount = position.amount,
        volume = position.volume,
        average = position.average_price,
        earn = position.total_earn,
        rate = position.total_earn_rate,
    )
}
