//! Amount handling for confirmed trade intents.
//!
//! The backend wants raw integer amounts scaled by token decimals, while users
//! think in human units or in percentages of their balance. Everything here is
//! `rust_decimal`; floats never touch the money path.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::entity::BotError;
use crate::utils;

/// Raw backend amount plus the human string used in notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapAmounts {
    pub raw_amount: String,
    pub display_amount: String,
}

/// Buy: the human amount is denominated in the from-token and scaled by its
/// decimals.
pub fn buy_amounts(amount: Decimal, from_decimals: u32) -> SwapAmounts {
    let raw = utils::shift_right(amount, from_decimals).normalize();
    SwapAmounts {
        raw_amount: raw.to_string(),
        display_amount: amount.normalize().to_string(),
    }
}

/// Sell a percentage of the wallet's raw balance, truncated to an integer.
/// 100% bypasses the multiplication and sells the exact balance so no dust is
/// left behind.
pub fn sell_percentage_amounts(
    percentage: Decimal,
    balance_raw: &str,
    decimals: u32,
) -> Result<SwapAmounts, BotError> {
    let balance = Decimal::from_str(balance_raw).map_err(|_| BotError::InvalidAmount)?;
    let fraction = percentage / Decimal::ONE_HUNDRED;
    let raw = (balance * fraction).trunc();

    let display_amount = utils::shift_left(raw, decimals).normalize().to_string();

    let raw_amount = if percentage == Decimal::ONE_HUNDRED {
        balance_raw.to_string()
    } else {
        raw.to_string()
    };

    Ok(SwapAmounts {
        raw_amount,
        display_amount,
    })
}

/// Sell an absolute token amount; fails when it exceeds the raw balance.
pub fn sell_amounts(
    amount: Decimal,
    decimals: u32,
    balance_raw: &str,
) -> Result<SwapAmounts, BotError> {
    let raw = utils::shift_right(amount, decimals).trunc();
    let balance = Decimal::from_str(balance_raw).map_err(|_| BotError::InvalidAmount)?;
    if balance < raw {
        return Err(BotError::InsufficientBalance);
    }

    Ok(SwapAmounts {
        raw_amount: raw.normalize().to_string(),
        display_amount: amount.normalize().to_string(),
    })
}
