use std::str::FromStr;

use rust_decimal::Decimal;

use crate::entity::BotError;

/// Scales a value down by `decimals` powers of ten (raw amount to human).
pub fn shift_left(num: Decimal, decimals: u32) -> Decimal {
    num * Decimal::new(1, decimals)
}

/// Scales a value up by `decimals` powers of ten (human amount to raw).
pub fn shift_right(num: Decimal, decimals: u32) -> Decimal {
    num / Decimal::new(1, decimals)
}

/// String version of [`shift_left`]; returns the input unchanged when it does
/// not parse as a decimal.
pub fn shift_left_str(num: &str, decimals: u32) -> String {
    match Decimal::from_str(num) {
        Ok(n) => shift_left(n, decimals).normalize().to_string(),
        Err(_) => num.to_string(),
    }
}

/// Converts a human amount to the raw integer string the backend expects.
pub fn parse_token_amount(amount: &str, decimals: u32) -> Result<String, BotError> {
    let amount = Decimal::from_str(amount).map_err(|_| BotError::InvalidAmount)?;
    Ok(shift_right(amount, decimals).trunc().to_string())
}

/// Drops everything after the decimal point.
pub fn cut_point_right(s: &str) -> &str {
    s.split('.').next().unwrap_or(s)
}

/// Block explorer transaction URL for a chain code, if the chain is known.
pub fn chain_scan_url(chain_code: &str, tx: &str) -> Option<String> {
    let base_url = match chain_code.to_uppercase().as_str() {
        "SOLANA" => "https://solscan.io/tx/",
        "BSC" => "https://bscscan.com/tx/",
        "ETH" => "https://etherscan.io/tx/",
        "BASE" => "https://basescan.org/tx/",
        "ARBITRUM" => "https://arbiscan.io/tx/",
        "OPTIMISM" => "https://optimistic.etherscan.io/tx/",
        _ => return None,
    };

    Some(format!("{}{}", base_url, tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_right_scales_human_to_raw() {
        let raw = shift_right(Decimal::from_str("1.5").unwrap(), 9);
        assert_eq!(raw.normalize().to_string(), "1500000000");
    }

    #[test]
    fn shift_left_scales_raw_to_human() {
        let human = shift_left(Decimal::from_str("1500000000").unwrap(), 9);
        assert_eq!(human.normalize().to_string(), "1.5");
    }

    #[test]
    fn shift_left_str_keeps_unparseable_input() {
        assert_eq!(shift_left_str("500", 2), "5");
        assert_eq!(shift_left_str("abc", 2), "abc");
    }

    #[test]
    fn parse_token_amount_truncates_dust() {
        assert_eq!(parse_token_amount("0.1234567891", 6).unwrap(), "123456");
    }

    #[test]
    fn parse_token_amount_rejects_garbage() {
        assert!(matches!(
            parse_token_amount("not-a-number", 6),
            Err(BotError::InvalidAmount)
        ));
    }

    #[test]
    fn cut_point_right_strips_fraction() {
        assert_eq!(cut_point_right("123.456"), "123");
        assert_eq!(cut_point_right("123"), "123");
    }

    #[test]
    fn scan_url_known_and_unknown_chains() {
        assert_eq!(
            chain_scan_url("solana", "abc").as_deref(),
            Some("https://solscan.io/tx/abc")
        );
        assert_eq!(
            chain_scan_url("BSC", "0x1").as_deref(),
            Some("https://bscscan.com/tx/0x1")
        );
        assert_eq!(chain_scan_url("TRON", "abc"), None);
    }
}
