/// Domain types for balance conversion
/// All amounts are exact: integers in wei, arbitrary-precision decimals above that
use crate::error::FetchError;
use alloy::primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 1 ether = 10^18 wei
pub const WEI_DECIMALS: i64 = 18;

/// Decimal places used when presenting balances and converted values
pub const AMOUNT_DISPLAY_PLACES: i64 = 4;

/// Decimal places used when presenting a conversion rate
pub const RATE_DISPLAY_PLACES: i64 = 2;

/// Largest QUANTITY the node can return: 256 bits
const MAX_HEX_DIGITS: usize = 64;

/// Account to query. The address is passed to the node as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BalanceQuery {
    pub address: String,
}

impl BalanceQuery {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Balance in wei as returned by `eth_getBalance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RawBalance(U256);

impl RawBalance {
    pub const ZERO: Self = Self(U256::ZERO);

    pub const fn new(wei: U256) -> Self {
        Self(wei)
    }

    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Decode a `0x`-prefixed hexadecimal QUANTITY.
    ///
    /// Anything other than a prefix followed by 1..=64 significant hex digits
    /// is a decode error; a malformed payload never becomes zero.
    pub fn from_hex(hex: &str) -> Result<Self, FetchError> {
        let digits = hex
            .strip_prefix("0x")
            .or_else(|| hex.strip_prefix("0X"))
            .ok_or_else(|| FetchError::decode(format!("Balance is missing 0x prefix: {hex:?}")))?;

        if digits.is_empty() {
            return Err(FetchError::decode("Balance has no hex digits"));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FetchError::decode(format!(
                "Balance contains non-hex characters: {hex:?}"
            )));
        }

        let significant = digits.trim_start_matches('0');
        if significant.len() > MAX_HEX_DIGITS {
            return Err(FetchError::decode("Balance exceeds 256 bits"));
        }
        if significant.is_empty() {
            return Ok(Self::ZERO);
        }

        U256::from_str_radix(significant, 16)
            .map(Self)
            .map_err(|e| FetchError::decode(format!("Balance is not a valid integer: {e}")))
    }

    /// Exact conversion into ether
    pub fn to_scaled(&self) -> ScaledBalance {
        ScaledBalance::from_raw(*self)
    }
}

impl fmt::Display for RawBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Balance in ether, exactly `wei × 10^-18`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScaledBalance(BigDecimal);

impl ScaledBalance {
    pub fn from_raw(raw: RawBalance) -> Self {
        let digits = BigInt::from_bytes_be(Sign::Plus, &raw.0.to_be_bytes::<32>());
        Self(BigDecimal::new(digits, WEI_DECIMALS))
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    /// Back to wei. `None` if the value is negative, fractional in wei, or too large.
    pub fn to_raw(&self) -> Option<RawBalance> {
        let wei = &self.0 * &BigDecimal::new(BigInt::from(1), -WEI_DECIMALS);
        let integral = wei.with_scale(0);
        if integral != wei {
            return None;
        }
        let (digits, _) = integral.into_bigint_and_exponent();
        U256::from_str(&digits.to_string()).ok().map(RawBalance)
    }

    /// Value of this balance at `rate`, computed in decimal
    pub fn convert(&self, rate: &ConversionRate) -> BigDecimal {
        &self.0 * &rate.0
    }

    pub fn display_rounded(&self) -> BigDecimal {
        round_half_even(&self.0, AMOUNT_DISPLAY_PLACES)
    }
}

impl fmt::Display for ScaledBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price of one base unit in the quote currency. Always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversionRate(BigDecimal);

impl ConversionRate {
    pub fn new(rate: BigDecimal) -> Result<Self, FetchError> {
        if rate <= BigDecimal::from(0) {
            return Err(FetchError::decode(format!(
                "Conversion rate must be positive, got {rate}"
            )));
        }
        Ok(Self(rate))
    }

    /// Parse a JSON number from its original text (serde_json `arbitrary_precision`)
    pub fn from_json_number(number: &serde_json::Number) -> Result<Self, FetchError> {
        let text = number.to_string();
        let rate = BigDecimal::from_str(&text)
            .map_err(|e| FetchError::decode(format!("Price {text} is not a decimal: {e}")))?;
        Self::new(rate)
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn display_rounded(&self) -> BigDecimal {
        round_half_even(&self.0, RATE_DISPLAY_PLACES)
    }
}

impl FromStr for ConversionRate {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = BigDecimal::from_str(s)
            .map_err(|e| FetchError::decode(format!("Rate {s:?} is not a decimal: {e}")))?;
        Self::new(rate)
    }
}

impl fmt::Display for ConversionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A balance valued in the quote currency. Derived from one balance and one rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedBalance {
    pub address: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    pub balance: ScaledBalance,
    pub rate: ConversionRate,
    pub value: BigDecimal,
    pub fetched_at: DateTime<Utc>,
}

impl ConvertedBalance {
    pub fn compose(
        query: &BalanceQuery,
        base_symbol: &str,
        quote_symbol: &str,
        balance: ScaledBalance,
        rate: ConversionRate,
    ) -> Self {
        let value = balance.convert(&rate);
        Self {
            address: query.address.clone(),
            base_symbol: base_symbol.to_string(),
            quote_symbol: quote_symbol.to_string(),
            balance,
            rate,
            value,
            fetched_at: Utc::now(),
        }
    }

    pub fn display_value(&self) -> BigDecimal {
        round_half_even(&self.value, AMOUNT_DISPLAY_PLACES)
    }
}

/// Round to `places` decimal places, ties to even
pub fn round_half_even(value: &BigDecimal, places: i64) -> BigDecimal {
    value.with_scale_round(places, RoundingMode::HalfEven)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_decode_one_ether() {
        let raw = RawBalance::from_hex("0xde0b6b3a7640000").unwrap();
        assert_eq!(raw.as_u256(), U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(raw.to_scaled().as_decimal(), &dec("1"));
        assert_eq!(raw.to_scaled().as_decimal(), &dec("1.0"));
    }

    #[test]
    fn test_decode_zero() {
        assert_eq!(RawBalance::from_hex("0x0").unwrap(), RawBalance::ZERO);
        assert_eq!(RawBalance::from_hex("0x0000").unwrap(), RawBalance::ZERO);
    }

    #[test]
    fn test_decode_matches_integer_for_sample_values() {
        for n in [1u128, 15, 255, 4096, 1_500_000_000_000_000_000, u64::MAX as u128 + 1] {
            let hex = format!("0x{n:x}");
            let raw = RawBalance::from_hex(&hex).unwrap();
            assert_eq!(raw.as_u256(), U256::from(n), "decoding {hex}");
        }
    }

    #[test]
    fn test_decode_uppercase_digits() {
        let raw = RawBalance::from_hex("0xDE0B6B3A7640000").unwrap();
        assert_eq!(raw.as_u256(), U256::from(1_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        for bad in ["", "0x", "de0b6b3a7640000", "0xzz", "0x12g4", "0x-1", "0x 1", "1234"] {
            let result = RawBalance::from_hex(bad);
            assert!(
                matches!(result, Err(FetchError::Decode { .. })),
                "expected decode error for {bad:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_values_wider_than_256_bits() {
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert!(RawBalance::from_hex(&too_wide).unwrap_err().is_decode());

        let max = format!("0x{}", "f".repeat(64));
        assert_eq!(RawBalance::from_hex(&max).unwrap().as_u256(), U256::MAX);

        let padded = format!("0x{}1", "0".repeat(80));
        assert_eq!(RawBalance::from_hex(&padded).unwrap().as_u256(), U256::from(1));
    }

    #[test]
    fn test_scale_is_exact_for_fractional_balances() {
        let raw = RawBalance::new(U256::from(1_234_567_890_123_456_789u128));
        assert_eq!(raw.to_scaled().as_decimal(), &dec("1.234567890123456789"));

        let one_wei = RawBalance::new(U256::from(1));
        assert_eq!(one_wei.to_scaled().as_decimal(), &dec("0.000000000000000001"));
    }

    #[test]
    fn test_round_trip_large_balance() {
        // 10^30 wei and a value with every digit significant
        let values = [
            U256::from(10u8).pow(U256::from(30)),
            U256::from_str("1234567890123456789012345678901").unwrap(),
            U256::MAX,
        ];
        for wei in values {
            let scaled = RawBalance::new(wei).to_scaled();
            assert_eq!(scaled.to_raw(), Some(RawBalance::new(wei)));
        }
        let million = RawBalance::new(U256::from(10u8).pow(U256::from(30))).to_scaled();
        assert_eq!(million.as_decimal(), &dec("1000000000000"));
    }

    #[test]
    fn test_to_raw_rejects_sub_wei_fractions() {
        let scaled = ScaledBalance(dec("0.0000000000000000001"));
        assert_eq!(scaled.to_raw(), None);

        let negative = ScaledBalance(dec("-1"));
        assert_eq!(negative.to_raw(), None);
    }

    #[test]
    fn test_convert_two_ether_at_three_thousand() {
        let balance = RawBalance::new(U256::from(2_000_000_000_000_000_000u128)).to_scaled();
        let rate = ConversionRate::from_str("3000.00").unwrap();
        assert_eq!(balance.convert(&rate), dec("6000.00"));
        assert_eq!(balance.convert(&rate), dec("6000"));
    }

    #[test]
    fn test_convert_has_no_float_drift() {
        // 0.1 + 0.2 style inputs that drift under f64
        let balance = ScaledBalance(dec("0.3"));
        let rate = ConversionRate::from_str("0.1").unwrap();
        assert_eq!(balance.convert(&rate), dec("0.03"));
    }

    #[test]
    fn test_rate_must_be_positive() {
        assert!(ConversionRate::from_str("0").unwrap_err().is_decode());
        assert!(ConversionRate::from_str("-12.5").unwrap_err().is_decode());
        assert!(ConversionRate::from_str("abc").unwrap_err().is_decode());
        assert!(ConversionRate::from_str("2456.789").is_ok());
    }

    #[test]
    fn test_rate_from_json_number() {
        let number: serde_json::Number = serde_json::from_str("2456.123456").unwrap();
        let rate = ConversionRate::from_json_number(&number).unwrap();
        assert_eq!(rate.as_decimal(), &dec("2456.123456"));

        let number: serde_json::Number = serde_json::from_str("3000").unwrap();
        let rate = ConversionRate::from_json_number(&number).unwrap();
        assert_eq!(rate.as_decimal(), &dec("3000"));

        let number: serde_json::Number = serde_json::from_str("0").unwrap();
        assert!(ConversionRate::from_json_number(&number).is_err());
    }

    #[test]
    fn test_rate_from_json_number_keeps_every_digit() {
        let number: serde_json::Number = serde_json::from_str("2456.12345678901234567").unwrap();
        let rate = ConversionRate::from_json_number(&number).unwrap();
        assert_eq!(rate.as_decimal(), &dec("2456.12345678901234567"));
        assert_eq!(rate.to_string(), "2456.12345678901234567");
    }

    #[test]
    fn test_display_rounding_is_half_even() {
        assert_eq!(round_half_even(&dec("1.00005"), 4), dec("1.0000"));
        assert_eq!(round_half_even(&dec("1.00015"), 4), dec("1.0002"));
        assert_eq!(round_half_even(&dec("6000"), 4).to_string(), "6000.0000");

        let rate = ConversionRate::from_str("2456.125").unwrap();
        assert_eq!(rate.display_rounded().to_string(), "2456.12");
    }

    #[test]
    fn test_converted_balance_compose() {
        let query = BalanceQuery::new("0x742d35Cc6634C0532925a3b8D8b5d0f8988Db8c7");
        let balance = RawBalance::from_hex("0x1bc16d674ec80000").unwrap().to_scaled();
        let rate = ConversionRate::from_str("3000.00").unwrap();

        let converted = ConvertedBalance::compose(&query, "ETH", "USDT", balance.clone(), rate);
        assert_eq!(converted.address, query.address);
        assert_eq!(converted.base_symbol, "ETH");
        assert_eq!(converted.quote_symbol, "USDT");
        assert_eq!(converted.balance, balance);
        assert_eq!(converted.value, dec("6000"));
        assert_eq!(converted.display_value().to_string(), "6000.0000");
    }

    #[test]
    fn test_converted_balance_serializes_decimals() {
        let query = BalanceQuery::new("0xabc");
        let balance = RawBalance::from_hex("0xde0b6b3a7640000").unwrap().to_scaled();
        let rate = ConversionRate::from_str("2500.5").unwrap();
        let converted = ConvertedBalance::compose(&query, "ETH", "USDT", balance, rate);

        let json = serde_json::to_value(&converted).unwrap();
        assert_eq!(json["address"], "0xabc");
        assert_eq!(json["quote_symbol"], "USDT");
        assert!(json["value"].is_string() || json["value"].is_number());
        assert!(json["fetched_at"].is_string());
    }
}
