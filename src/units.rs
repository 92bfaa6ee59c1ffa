//! Ether denominations and gas price conversion
//!
//! Gas prices are written in human units (`"200 gwei"`) and stored in wei,
//! so nothing downstream has to guess which unit a number is in.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ether denomination with its power-of-ten exponent relative to wei
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Wei,
    Kwei,
    Mwei,
    Gwei,
    Szabo,
    Finney,
    Ether,
}

impl Unit {
    /// Number of decimal places between this unit and wei
    pub fn decimals(self) -> u32 {
        match self {
            Unit::Wei => 0,
            Unit::Kwei => 3,
            Unit::Mwei => 6,
            Unit::Gwei => 9,
            Unit::Szabo => 12,
            Unit::Finney => 15,
            Unit::Ether => 18,
        }
    }

    /// Wei per one of this unit
    pub fn multiplier(self) -> u128 {
        10u128.pow(self.decimals())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Wei => "wei",
            Unit::Kwei => "kwei",
            Unit::Mwei => "mwei",
            Unit::Gwei => "gwei",
            Unit::Szabo => "szabo",
            Unit::Finney => "finney",
            Unit::Ether => "ether",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wei" => Ok(Unit::Wei),
            "kwei" | "babbage" => Ok(Unit::Kwei),
            "mwei" | "lovelace" => Ok(Unit::Mwei),
            "gwei" | "shannon" => Ok(Unit::Gwei),
            "szabo" | "microether" => Ok(Unit::Szabo),
            "finney" | "milliether" => Ok(Unit::Finney),
            "ether" | "eth" => Ok(Unit::Ether),
            other => Err(format!("unknown unit '{}'", other)),
        }
    }
}

/// Convert a decimal amount in `unit` to wei.
///
/// Accepts amounts like `"200"`, `"1.5"` or `"0.000000001"`. The result must
/// be a whole number of wei and fit in `u128`.
pub fn to_wei(amount: &str, unit: Unit) -> Result<u128, String> {
    let amount = amount.trim().replace('_', "");
    if amount.is_empty() {
        return Err("empty amount".to_string());
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount.as_str(), ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err("empty amount".to_string());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err("amount must be a non-negative decimal number".to_string());
    }

    let decimals = unit.decimals() as usize;
    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.len() > decimals {
        return Err(format!(
            "more than {} decimal places is a fraction of a wei",
            decimals
        ));
    }

    let overflow = || "value does not fit in 128 bits of wei".to_string();

    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| overflow())?
    };
    let frac: u128 = if frac_trimmed.is_empty() {
        0
    } else {
        let scale = 10u128.pow((decimals - frac_trimmed.len()) as u32);
        frac_trimmed.parse::<u128>().map_err(|_| overflow())? * scale
    };

    whole
        .checked_mul(unit.multiplier())
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(overflow)
}

/// A gas price in wei
///
/// Deserializes from an integer (wei) or a string such as `"200 gwei"`,
/// `"0.1 ether"` or `"2500000000"` (wei).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GasPrice(u128);

impl GasPrice {
    pub const fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    /// Build a gas price from a whole number of gwei.
    pub const fn from_gwei(gwei: u64) -> Self {
        Self(gwei as u128 * 1_000_000_000)
    }

    pub fn wei(self) -> u128 {
        self.0
    }

    /// Value in `unit`, as a decimal string without trailing zeros.
    pub fn format_in(self, unit: Unit) -> String {
        let mul = unit.multiplier();
        let whole = self.0 / mul;
        let frac = self.0 % mul;
        if frac == 0 {
            return whole.to_string();
        }
        let digits = format!("{:0width$}", frac, width = unit.decimals() as usize);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for GasPrice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConfigError::InvalidGasPrice {
            input: s.to_string(),
            reason,
        };

        let mut parts = s.split_whitespace();
        let amount = parts.next().ok_or_else(|| invalid("empty value".into()))?;
        let unit = match parts.next() {
            Some(u) => u.parse::<Unit>().map_err(invalid)?,
            None => Unit::Wei,
        };
        if parts.next().is_some() {
            return Err(invalid("expected '<amount> <unit>'".into()));
        }

        to_wei(amount, unit).map(GasPrice).map_err(invalid)
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format_in(Unit::Gwei), Unit::Gwei)
    }
}

impl Serialize for GasPrice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // TOML integers are i64; larger values travel as a wei string.
        match i64::try_from(self.0) {
            Ok(v) => serializer.serialize_i64(v),
            Err(_) => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for GasPrice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(wei) => Ok(GasPrice(wei as u128)),
            Raw::Text(s) => s.parse::<GasPrice>().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gwei_to_wei() {
        assert_eq!(to_wei("200", Unit::Gwei).unwrap(), 200_000_000_000);
        assert_eq!(to_wei("100", Unit::Gwei).unwrap(), 100_000_000_000);
        assert_eq!(to_wei("1.5", Unit::Gwei).unwrap(), 1_500_000_000);
        assert_eq!(to_wei(".5", Unit::Gwei).unwrap(), 500_000_000);
        assert_eq!(to_wei("1.", Unit::Gwei).unwrap(), 1_000_000_000);
    }

    #[test]
    fn test_ether_to_wei() {
        assert_eq!(
            to_wei("1", Unit::Ether).unwrap(),
            1_000_000_000_000_000_000
        );
        assert_eq!(to_wei("0.000000001", Unit::Ether).unwrap(), 1_000_000_000);
    }

    #[test]
    fn test_trailing_zeros_allowed() {
        assert_eq!(to_wei("3.000000000000", Unit::Wei).unwrap(), 3);
    }

    #[test]
    fn test_fractional_wei_rejected() {
        assert!(to_wei("0.5", Unit::Wei).is_err());
        assert!(to_wei("0.0000000001", Unit::Gwei).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(to_wei("", Unit::Gwei).is_err());
        assert!(to_wei(".", Unit::Gwei).is_err());
        assert!(to_wei("-1", Unit::Gwei).is_err());
        assert!(to_wei("1e9", Unit::Gwei).is_err());
    }

    #[test]
    fn test_overflow_rejected() {
        let huge = "9".repeat(40);
        assert!(to_wei(&huge, Unit::Ether).is_err());
    }

    #[test]
    fn test_unit_aliases() {
        assert_eq!("GWEI".parse::<Unit>().unwrap(), Unit::Gwei);
        assert_eq!("shannon".parse::<Unit>().unwrap(), Unit::Gwei);
        assert_eq!("milliether".parse::<Unit>().unwrap(), Unit::Finney);
        assert!("gwie".parse::<Unit>().is_err());
    }

    #[test]
    fn test_gas_price_parse() {
        let p: GasPrice = "200 gwei".parse().unwrap();
        assert_eq!(p.wei(), 200_000_000_000);
        assert_eq!(p, GasPrice::from_gwei(200));

        let p: GasPrice = "2500000000".parse().unwrap();
        assert_eq!(p, GasPrice::from_wei(2_500_000_000));

        assert!("200 gwei extra".parse::<GasPrice>().is_err());
        assert!("200 dogecoin".parse::<GasPrice>().is_err());
    }

    #[test]
    fn test_gas_price_idempotent() {
        let p: GasPrice = "100 gwei".parse().unwrap();
        let again: GasPrice = p.wei().to_string().parse().unwrap();
        assert_eq!(p, again);

        let via_display: GasPrice = p.to_string().parse().unwrap();
        assert_eq!(p, via_display);
    }

    #[test]
    fn test_format_in() {
        let p = GasPrice::from_wei(1_500_000_000);
        assert_eq!(p.format_in(Unit::Gwei), "1.5");
        assert_eq!(p.format_in(Unit::Wei), "1500000000");
        assert_eq!(p.to_string(), "1.5 gwei");
        assert_eq!(GasPrice::from_gwei(200).to_string(), "200 gwei");
    }

    #[test]
    fn test_deserialize_forms() {
        let p: GasPrice = serde_json::from_str(r#""100 gwei""#).unwrap();
        assert_eq!(p.wei(), 100_000_000_000);

        let p: GasPrice = serde_json::from_str("100000000000").unwrap();
        assert_eq!(p.wei(), 100_000_000_000);

        assert!(serde_json::from_str::<GasPrice>(r#""lots""#).is_err());
    }

    #[test]
    fn test_serialize_as_wei() {
        let json = serde_json::to_string(&GasPrice::from_gwei(200)).unwrap();
        assert_eq!(json, "200000000000");
    }
}
