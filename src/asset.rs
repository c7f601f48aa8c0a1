use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Invalid asset `{0}`")]
    Invalid(String),
    #[error("Mismatched assets: {0} and {1}")]
    Mismatched(String, String),
    #[error("Overflow subtracting {1} from {0}")]
    Overflow(String, String),
}

/// Largest number of decimals an `i64` amount can carry.
pub const MAX_PRECISION: usize = 18;

/// Amount in the node's legacy textual form, e.g. `16.000 TBD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    pub amount: i64,
    pub precision: u8,
    pub symbol: String,
}

impl Asset {
    pub fn new(amount: i64, precision: u8, symbol: &str) -> Self {
        Self {
            amount,
            precision,
            symbol: symbol.to_string(),
        }
    }

    pub fn checked_sub(&self, other: &Asset) -> Result<Asset, AssetError> {
        if self.symbol != other.symbol || self.precision != other.precision {
            return Err(AssetError::Mismatched(self.to_string(), other.to_string()));
        }
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| AssetError::Overflow(self.to_string(), other.to_string()))?;
        Ok(Asset::new(amount, self.precision, &self.symbol))
    }
}

impl FromStr for Asset {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AssetError::Invalid(s.to_string());
        let (number, symbol) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let symbol = symbol.trim();
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(invalid());
        }

        let (sign, number) = match number.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, number),
        };
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() || !(whole.chars().chain(fraction.chars())).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        if fraction.len() > MAX_PRECISION {
            return Err(invalid());
        }
        let precision = u8::try_from(fraction.len()).map_err(|_| invalid())?;
        let digits = format!("{whole}{fraction}");
        let amount: i64 = digits.parse().map_err(|_| invalid())?;
        Ok(Asset::new(sign * amount, precision, symbol))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let precision = usize::from(self.precision);
        let digits = format!("{:0width$}", self.amount.unsigned_abs(), width = precision + 1);
        let (whole, fraction) = digits.split_at(digits.len() - precision);
        if fraction.is_empty() {
            return write!(f, "{sign}{whole} {}", self.symbol);
        }
        write!(f, "{sign}{whole}.{fraction} {}", self.symbol)
    }
}

impl serde::Serialize for Asset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Asset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
