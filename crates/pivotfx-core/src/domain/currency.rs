use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Currency every stored rate is quoted against.
pub const PIVOT: &str = "USD";

const MAX_CODE_LEN: usize = 10;

/// Asset class of a currency; decides which store and pair orientation apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Fiat,
    Crypto,
}

impl AssetClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fiat => "fiat",
            Self::Crypto => "crypto",
        }
    }
}

/// Normalized uppercase currency code.
///
/// Parsing only checks shape; membership in an allow-list is decided by
/// [`CurrencyUniverse::classify`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptyCurrency);
        }

        let len = normalized.chars().count();
        if len > MAX_CODE_LEN {
            return Err(ValidationError::CurrencyTooLong {
                len,
                max: MAX_CODE_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() {
                return Err(ValidationError::CurrencyInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_pivot(&self) -> bool {
        self.0 == PIVOT
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

/// Immutable fiat and crypto allow-lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyUniverse {
    fiat: BTreeSet<CurrencyCode>,
    crypto: BTreeSet<CurrencyCode>,
}

impl CurrencyUniverse {
    /// Build a universe from raw code lists.
    ///
    /// Both lists must be non-empty and disjoint, and the fiat list must
    /// contain the USD pivot.
    pub fn new<F, C>(fiat: F, crypto: C) -> Result<Self, ValidationError>
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let fiat = parse_set(fiat)?;
        let crypto = parse_set(crypto)?;

        if fiat.is_empty() {
            return Err(ValidationError::EmptyAllowList {
                class: AssetClass::Fiat.as_str(),
            });
        }
        if crypto.is_empty() {
            return Err(ValidationError::EmptyAllowList {
                class: AssetClass::Crypto.as_str(),
            });
        }
        if let Some(shared) = fiat.intersection(&crypto).next() {
            return Err(ValidationError::OverlappingAllowLists {
                value: shared.to_string(),
            });
        }
        if !fiat.iter().any(CurrencyCode::is_pivot) {
            return Err(ValidationError::MissingPivot);
        }

        Ok(Self { fiat, crypto })
    }

    /// Resolve a raw code into a normalized code and its asset class.
    pub fn classify(&self, input: &str) -> Result<(CurrencyCode, AssetClass), ValidationError> {
        let code = CurrencyCode::parse(input)?;
        let class = if self.fiat.contains(&code) {
            AssetClass::Fiat
        } else if self.crypto.contains(&code) {
            AssetClass::Crypto
        } else {
            return Err(ValidationError::CurrencyNotAllowed {
                value: code.into(),
            });
        };
        Ok((code, class))
    }

    pub fn is_allowed(&self, input: &str) -> bool {
        self.classify(input).is_ok()
    }

    pub fn fiat(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.fiat.iter()
    }

    pub fn crypto(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.crypto.iter()
    }
}

impl Default for CurrencyUniverse {
    fn default() -> Self {
        let code = |value: &str| CurrencyCode(value.to_owned());
        Self {
            fiat: ["USD", "INR", "EUR", "JPY", "GBP"].into_iter().map(code).collect(),
            crypto: ["BTC", "ETH", "USDT"].into_iter().map(code).collect(),
        }
    }
}

fn parse_set<I>(codes: I) -> Result<BTreeSet<CurrencyCode>, ValidationError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    codes
        .into_iter()
        .map(|code| CurrencyCode::parse(code.as_ref()))
        .collect()
}
