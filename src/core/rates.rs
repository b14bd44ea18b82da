//! Currency rate records and the results a fetch can produce

use rust_decimal::Decimal;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier used by the serialized form of [`Rates::Unavailable`].
pub const UNAVAILABLE_ID: &str = "R9999";

/// One currency as published by the feed.
///
/// `value` keeps the feed's comma decimal separator, use [`CurrencyRecord::rate`]
/// to get a number out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRecord {
    pub code: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid rate value '{value}' for {code}")]
pub struct InvalidRate {
    pub code: String,
    pub value: String,
}

impl CurrencyRecord {
    pub fn new(code: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses the locale formatted value, e.g. `74,23`.
    pub fn rate(&self) -> Result<Decimal, InvalidRate> {
        Decimal::from_str(&self.value.trim().replace(',', ".")).map_err(|_| InvalidRate {
            code: self.code.clone(),
            value: self.value.clone(),
        })
    }
}

// Serialized as `{"<code>": ["<name>", "<value>"]}`
impl Serialize for CurrencyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.code, &(&self.name, &self.value))?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for CurrencyRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = CurrencyRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a single-key map of currency code to [name, value]")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let (code, (name, value)) = map
                    .next_entry::<String, (String, String)>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(CurrencyRecord { code, name, value })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Records in feed document order.
pub type RateSnapshot = Vec<CurrencyRecord>;

/// Outcome of a rate fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rates {
    /// Fetch succeeded. May be empty when nothing matched the selector.
    Snapshot(RateSnapshot),
    /// No usable data: the request was rate limited or failed.
    Unavailable,
}

impl Rates {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Rates::Unavailable)
    }
}

/// Which currencies a caller wants, matched against the feed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    All,
    Ids(BTreeSet<String>),
}

impl Selector {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selector::Ids(ids.into_iter().map(Into::into).collect())
    }

    /// An empty id list means every currency.
    pub fn from_ids(ids: &[String]) -> Self {
        if ids.is_empty() {
            Selector::All
        } else {
            Self::ids(ids.iter().cloned())
        }
    }

    pub fn matches(&self, id: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Ids(ids) => ids.contains(id),
        }
    }
}
