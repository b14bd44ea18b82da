use super::{Formatted, Outcome, RateStage, Representation};
use crate::core::rates::{CurrencyRecord, Rates, Selector, UNAVAILABLE_ID};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_INDENT: usize = 4;

/// Serializes the wrapped stage's rates as
/// `[{"USD": ["Доллар США", "74,23"]}, ...]`.
///
/// Unavailable rates become `[{"R9999": null}]`.
pub struct JsonStage {
    inner: Box<dyn RateStage>,
    indent: usize,
}

impl JsonStage {
    pub fn new(inner: Box<dyn RateStage>) -> Self {
        Self::with_indent(inner, DEFAULT_INDENT)
    }

    pub fn with_indent(inner: Box<dyn RateStage>, indent: usize) -> Self {
        Self { inner, indent }
    }
}

#[async_trait]
impl RateStage for JsonStage {
    async fn produce(&self, selector: &Selector) -> Result<Representation> {
        let rates = self.inner.produce(selector).await?.into_rates()?;
        let text = encode(&rates, self.indent)?;
        Ok(Representation::Json(Formatted::new(text, Outcome::of(&rates))))
    }
}

pub fn encode(rates: &Rates, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

    match rates {
        Rates::Snapshot(records) => records.serialize(&mut serializer)?,
        Rates::Unavailable => {
            let marker: [BTreeMap<&str, Option<()>>; 1] =
                [BTreeMap::from([(UNAVAILABLE_ID, None)])];
            marker.serialize(&mut serializer)?
        }
    }

    // serde_json only writes valid UTF-8
    Ok(String::from_utf8(buf)?)
}

pub fn decode(text: &str) -> Result<Rates> {
    let entries: Vec<BTreeMap<String, Option<(String, String)>>> =
        serde_json::from_str(text).context("Failed to parse JSON rates")?;

    if let [entry] = entries.as_slice() {
        if entry.len() == 1 && matches!(entry.get(UNAVAILABLE_ID), Some(None)) {
            return Ok(Rates::Unavailable);
        }
    }

    let records = entries
        .into_iter()
        .flat_map(|entry| entry.into_iter())
        .filter_map(|(code, payload)| match payload {
            Some((name, value)) => Some(CurrencyRecord { code, name, value }),
            None => {
                debug!("Skipping JSON entry without rates: {}", code);
                None
            }
        })
        .collect();
    Ok(Rates::Snapshot(records))
}
