use super::{Formatted, Outcome, RateStage, Representation};
use crate::core::rates::{CurrencyRecord, Rates, Selector};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;

pub const HEADER: [&str; 3] = ["code", "value", "name"];
const DELIMITER: u8 = b';';

/// Renders the wrapped stage's rates as `code;value;name` rows.
///
/// Unavailable rates render as the header alone; the outcome carried next to
/// the text keeps them apart from an empty result.
pub struct CsvStage {
    inner: Box<dyn RateStage>,
}

impl CsvStage {
    pub fn new(inner: Box<dyn RateStage>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl RateStage for CsvStage {
    async fn produce(&self, selector: &Selector) -> Result<Representation> {
        let rates = self.inner.produce(selector).await?.into_rates()?;
        let text = encode(&rates)?;
        Ok(Representation::Csv(Formatted::new(text, Outcome::of(&rates))))
    }
}

pub fn encode(rates: &Rates) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    if let Rates::Snapshot(records) = rates {
        for record in records {
            writer.write_record([&record.code, &record.value, &record.name])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn decode(text: &str) -> Result<Rates> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?;
    if !headers.iter().eq(HEADER) {
        bail!("Unexpected CSV header: {:?}", headers);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("Failed to parse CSV rates")?;
        records.push(CurrencyRecord::new(&row[0], &row[2], &row[1]));
    }
    Ok(Rates::Snapshot(records))
}
