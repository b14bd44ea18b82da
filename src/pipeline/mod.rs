//! Output format pipeline
//!
//! Every stage wraps another stage (or, for [`PassthroughStage`], a rate
//! source) and transforms whatever it produces. Stages decode any
//! representation coming from below, so they can be stacked in any order.

pub mod csv_stage;
pub mod json_stage;
pub mod passthrough;

pub use csv_stage::CsvStage;
pub use json_stage::JsonStage;
pub use passthrough::PassthroughStage;

use crate::core::config::OutputFormat;
use crate::core::rates::{RateSnapshot, Rates, Selector};
use crate::core::source::RateSource;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// What a formatted text stands for, kept so that callers can tell a failed
/// fetch from an empty one without parsing the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rates,
    NoMatch,
    Unavailable,
}

impl Outcome {
    pub fn of(rates: &Rates) -> Self {
        match rates {
            Rates::Snapshot(records) if records.is_empty() => Outcome::NoMatch,
            Rates::Snapshot(_) => Outcome::Rates,
            Rates::Unavailable => Outcome::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub outcome: Outcome,
}

impl Formatted {
    pub fn new(text: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            text: text.into(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Representation {
    Snapshot(RateSnapshot),
    Unavailable,
    Json(Formatted),
    Csv(Formatted),
}

impl From<Rates> for Representation {
    fn from(rates: Rates) -> Self {
        match rates {
            Rates::Snapshot(records) => Representation::Snapshot(records),
            Rates::Unavailable => Representation::Unavailable,
        }
    }
}

impl Representation {
    /// Decodes this representation back into structured rates.
    pub fn into_rates(self) -> Result<Rates> {
        match self {
            Representation::Snapshot(records) => Ok(Rates::Snapshot(records)),
            Representation::Unavailable => Ok(Rates::Unavailable),
            Representation::Json(Formatted {
                outcome: Outcome::Unavailable,
                ..
            })
            | Representation::Csv(Formatted {
                outcome: Outcome::Unavailable,
                ..
            }) => Ok(Rates::Unavailable),
            Representation::Json(formatted) => json_stage::decode(&formatted.text),
            Representation::Csv(formatted) => csv_stage::decode(&formatted.text),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Representation::Snapshot(records) if records.is_empty() => Outcome::NoMatch,
            Representation::Snapshot(_) => Outcome::Rates,
            Representation::Unavailable => Outcome::Unavailable,
            Representation::Json(formatted) | Representation::Csv(formatted) => formatted.outcome,
        }
    }
}

#[async_trait]
pub trait RateStage: Send + Sync {
    async fn produce(&self, selector: &Selector) -> Result<Representation>;
}

/// Builds the stage chain for an output format on top of `source`.
pub fn build_pipeline(
    format: OutputFormat,
    source: Arc<dyn RateSource>,
    json_indent: usize,
) -> Box<dyn RateStage> {
    let base: Box<dyn RateStage> = Box::new(PassthroughStage::new(source));
    match format {
        OutputFormat::Table => base,
        OutputFormat::Json => Box::new(JsonStage::with_indent(base, json_indent)),
        OutputFormat::Csv => Box::new(CsvStage::new(base)),
        OutputFormat::JsonCsv => Box::new(CsvStage::new(Box::new(JsonStage::with_indent(
            base,
            json_indent,
        )))),
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stage that always produces the same representation.
    pub struct FixedStage {
        output: Representation,
    }

    impl FixedStage {
        pub fn new(output: Representation) -> Self {
            Self { output }
        }

        pub fn boxed(output: Representation) -> Box<dyn RateStage> {
            Box::new(Self::new(output))
        }
    }

    #[async_trait]
    impl RateStage for FixedStage {
        async fn produce(&self, _selector: &Selector) -> Result<Representation> {
            Ok(self.output.clone())
        }
    }

    /// Source that counts calls and returns fixed rates.
    pub struct FixedSource {
        rates: Rates,
        pub calls: AtomicUsize,
    }

    impl FixedSource {
        pub fn new(rates: Rates) -> Self {
            Self {
                rates,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RateSource for FixedSource {
        async fn fetch(&self, _selector: &Selector) -> Rates {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rates.clone()
        }
    }
}
