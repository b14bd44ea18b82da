use super::{RateStage, Representation};
use crate::core::rates::Selector;
use crate::core::source::RateSource;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The only stage that talks to a rate source. Returns its result unchanged.
pub struct PassthroughStage {
    source: Arc<dyn RateSource>,
}

impl PassthroughStage {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl RateStage for PassthroughStage {
    async fn produce(&self, selector: &Selector) -> Result<Representation> {
        let rates = match selector {
            Selector::All => self.source.fetch_all().await,
            Selector::Ids(_) => self.source.fetch(selector).await,
        };
        Ok(rates.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::{CurrencyRecord, Rates};
    use crate::pipeline::test_utils::FixedSource;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_passthrough_returns_source_result() {
        let records = vec![CurrencyRecord::new("USD", "Доллар США", "74,23")];
        let source = Arc::new(FixedSource::new(Rates::Snapshot(records.clone())));
        let stage = PassthroughStage::new(source.clone());

        let result = stage.produce(&Selector::ids(["R01235"])).await.unwrap();
        assert_eq!(result, Representation::Snapshot(records));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_passthrough_returns_unavailable() {
        let source = Arc::new(FixedSource::new(Rates::Unavailable));
        let stage = PassthroughStage::new(source);

        let result = stage.produce(&Selector::All).await.unwrap();
        assert_eq!(result, Representation::Unavailable);
    }
}
