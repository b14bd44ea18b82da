//! Rate source abstraction

use crate::core::rates::{Rates, Selector};
use async_trait::async_trait;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the currencies picked by `selector`. Never fails; problems are
    /// reported as [`Rates::Unavailable`].
    async fn fetch(&self, selector: &Selector) -> Rates;

    async fn fetch_all(&self) -> Rates {
        self.fetch(&Selector::All).await
    }

    async fn fetch_selected(&self, ids: &[&str]) -> Rates {
        self.fetch(&Selector::ids(ids.iter().copied())).await
    }
}
