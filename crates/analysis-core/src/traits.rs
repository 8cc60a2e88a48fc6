use async_trait::async_trait;
use crate::{AnalysisError, Fundamentals, NewsArticle, PriceSeries};

/// Source of daily price history and company fundamentals
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Roughly one trading year of daily bars, ascending by date.
    async fn price_history(&self, symbol: &str) -> Result<PriceSeries, AnalysisError>;

    /// Best-effort fundamentals; absent fields are left as `None`.
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, AnalysisError>;
}

/// Source of recent news headlines for a symbol
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, AnalysisError>;
}
