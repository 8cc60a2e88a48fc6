use analysis_core::{
    AnalysisError, AnalysisResult, Fundamentals, MarketDataProvider, NewsArticle, NewsProvider,
    PriceSeries,
};
use chrono::Duration;
use sentiment_analysis::SentimentAnalysisEngine;
use std::sync::Arc;
use std::time::Instant;

pub mod assembler;
pub mod cache;
pub mod pipeline;

pub use assembler::{assemble, AnalysisParts, PRICE_HISTORY_DAYS};
pub use cache::TtlCache;
pub use pipeline::{analyze, AnalysisInputs, SignalPipeline, MIN_BARS};

const CACHE_TTL_SECS: i64 = 900; // 15 minutes
const CACHE_MAX_ENTRIES: usize = 100;
const NEWS_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub news_limit: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::seconds(CACHE_TTL_SECS),
            cache_max_entries: CACHE_MAX_ENTRIES,
            news_limit: NEWS_LIMIT,
        }
    }
}

/// Price history and fundamentals fetched together for one symbol
#[derive(Debug, Clone)]
struct MarketSnapshot {
    series: PriceSeries,
    fundamentals: Fundamentals,
}

pub struct AnalysisOrchestrator {
    market_data: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
    /// Tried when the primary news source errors or returns nothing
    fallback_news: Option<Arc<dyn NewsProvider>>,
    pipeline: SignalPipeline,
    sentiment_analyzer: SentimentAnalysisEngine,
    /// Market data per symbol; news is always fetched fresh
    market_cache: TtlCache<MarketSnapshot>,
    news_limit: usize,
}

impl AnalysisOrchestrator {
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            market_data,
            news,
            fallback_news: None,
            pipeline: SignalPipeline::new(),
            sentiment_analyzer: SentimentAnalysisEngine::new(),
            market_cache: TtlCache::new(config.cache_ttl, config.cache_max_entries),
            news_limit: config.news_limit,
        }
    }

    pub fn with_fallback_news(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.fallback_news = Some(provider);
        self
    }

    /// Number of symbols with cached market data
    pub fn cache_size(&self) -> usize {
        self.market_cache.len()
    }

    /// Fetch, score and assemble a full analysis for `symbol`.
    ///
    /// Market data failures abort the request. News that had to come from the
    /// fallback source, or could not be fetched at all, is flagged in the data
    /// quality report; in the latter case sentiment is neutral.
    pub async fn analyze(&self, symbol: &str, request_id: &str) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        tracing::info!("Starting analysis for {} (request {})", symbol, request_id);

        let (market_result, news_result) = tokio::join!(
            self.get_market_snapshot(symbol),
            self.news.headlines(symbol, self.news_limit),
        );

        let snapshot = market_result?;

        let (articles, news_fallback) = self.resolve_headlines(symbol, news_result).await;
        let sentiment = self.sentiment_analyzer.analyze(&articles);

        let result = self.pipeline.analyze_with(AnalysisInputs {
            request_id,
            ticker: symbol,
            series: &snapshot.series,
            sentiment,
            fundamentals: snapshot.fundamentals,
            news_fallback,
        })?;

        tracing::info!(
            "Analysis for {} complete: {} (score {:.2}, confidence {:.1}) in {}ms",
            symbol,
            result.signal_analysis.signal,
            result.signal_analysis.final_score,
            result.signal_analysis.confidence_score,
            started.elapsed().as_millis()
        );

        Ok(result)
    }

    /// Primary headlines when there are any, otherwise the fallback source's.
    /// The flag is set when the fallback supplied the headlines or when every
    /// source failed.
    async fn resolve_headlines(
        &self,
        symbol: &str,
        primary: Result<Vec<NewsArticle>, AnalysisError>,
    ) -> (Vec<NewsArticle>, bool) {
        let primary_failed = match primary {
            Ok(articles) if !articles.is_empty() => return (articles, false),
            Ok(_) => false,
            Err(e) => {
                tracing::warn!("News fetch failed for {}: {}", symbol, e);
                true
            }
        };

        if let Some(fallback) = &self.fallback_news {
            tracing::info!("Falling back to secondary news source for {}", symbol);
            match fallback.headlines(symbol, self.news_limit).await {
                Ok(articles) if !articles.is_empty() => return (articles, true),
                Ok(_) => {}
                Err(e) => tracing::warn!("Fallback news fetch failed for {}: {}", symbol, e),
            }
        }

        if primary_failed {
            tracing::warn!("No headlines for {}, using neutral sentiment", symbol);
        }
        (Vec::new(), primary_failed)
    }

    async fn get_market_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, AnalysisError> {
        if let Some(snapshot) = self.market_cache.get(symbol) {
            tracing::debug!("Market data cache hit for {}", symbol);
            return Ok(snapshot);
        }

        let (history_result, fundamentals_result) = tokio::join!(
            self.market_data.price_history(symbol),
            self.market_data.fundamentals(symbol),
        );

        let series = history_result?;
        let fundamentals = fundamentals_result.unwrap_or_else(|e| {
            tracing::warn!("Fundamentals unavailable for {}: {}", symbol, e);
            Fundamentals::default()
        });

        let snapshot = MarketSnapshot { series, fundamentals };
        self.market_cache.insert(symbol.to_string(), snapshot.clone());
        Ok(snapshot)
    }
}
