use analysis_core::{
    AnalysisError, Bar, Fundamentals, MarketDataProvider, NewsArticle, NewsProvider, PriceSeries,
};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const QUOTE_URL: &str = "https://query2.finance.yahoo.com/v7/finance/quote";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Request timeouts for the two kinds of upstream calls
#[derive(Debug, Clone, Copy)]
pub struct YahooConfig {
    pub timeout: Duration,
    pub news_timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            news_timeout: Duration::from_secs(5),
        }
    }
}

/// Yahoo Finance client for daily history, quote fundamentals and headlines.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    config: YahooConfig,
}

impl YahooFinanceClient {
    pub fn new(config: YahooConfig) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    async fn get_json(
        &self,
        builder: reqwest::RequestBuilder,
        symbol: &str,
    ) -> Result<serde_json::Value, AnalysisError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(AnalysisError::NotFound(format!("No data found for {}", symbol)));
        }
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))
    }

    /// One year of daily bars
    pub async fn get_history(&self, symbol: &str) -> Result<PriceSeries, AnalysisError> {
        tracing::info!("Fetching daily history for {} from Yahoo Finance", symbol);
        let url = format!("{}/{}", CHART_URL, symbol);
        let json = self
            .get_json(
                self.client
                    .get(&url)
                    .query(&[("range", "1y"), ("interval", "1d"), ("includePrePost", "false")]),
                symbol,
            )
            .await?;

        let bars = parse_chart(&json);
        if bars.is_empty() {
            tracing::warn!("No price data found for {}", symbol);
            return Err(AnalysisError::NotFound(format!("No price data found for {}", symbol)));
        }
        PriceSeries::new(bars)
    }

    /// Quote-level fundamentals
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<Fundamentals, AnalysisError> {
        let json = self
            .get_json(self.client.get(QUOTE_URL).query(&[("symbols", symbol)]), symbol)
            .await?;

        parse_quote(&json)
            .ok_or_else(|| AnalysisError::NotFound(format!("No fundamental data found for {}", symbol)))
    }

    /// Recent headlines mentioning the symbol
    pub async fn get_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, AnalysisError> {
        let count = limit.to_string();
        let json = self
            .get_json(
                self.client
                    .get(SEARCH_URL)
                    .timeout(self.config.news_timeout)
                    .query(&[("q", symbol), ("quotesCount", "0"), ("newsCount", count.as_str())]),
                symbol,
            )
            .await?;

        let response: SearchResponse = serde_json::from_value(json)
            .map_err(|e| AnalysisError::ApiError(format!("Malformed news response: {}", e)))?;

        Ok(response
            .news
            .into_iter()
            .take(limit)
            .map(|n| NewsArticle {
                title: n.title,
                source: n.publisher.unwrap_or_else(|| "Yahoo Finance".to_string()),
                url: n.link,
                published_at: n.provider_publish_time.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            })
            .collect())
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(YahooConfig::default())
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn price_history(&self, symbol: &str) -> Result<PriceSeries, AnalysisError> {
        self.get_history(symbol).await
    }

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, AnalysisError> {
        self.get_fundamentals(symbol).await
    }
}

#[async_trait]
impl NewsProvider for YahooFinanceClient {
    async fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, AnalysisError> {
        self.get_news(symbol, limit).await
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNewsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNewsItem {
    title: String,
    publisher: Option<String>,
    link: Option<String>,
    provider_publish_time: Option<i64>,
}

/// Extract daily bars from a chart response. Rows with missing values are
/// skipped; a row sharing a date with the previous one replaces it.
fn parse_chart(json: &serde_json::Value) -> Vec<Bar> {
    let chart = match json
        .get("chart")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
    {
        Some(chart) => chart,
        None => return Vec::new(),
    };

    let empty = Vec::new();
    let timestamps = chart.get("timestamp").and_then(|v| v.as_array()).unwrap_or(&empty);
    let quote = chart
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first());

    let column = |name: &str| -> Vec<Option<f64>> {
        quote
            .and_then(|q| q.get(name))
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(|x| x.as_f64()).collect())
            .unwrap_or_default()
    };
    let opens = column("open");
    let highs = column("high");
    let lows = column("low");
    let closes = column("close");
    let volumes = column("volume");

    let mut bars: Vec<Bar> = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let at = |col: &Vec<Option<f64>>| col.get(i).copied().flatten();
        let (Some(ts), Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            ts.as_i64(),
            at(&opens),
            at(&highs),
            at(&lows),
            at(&closes),
            at(&volumes),
        ) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };

        let bar = Bar { date, open, high, low, close, volume };
        if let Some(last) = bars.last_mut() {
            if last.date >= date {
                *last = bar;
                continue;
            }
        }
        bars.push(bar);
    }
    bars
}

/// Map a quote response onto [`Fundamentals`]. `None` when the response holds no quote.
fn parse_quote(json: &serde_json::Value) -> Option<Fundamentals> {
    let quote = json
        .get("quoteResponse")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())?;

    let number = |key: &str| quote.get(key).and_then(|v| v.as_f64());
    let text = |key: &str| quote.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

    Some(Fundamentals {
        market_cap: number("marketCap"),
        pe_ratio: number("trailingPE"),
        sector: text("sector"),
        industry: text("industry"),
        volume_avg: number("averageDailyVolume3Month").or_else(|| number("averageVolume")),
        current_price: number("currentPrice").or_else(|| number("regularMarketPrice")),
    })
}
