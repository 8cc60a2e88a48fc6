use analysis_core::{AnalysisError, NewsArticle, NewsProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use std::time::Duration;

const RSS_SEARCH_URL: &str = "https://news.google.com/rss/search";
const DEFAULT_SOURCE: &str = "Google News";

/// Google News RSS search, used as the secondary headline source.
#[derive(Clone)]
pub struct GoogleNewsClient {
    client: Client,
}

impl GoogleNewsClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Headlines from the last week mentioning `symbol` as a stock
    pub async fn get_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, AnalysisError> {
        tracing::info!("Fetching Google News RSS for {}", symbol);
        let query = format!("{} stock when:7d", symbol);
        let response = self
            .client
            .get(RSS_SEARCH_URL)
            .query(&[
                ("q", query.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!("HTTP {}: Google News RSS", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        parse_rss(&body, limit)
    }
}

impl Default for GoogleNewsClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl NewsProvider for GoogleNewsClient {
    async fn headlines(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, AnalysisError> {
        self.get_news(symbol, limit).await
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    Source,
    PubDate,
}

#[derive(Debug, Default)]
struct RssItem {
    title: String,
    link: String,
    source: String,
    pub_date: String,
}

impl RssItem {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Source => &mut self.source,
            Field::PubDate => &mut self.pub_date,
        };
        target.push_str(text);
    }

    fn into_article(self) -> Option<NewsArticle> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        let source = self.source.trim();
        let link = self.link.trim();
        Some(NewsArticle {
            title: title.to_string(),
            source: if source.is_empty() { DEFAULT_SOURCE.to_string() } else { source.to_string() },
            url: (!link.is_empty()).then(|| link.to_string()),
            published_at: DateTime::parse_from_rfc2822(self.pub_date.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }
}

/// Read up to `limit` `<item>` entries from an RSS document. Items without a
/// title are skipped; an unparseable date is left empty.
fn parse_rss(xml: &str, limit: usize) -> Result<Vec<NewsArticle>, AnalysisError> {
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();
    let mut current: Option<RssItem> = None;
    let mut field: Option<Field> = None;

    while articles.len() < limit {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                field = match e.name().as_ref() {
                    b"item" => {
                        current = Some(RssItem::default());
                        None
                    }
                    b"title" => Some(Field::Title),
                    b"link" => Some(Field::Link),
                    b"source" => Some(Field::Source),
                    b"pubDate" => Some(Field::PubDate),
                    _ => None,
                };
            }
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map_err(|err| AnalysisError::ApiError(format!("Malformed RSS text: {}", err)))?;
                    item.push(f, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    item.push(f, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                field = None;
                if e.name().as_ref() == b"item" {
                    if let Some(article) = current.take().and_then(RssItem::into_article) {
                        articles.push(article);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AnalysisError::ApiError(format!(
                    "Malformed RSS at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    tracing::debug!("Parsed {} RSS headlines", articles.len());
    Ok(articles)
}
