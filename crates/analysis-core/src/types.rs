use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    fn check(&self) -> Result<(), AnalysisError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidData(format!(
                    "{} on {} is not a finite number",
                    name, self.date
                )));
            }
            if value < 0.0 {
                return Err(AnalysisError::InvalidData(format!(
                    "{} on {} is negative ({})",
                    name, self.date, value
                )));
            }
        }
        Ok(())
    }
}

/// Validated, date-ascending sequence of daily bars.
///
/// Construction rejects empty input, non-finite or negative values and
/// dates that are not strictly increasing. The series is never mutated
/// after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "price series contains no bars".to_string(),
            ));
        }

        for bar in &bars {
            bar.check()?;
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(AnalysisError::InvalidData(format!(
                "bar dates must be strictly increasing ({} followed by {})",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar. Always present because construction rejects empty input.
    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    /// The trailing `n` bars (or all of them when the series is shorter).
    pub fn tail(&self, n: usize) -> &[Bar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bars = Vec::<Bar>::deserialize(deserializer)?;
        PriceSeries::new(bars).map_err(serde::de::Error::custom)
    }
}

/// Company fundamentals. Every field is best effort and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub volume_avg: Option<f64>,
    pub current_price: Option<f64>,
}

impl Fundamentals {
    /// Names of the fields the provider could not supply.
    pub fn missing_fields(&self) -> Vec<String> {
        let present = [
            ("market_cap", self.market_cap.is_some()),
            ("pe_ratio", self.pe_ratio.is_some()),
            ("sector", self.sector.is_some()),
            ("industry", self.industry.is_some()),
            ("volume_avg", self.volume_avg.is_some()),
            ("current_price", self.current_price.is_some()),
        ];
        present
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

/// Unscored news headline as returned by a news source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Headline with its polarity in [-1, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub sentiment_score: f64,
}

/// Normalized news sentiment for one instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// 0 (very negative) to 100 (very positive)
    pub score_normalized: f64,
    /// Mean headline polarity, -1 to 1
    pub raw_polarity: f64,
    pub headline_count: usize,
}

impl SentimentScore {
    /// Neutral reading used when no headlines are available.
    pub fn neutral() -> Self {
        Self {
            score_normalized: 50.0,
            raw_polarity: 0.0,
            headline_count: 0,
        }
    }

    /// Map a mean polarity in [-1, 1] onto the 0-100 scale.
    pub fn from_polarity(polarity: f64, headline_count: usize) -> Self {
        let polarity = if polarity.is_finite() { polarity.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            score_normalized: (polarity + 1.0) * 50.0,
            raw_polarity: polarity,
            headline_count,
        }
    }

    /// Reject non-finite readings and clamp finite ones into their documented ranges.
    pub fn validated(&self) -> Result<Self, AnalysisError> {
        if !self.score_normalized.is_finite() || !self.raw_polarity.is_finite() {
            return Err(AnalysisError::InvalidData(
                "sentiment score must be a finite number".to_string(),
            ));
        }
        Ok(Self {
            score_normalized: self.score_normalized.clamp(0.0, 100.0),
            raw_polarity: self.raw_polarity.clamp(-1.0, 1.0),
            headline_count: self.headline_count,
        })
    }
}

impl Default for SentimentScore {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Sentiment score together with the headlines it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    #[serde(flatten)]
    pub score: SentimentScore,
    pub top_headlines: Vec<NewsItem>,
}

impl SentimentAnalysis {
    pub fn neutral() -> Self {
        Self {
            score: SentimentScore::neutral(),
            top_headlines: Vec::new(),
        }
    }
}

/// Trailing indicator values as of the most recent bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
    pub atr: f64,
    pub adx: f64,
    /// Reported for context only; it carries no scoring weight.
    pub volume_z_score: f64,
}

/// ADX above this marks a strong trend regime.
pub const STRONG_TREND_ADX: f64 = 25.0;

impl IndicatorSet {
    pub fn is_macd_bullish(&self) -> bool {
        self.macd_line > self.signal_line
    }

    pub fn is_strong_trend(&self) -> bool {
        self.adx > STRONG_TREND_ADX
    }
}

/// Indicator values plus a short human-readable summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    #[serde(flatten)]
    pub indicators: IndicatorSet,
    pub interpretation: String,
}

/// Discrete recommendation derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStrength {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl SignalStrength {
    /// Human-readable label for the signal
    pub fn to_label(&self) -> &'static str {
        match self {
            SignalStrength::StrongBuy => "Strong Buy",
            SignalStrength::Buy => "Buy",
            SignalStrength::Hold => "Hold",
            SignalStrength::Sell => "Sell",
            SignalStrength::StrongSell => "Strong Sell",
        }
    }
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_label())
    }
}

/// One scoring factor's weighted contribution to the final 0-100 score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor_name: String,
    pub score_impact: f64,
    pub reason: String,
}

/// Composite recommendation with its factor breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub signal: SignalStrength,
    pub confidence_score: f64,
    pub final_score: f64,
    pub factors: Vec<FactorContribution>,
}

/// Notes on how complete the inputs to an analysis were
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub price_coverage: String,
    pub news_coverage: String,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub is_fallback_used: bool,
}

/// Closing price on a given day, rounded for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

/// Full result of analyzing one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub request_id: String,
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub current_price: f64,
    pub fundamentals: Fundamentals,
    pub technical_analysis: TechnicalIndicators,
    pub sentiment_analysis: SentimentAnalysis,
    pub signal_analysis: TradeSignal,
    pub data_quality: DataQuality,
    pub price_history: Vec<PricePoint>,
}
