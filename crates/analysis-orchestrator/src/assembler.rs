use analysis_core::stats::round_to;
use analysis_core::{
    AnalysisResult, DataQuality, Fundamentals, PricePoint, PriceSeries, SentimentAnalysis,
    TechnicalIndicators, TradeSignal,
};
use chrono::Utc;

/// Closing prices kept in the response chart
pub const PRICE_HISTORY_DAYS: usize = 90;

/// Everything computed for one instrument, ready to be packaged
pub struct AnalysisParts<'a> {
    pub request_id: &'a str,
    pub ticker: &'a str,
    pub series: &'a PriceSeries,
    pub fundamentals: Fundamentals,
    pub technical: TechnicalIndicators,
    pub sentiment: SentimentAnalysis,
    pub signal: TradeSignal,
    pub data_quality: DataQuality,
}

/// Package computed parts into the response shape. Pure apart from the timestamp.
pub fn assemble(parts: AnalysisParts<'_>) -> AnalysisResult {
    AnalysisResult {
        request_id: parts.request_id.to_string(),
        ticker: parts.ticker.to_string(),
        timestamp: Utc::now(),
        current_price: current_price(&parts.fundamentals, parts.series),
        price_history: price_history(parts.series),
        fundamentals: parts.fundamentals,
        technical_analysis: parts.technical,
        sentiment_analysis: parts.sentiment,
        signal_analysis: parts.signal,
        data_quality: parts.data_quality,
    }
}

/// Quoted price when the provider has one, otherwise the latest close.
pub fn current_price(fundamentals: &Fundamentals, series: &PriceSeries) -> f64 {
    let price = fundamentals
        .current_price
        .filter(|p| p.is_finite())
        .unwrap_or(series.last().close);
    round_to(price, 2)
}

/// Most recent [`PRICE_HISTORY_DAYS`] closes, oldest first, rounded to cents.
pub fn price_history(series: &PriceSeries) -> Vec<PricePoint> {
    series
        .tail(PRICE_HISTORY_DAYS)
        .iter()
        .map(|bar| PricePoint {
            date: bar.date.format("%Y-%m-%d").to_string(),
            price: round_to(bar.close, 2),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Bar, IndicatorSet, SignalStrength};
    use chrono::{Duration, NaiveDate};

    fn series(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + i as f64 + 0.004;
                Bar {
                    date: start + Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn parts<'a>(series: &'a PriceSeries, fundamentals: Fundamentals) -> AnalysisParts<'a> {
        let indicators = IndicatorSet {
            rsi: 50.0,
            macd_line: 0.0,
            signal_line: 0.0,
            histogram: 0.0,
            atr: 0.0,
            adx: 0.0,
            volume_z_score: 0.0,
        };
        AnalysisParts {
            request_id: "req-1",
            ticker: "AAPL",
            series,
            fundamentals,
            technical: TechnicalIndicators {
                indicators,
                interpretation: "RSI 50.0, Trend is Weak".to_string(),
            },
            sentiment: SentimentAnalysis::neutral(),
            signal: TradeSignal {
                signal: SignalStrength::Hold,
                confidence_score: 58.75,
                final_score: 41.25,
                factors: Vec::new(),
            },
            data_quality: DataQuality::default(),
        }
    }

    #[test]
    fn test_price_history_keeps_last_ninety() {
        let s = series(120);
        let history = price_history(&s);
        assert_eq!(history.len(), PRICE_HISTORY_DAYS);
        assert_eq!(history[0].date, "2024-01-31");
        assert_eq!(history[89].price, 219.0);
    }

    #[test]
    fn test_price_history_short_series() {
        let history = price_history(&series(5));
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].date, "2024-01-01");
        assert_eq!(history[0].price, 100.0);
    }

    #[test]
    fn test_current_price_prefers_quote() {
        let s = series(3);
        let quoted = Fundamentals {
            current_price: Some(187.456),
            ..Default::default()
        };
        assert_eq!(current_price(&quoted, &s), 187.46);
        assert_eq!(current_price(&Fundamentals::default(), &s), 102.0);
    }

    #[test]
    fn test_assemble_copies_fields() {
        let s = series(30);
        let result = assemble(parts(&s, Fundamentals::default()));
        assert_eq!(result.request_id, "req-1");
        assert_eq!(result.ticker, "AAPL");
        assert_eq!(result.current_price, 129.0);
        assert_eq!(result.price_history.len(), 30);
        assert_eq!(result.signal_analysis.signal, SignalStrength::Hold);
        assert_eq!(result.technical_analysis.interpretation, "RSI 50.0, Trend is Weak");
    }
}
