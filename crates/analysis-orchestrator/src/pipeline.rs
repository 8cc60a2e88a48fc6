use analysis_core::{
    AnalysisError, AnalysisResult, DataQuality, Fundamentals, PriceSeries, SentimentAnalysis,
    SentimentScore,
};
use factor_scoring::ScoringEngine;
use technical_analysis::TechnicalAnalysisEngine;

use crate::assembler::{assemble, AnalysisParts};

/// Fewest bars a series needs before it can be analyzed
pub const MIN_BARS: usize = 2;

/// Inputs to a single analysis once all I/O is done
pub struct AnalysisInputs<'a> {
    pub request_id: &'a str,
    pub ticker: &'a str,
    pub series: &'a PriceSeries,
    pub sentiment: SentimentAnalysis,
    pub fundamentals: Fundamentals,
    /// Set when headlines came from the secondary news source, or when no
    /// source answered and neutral sentiment was substituted
    pub news_fallback: bool,
}

/// Synchronous indicator, scoring and assembly stages. Performs no I/O.
#[derive(Default)]
pub struct SignalPipeline {
    technical: TechnicalAnalysisEngine,
    scoring: ScoringEngine,
}

impl SignalPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a series against a bare sentiment reading.
    pub fn analyze(
        &self,
        ticker: &str,
        series: &PriceSeries,
        sentiment: &SentimentScore,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_with(AnalysisInputs {
            request_id: "",
            ticker,
            series,
            sentiment: SentimentAnalysis {
                score: *sentiment,
                top_headlines: Vec::new(),
            },
            fundamentals: Fundamentals::default(),
            news_fallback: false,
        })
    }

    pub fn analyze_with(&self, inputs: AnalysisInputs<'_>) -> Result<AnalysisResult, AnalysisError> {
        let bar_count = inputs.series.len();
        if bar_count < MIN_BARS {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least {} daily bars for {}, got {}",
                MIN_BARS, inputs.ticker, bar_count
            )));
        }

        let score = inputs.sentiment.score.validated()?;
        let sentiment = SentimentAnalysis {
            score,
            top_headlines: inputs.sentiment.top_headlines,
        };

        let technical = self.technical.analyze(inputs.series);
        let signal = self.scoring.score(&technical.indicators, &sentiment.score);

        let mut missing_fields = inputs.fundamentals.missing_fields();
        missing_fields.extend(
            self.technical
                .insufficient_history(bar_count)
                .into_iter()
                .map(String::from),
        );

        let data_quality = DataQuality {
            price_coverage: format!("{} Daily OHLCV bars", bar_count),
            news_coverage: format!("{} Sources", sentiment.score.headline_count),
            missing_fields,
            is_fallback_used: inputs.news_fallback,
        };

        if !data_quality.missing_fields.is_empty() {
            tracing::debug!(
                "{}: degraded inputs {:?}",
                inputs.ticker,
                data_quality.missing_fields
            );
        }

        Ok(assemble(AnalysisParts {
            request_id: inputs.request_id,
            ticker: inputs.ticker,
            series: inputs.series,
            fundamentals: inputs.fundamentals,
            technical,
            sentiment,
            signal,
            data_quality,
        }))
    }
}

/// Core entry point: indicators, scoring and assembly with default parameters.
pub fn analyze(
    ticker: &str,
    series: &PriceSeries,
    sentiment: &SentimentScore,
) -> Result<AnalysisResult, AnalysisError> {
    SignalPipeline::new().analyze(ticker, series, sentiment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Bar, SignalStrength};
    use chrono::{Duration, NaiveDate};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 2_000_000.0 + (i % 5) as f64 * 50_000.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn sentiment(score: f64) -> SentimentScore {
        SentimentScore {
            score_normalized: score,
            raw_polarity: score / 50.0 - 1.0,
            headline_count: 3,
        }
    }

    #[test]
    fn test_rejects_single_bar() {
        let result = analyze("AAPL", &series_from_closes(&[100.0]), &sentiment(50.0));
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }

    #[test]
    fn test_rejects_non_finite_sentiment() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let result = analyze("AAPL", &series_from_closes(&closes), &sentiment(f64::NAN));
        assert!(matches!(result, Err(AnalysisError::InvalidData(_))));
    }

    #[test]
    fn test_score_is_sum_and_bounded_across_shapes() {
        let shapes: Vec<Vec<f64>> = vec![
            (0..252).map(|i| 100.0 + i as f64 * 0.5).collect(),
            (0..252).map(|i| 300.0 - i as f64 * 0.8).collect(),
            (0..252).map(|i| 100.0 + (i as f64 * 0.2).sin() * 8.0).collect(),
            vec![50.0; 40],
            vec![10.0, 10.5, 10.2],
        ];
        for closes in &shapes {
            let series = series_from_closes(closes);
            for score in [0.0, 35.0, 50.0, 90.0, 100.0] {
                let result = analyze("TEST", &series, &sentiment(score)).unwrap();
                let signal = &result.signal_analysis;
                let sum: f64 = signal.factors.iter().map(|f| f.score_impact).sum();
                assert!((signal.final_score - sum).abs() < 1e-6);
                assert!((0.0..=100.0).contains(&signal.final_score));
                assert!((50.0..=100.0).contains(&signal.confidence_score));
            }
        }
    }

    #[test]
    fn test_steady_uptrend_with_good_news() {
        let closes: Vec<f64> = (0..252).map(|i| 100.0 + i as f64 * 0.5).collect();
        let result = analyze("UP", &series_from_closes(&closes), &sentiment(90.0)).unwrap();

        let technical = &result.technical_analysis.indicators;
        assert!(technical.rsi > 70.0);
        assert!(technical.adx > 25.0);
        // overbought momentum (0) + strong bullish trend (35) + sentiment (36)
        assert!((result.signal_analysis.final_score - 71.0).abs() < 1e-9);
        assert_eq!(result.signal_analysis.signal, SignalStrength::Buy);
        assert_eq!(result.current_price, 225.5);
        assert_eq!(result.price_history.len(), 90);
    }

    #[test]
    fn test_news_coverage_counts_scored_headlines() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let reading = SentimentScore {
            score_normalized: 62.0,
            raw_polarity: 0.24,
            headline_count: 7,
        };
        let result = analyze("AAPL", &series_from_closes(&closes), &reading).unwrap();
        assert_eq!(result.sentiment_analysis.score.headline_count, 7);
        assert_eq!(result.data_quality.news_coverage, "7 Sources");
    }

    #[test]
    fn test_data_quality_for_short_history() {
        let result = analyze("NEW", &series_from_closes(&[10.0, 10.5, 10.2]), &sentiment(50.0)).unwrap();
        let quality = &result.data_quality;
        assert_eq!(quality.price_coverage, "3 Daily OHLCV bars");
        assert_eq!(quality.news_coverage, "3 Sources");
        assert!(!quality.is_fallback_used);
        for field in ["current_price", "rsi", "atr", "adx", "volume_z_score"] {
            assert!(quality.missing_fields.iter().any(|f| f == field), "{}", field);
        }
        assert_eq!(result.technical_analysis.indicators.rsi, 50.0);
    }

    #[test]
    fn test_out_of_range_sentiment_is_clamped() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let result = analyze("AAPL", &series_from_closes(&closes), &sentiment(130.0)).unwrap();
        assert_eq!(result.sentiment_analysis.score.score_normalized, 100.0);
    }
}
