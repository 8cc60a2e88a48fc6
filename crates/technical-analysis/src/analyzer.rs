use analysis_core::{IndicatorSet, PriceSeries, TechnicalIndicators};

use crate::indicators::*;

/// Window lengths for every indicator in an [`IndicatorSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub atr_window: usize,
    pub adx_window: usize,
    pub volume_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            atr_window: 14,
            adx_window: 14,
            volume_window: 20,
        }
    }
}

pub struct TechnicalAnalysisEngine {
    params: IndicatorParams,
}

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self::with_params(IndicatorParams::default())
    }

    pub fn with_params(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Compute every indicator as of the last bar of `series`.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorSet {
        let p = &self.params;
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        let macd = macd(&closes, p.macd_fast, p.macd_slow, p.macd_signal);

        let set = IndicatorSet {
            rsi: rsi(&closes, p.rsi_window),
            macd_line: macd.macd_line,
            signal_line: macd.signal_line,
            histogram: macd.histogram,
            atr: atr(&highs, &lows, &closes, p.atr_window),
            adx: adx(&highs, &lows, &closes, p.adx_window),
            volume_z_score: volume_z_score(&volumes, p.volume_window),
        };

        tracing::debug!(
            "Indicators over {} bars: RSI {:.2}, MACD {:.4}/{:.4}, ATR {:.4}, ADX {:.2}, volume z {:.2}",
            series.len(),
            set.rsi,
            set.macd_line,
            set.signal_line,
            set.atr,
            set.adx,
            set.volume_z_score
        );

        set
    }

    /// Indicator values paired with their one-line summary.
    pub fn analyze(&self, series: &PriceSeries) -> TechnicalIndicators {
        let indicators = self.compute(series);
        TechnicalIndicators {
            interpretation: interpret(&indicators),
            indicators,
        }
    }

    /// Indicators that fell back to their default because `bar_count` bars do
    /// not cover the warm-up period.
    pub fn insufficient_history(&self, bar_count: usize) -> Vec<&'static str> {
        let p = &self.params;
        let requirements = [
            ("rsi", p.rsi_window),
            ("atr", p.atr_window),
            ("adx", (2 * p.adx_window).saturating_sub(1)),
            ("volume_z_score", p.volume_window),
        ];
        requirements
            .iter()
            .filter(|(_, needed)| bar_count < *needed)
            .map(|(name, _)| *name)
            .collect()
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Short human-readable summary of an indicator set.
pub fn interpret(set: &IndicatorSet) -> String {
    format!(
        "RSI {:.1}, Trend is {}",
        set.rsi,
        if set.is_strong_trend() { "Strong" } else { "Weak" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Bar;
    use chrono::{Duration, NaiveDate};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0 + (i % 3) as f64 * 10_000.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_compute_on_year_of_data() {
        let closes: Vec<f64> = (0..252).map(|i| 100.0 + (i as f64 * 0.1).sin() * 5.0).collect();
        let set = TechnicalAnalysisEngine::new().compute(&series_from_closes(&closes));

        assert!(set.rsi >= 0.0 && set.rsi <= 100.0);
        assert!(set.adx >= 0.0 && set.adx <= 100.0);
        assert!(set.atr > 0.0);
        assert!((set.histogram - (set.macd_line - set.signal_line)).abs() < 1e-12);
        assert!(set.volume_z_score.is_finite());
    }

    #[test]
    fn test_short_series_uses_defaults() {
        let set = TechnicalAnalysisEngine::new().compute(&series_from_closes(&[10.0, 11.0, 12.0]));
        assert_eq!(set.rsi, RSI_NEUTRAL);
        assert_eq!(set.atr, ATR_DEFAULT);
        assert_eq!(set.adx, ADX_DEFAULT);
        assert_eq!(set.volume_z_score, VOLUME_Z_DEFAULT);
    }

    #[test]
    fn test_insufficient_history() {
        let engine = TechnicalAnalysisEngine::new();
        assert_eq!(
            engine.insufficient_history(3),
            vec!["rsi", "atr", "adx", "volume_z_score"]
        );
        assert_eq!(engine.insufficient_history(20), vec!["adx"]);
        assert!(engine.insufficient_history(27).is_empty());
    }

    #[test]
    fn test_interpretation() {
        let mut set = IndicatorSet {
            rsi: 28.44,
            macd_line: 1.0,
            signal_line: 0.5,
            histogram: 0.5,
            atr: 2.0,
            adx: 30.0,
            volume_z_score: 0.0,
        };
        assert_eq!(interpret(&set), "RSI 28.4, Trend is Strong");

        set.adx = 25.0;
        assert_eq!(interpret(&set), "RSI 28.4, Trend is Weak");
    }

    #[test]
    fn test_analyze_attaches_interpretation() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
        let technical = TechnicalAnalysisEngine::new().analyze(&series_from_closes(&closes));
        assert!(technical.interpretation.starts_with("RSI 100.0"));
    }
}
