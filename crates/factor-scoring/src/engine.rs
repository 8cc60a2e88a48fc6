use analysis_core::{FactorContribution, IndicatorSet, SentimentScore, TradeSignal};

use crate::thresholds::{TrendRegime, RSI_SUBSCORES, RSI_ZONES, SIGNAL_LABELS};

pub const MOMENTUM_FACTOR: &str = "Momentum (RSI)";
pub const TREND_FACTOR: &str = "Trend (MACD+ADX)";
pub const SENTIMENT_FACTOR: &str = "Market Sentiment";

/// Fixed factor weights. They sum to 1 so the composite stays on the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    pub momentum: f64,
    pub trend: f64,
    pub sentiment: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            momentum: 0.25,
            trend: 0.35,
            sentiment: 0.40,
        }
    }
}

/// Weighted three-factor model mapping indicators and sentiment to a [`TradeSignal`].
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: FactorWeights,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, indicators: &IndicatorSet, sentiment: &SentimentScore) -> TradeSignal {
        let factors = vec![
            self.momentum_factor(indicators.rsi),
            self.trend_factor(indicators),
            self.sentiment_factor(sentiment),
        ];

        let final_score: f64 = factors.iter().map(|f| f.score_impact).sum();
        let signal = SIGNAL_LABELS.lookup(final_score);
        let confidence_score = confidence(final_score);

        tracing::debug!(
            "Composite score {:.2} -> {} (confidence {:.1})",
            final_score,
            signal,
            confidence_score
        );

        TradeSignal {
            signal,
            confidence_score,
            final_score,
            factors,
        }
    }

    fn momentum_factor(&self, rsi: f64) -> FactorContribution {
        let sub_score = RSI_SUBSCORES.lookup(rsi);
        FactorContribution {
            factor_name: MOMENTUM_FACTOR.to_string(),
            score_impact: sub_score * self.weights.momentum,
            reason: format!("RSI is {:.1} ({})", rsi, RSI_ZONES.lookup(rsi)),
        }
    }

    fn trend_factor(&self, indicators: &IndicatorSet) -> FactorContribution {
        let regime = TrendRegime::classify(indicators);
        FactorContribution {
            factor_name: TREND_FACTOR.to_string(),
            score_impact: regime.sub_score() * self.weights.trend,
            reason: format!(
                "MACD {} Cross ({:.4} vs signal {:.4}), ADX {:.1}",
                if regime.is_bullish() { "Bullish" } else { "Bearish" },
                indicators.macd_line,
                indicators.signal_line,
                indicators.adx
            ),
        }
    }

    fn sentiment_factor(&self, sentiment: &SentimentScore) -> FactorContribution {
        let sub_score = if sentiment.score_normalized.is_finite() {
            sentiment.score_normalized.clamp(0.0, 100.0)
        } else {
            50.0
        };
        FactorContribution {
            factor_name: SENTIMENT_FACTOR.to_string(),
            score_impact: sub_score * self.weights.sentiment,
            reason: format!(
                "Sentiment {:.1}/100 (polarity {:.2}) from {} headlines",
                sub_score, sentiment.raw_polarity, sentiment.headline_count
            ),
        }
    }
}

/// Distance from the neutral midpoint mapped onto [50, 100].
pub fn confidence(final_score: f64) -> f64 {
    50.0 + (final_score - 50.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::SignalStrength;

    fn indicators(rsi: f64, bullish: bool, adx: f64) -> IndicatorSet {
        let (macd_line, signal_line) = if bullish { (1.2, 0.8) } else { (0.8, 1.2) };
        IndicatorSet {
            rsi,
            macd_line,
            signal_line,
            histogram: macd_line - signal_line,
            atr: 1.5,
            adx,
            volume_z_score: 0.3,
        }
    }

    fn sentiment(score: f64) -> SentimentScore {
        SentimentScore {
            score_normalized: score,
            raw_polarity: score / 50.0 - 1.0,
            headline_count: 5,
        }
    }

    fn impact(signal: &TradeSignal, name: &str) -> f64 {
        signal
            .factors
            .iter()
            .find(|f| f.factor_name == name)
            .map(|f| f.score_impact)
            .unwrap()
    }

    #[test]
    fn test_strong_buy_example() {
        let signal = ScoringEngine::new().score(&indicators(25.0, true, 30.0), &sentiment(90.0));

        assert!((impact(&signal, MOMENTUM_FACTOR) - 25.0).abs() < 1e-9);
        assert!((impact(&signal, TREND_FACTOR) - 35.0).abs() < 1e-9);
        assert!((impact(&signal, SENTIMENT_FACTOR) - 36.0).abs() < 1e-9);
        assert!((signal.final_score - 96.0).abs() < 1e-9);
        assert_eq!(signal.signal, SignalStrength::StrongBuy);
        assert!((signal.confidence_score - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_hold_boundary_example() {
        let signal = ScoringEngine::new().score(&indicators(50.0, false, 10.0), &sentiment(50.0));

        assert!((impact(&signal, MOMENTUM_FACTOR) - 12.5).abs() < 1e-9);
        assert!((impact(&signal, TREND_FACTOR) - 8.75).abs() < 1e-9);
        assert!((impact(&signal, SENTIMENT_FACTOR) - 20.0).abs() < 1e-9);
        assert!((signal.final_score - 41.25).abs() < 1e-9);
        assert_eq!(signal.signal, SignalStrength::Hold);
        assert!((signal.confidence_score - 58.75).abs() < 1e-9);
    }

    #[test]
    fn test_strong_sell() {
        let signal = ScoringEngine::new().score(&indicators(80.0, false, 40.0), &sentiment(10.0));
        assert!((signal.final_score - 4.0).abs() < 1e-9);
        assert_eq!(signal.signal, SignalStrength::StrongSell);
        assert!((signal.confidence_score - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_factor_order_and_reasons() {
        let signal = ScoringEngine::new().score(&indicators(72.34, true, 18.0), &sentiment(64.0));
        let names: Vec<&str> = signal.factors.iter().map(|f| f.factor_name.as_str()).collect();
        assert_eq!(names, vec![MOMENTUM_FACTOR, TREND_FACTOR, SENTIMENT_FACTOR]);

        assert_eq!(signal.factors[0].reason, "RSI is 72.3 (Overbought)");
        assert!(signal.factors[1].reason.starts_with("MACD Bullish Cross"));
        assert!(signal.factors[1].reason.ends_with("ADX 18.0"));
        assert!(signal.factors[2].reason.contains("64.0"));
        assert!(signal.factors[2].reason.contains("5 headlines"));
    }

    #[test]
    fn test_final_score_is_sum_of_impacts_and_bounded() {
        let engine = ScoringEngine::new();
        for rsi in [0.0, 15.0, 30.0, 35.0, 45.0, 60.0, 65.0, 70.0, 85.0, 100.0] {
            for bullish in [true, false] {
                for adx in [0.0, 20.0, 25.0, 26.0, 60.0] {
                    for score in [0.0, 12.5, 50.0, 77.7, 100.0] {
                        let signal = engine.score(&indicators(rsi, bullish, adx), &sentiment(score));
                        let sum: f64 = signal.factors.iter().map(|f| f.score_impact).sum();
                        assert!((signal.final_score - sum).abs() < 1e-6);
                        assert!((0.0..=100.0).contains(&signal.final_score));
                        assert!((50.0..=100.0).contains(&signal.confidence_score));
                    }
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_sentiment_is_clamped() {
        let engine = ScoringEngine::new();
        let high = engine.score(&indicators(50.0, true, 10.0), &sentiment(140.0));
        assert!((impact(&high, SENTIMENT_FACTOR) - 40.0).abs() < 1e-9);

        let nan = engine.score(&indicators(50.0, true, 10.0), &sentiment(f64::NAN));
        assert!((impact(&nan, SENTIMENT_FACTOR) - 20.0).abs() < 1e-9);
        assert!(nan.final_score.is_finite());
    }

    #[test]
    fn test_confidence_is_symmetric() {
        assert_eq!(confidence(50.0), 50.0);
        assert_eq!(confidence(70.0), confidence(30.0));
        assert_eq!(confidence(0.0), 100.0);
        assert_eq!(confidence(100.0), 100.0);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = FactorWeights::default();
        assert!((w.momentum + w.trend + w.sentiment - 1.0).abs() < 1e-12);
    }
}
