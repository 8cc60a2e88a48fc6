//! Ordered threshold tables for the step-function mappings.
//!
//! Rows are checked top to bottom and the first matching bound wins, so each
//! table reads exactly like the bucket list it implements.

use analysis_core::{IndicatorSet, SignalStrength};

/// One side of a bucket boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// `value < limit`
    Below(f64),
    /// `value <= limit`
    AtMost(f64),
    /// `value >= limit`
    AtLeast(f64),
}

impl Bound {
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Bound::Below(limit) => value < limit,
            Bound::AtMost(limit) => value <= limit,
            Bound::AtLeast(limit) => value >= limit,
        }
    }
}

/// First-match lookup table with a catch-all value
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTable<T: Copy + 'static> {
    pub rows: &'static [(Bound, T)],
    pub otherwise: T,
}

impl<T: Copy + 'static> ThresholdTable<T> {
    pub fn lookup(&self, value: f64) -> T {
        self.rows
            .iter()
            .find(|(bound, _)| bound.contains(value))
            .map(|(_, out)| *out)
            .unwrap_or(self.otherwise)
    }
}

/// RSI to momentum sub-score. Oversold is bullish.
///
/// `< 30 → 100`, `[30, 40) → 75`, `[40, 60] → 50`, `(60, 70] → 25`, `> 70 → 0`
pub const RSI_SUBSCORES: ThresholdTable<f64> = ThresholdTable {
    rows: &[
        (Bound::Below(30.0), 100.0),
        (Bound::Below(40.0), 75.0),
        (Bound::AtMost(60.0), 50.0),
        (Bound::AtMost(70.0), 25.0),
    ],
    otherwise: 0.0,
};

/// Composite score to signal label. Boundary values go to the more extreme bucket.
///
/// `>= 80 STRONG_BUY`, `[60, 80) BUY`, `(40, 60) HOLD`, `(20, 40] SELL`, `<= 20 STRONG_SELL`
pub const SIGNAL_LABELS: ThresholdTable<SignalStrength> = ThresholdTable {
    rows: &[
        (Bound::AtLeast(80.0), SignalStrength::StrongBuy),
        (Bound::AtLeast(60.0), SignalStrength::Buy),
        (Bound::AtMost(20.0), SignalStrength::StrongSell),
        (Bound::AtMost(40.0), SignalStrength::Sell),
    ],
    otherwise: SignalStrength::Hold,
};

/// RSI reading as described in factor reasons
pub const RSI_ZONES: ThresholdTable<&'static str> = ThresholdTable {
    rows: &[(Bound::Below(30.0), "Oversold"), (Bound::AtMost(70.0), "Neutral")],
    otherwise: "Overbought",
};

/// MACD direction combined with ADX trend strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendRegime {
    StrongBullish,
    Bullish,
    Bearish,
    StrongBearish,
}

impl TrendRegime {
    pub fn classify(set: &IndicatorSet) -> Self {
        match (set.is_macd_bullish(), set.is_strong_trend()) {
            (true, true) => TrendRegime::StrongBullish,
            (true, false) => TrendRegime::Bullish,
            (false, false) => TrendRegime::Bearish,
            (false, true) => TrendRegime::StrongBearish,
        }
    }

    pub fn sub_score(&self) -> f64 {
        match self {
            TrendRegime::StrongBullish => 100.0,
            TrendRegime::Bullish => 75.0,
            TrendRegime::Bearish => 25.0,
            TrendRegime::StrongBearish => 0.0,
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, TrendRegime::StrongBullish | TrendRegime::Bullish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(macd_line: f64, signal_line: f64, adx: f64) -> IndicatorSet {
        IndicatorSet {
            rsi: 50.0,
            macd_line,
            signal_line,
            histogram: macd_line - signal_line,
            atr: 1.0,
            adx,
            volume_z_score: 0.0,
        }
    }

    #[test]
    fn test_rsi_bucket_boundaries() {
        let cases = [
            (0.0, 100.0),
            (29.999, 100.0),
            (30.0, 75.0),
            (39.999, 75.0),
            (40.0, 50.0),
            (50.0, 50.0),
            (60.0, 50.0),
            (60.001, 25.0),
            (70.0, 25.0),
            (70.001, 0.0),
            (100.0, 0.0),
        ];
        for (rsi, expected) in cases {
            assert_eq!(RSI_SUBSCORES.lookup(rsi), expected, "rsi {}", rsi);
        }
    }

    #[test]
    fn test_label_boundaries() {
        let cases = [
            (100.0, SignalStrength::StrongBuy),
            (80.0, SignalStrength::StrongBuy),
            (79.999, SignalStrength::Buy),
            (60.0, SignalStrength::Buy),
            (59.999, SignalStrength::Hold),
            (41.25, SignalStrength::Hold),
            (40.001, SignalStrength::Hold),
            (40.0, SignalStrength::Sell),
            (20.001, SignalStrength::Sell),
            (20.0, SignalStrength::StrongSell),
            (0.0, SignalStrength::StrongSell),
        ];
        for (score, expected) in cases {
            assert_eq!(SIGNAL_LABELS.lookup(score), expected, "score {}", score);
        }
    }

    #[test]
    fn test_rsi_zones() {
        assert_eq!(RSI_ZONES.lookup(25.0), "Oversold");
        assert_eq!(RSI_ZONES.lookup(30.0), "Neutral");
        assert_eq!(RSI_ZONES.lookup(70.0), "Neutral");
        assert_eq!(RSI_ZONES.lookup(70.5), "Overbought");
    }

    #[test]
    fn test_trend_regimes() {
        assert_eq!(TrendRegime::classify(&indicators(1.0, 0.5, 30.0)), TrendRegime::StrongBullish);
        assert_eq!(TrendRegime::classify(&indicators(1.0, 0.5, 25.0)), TrendRegime::Bullish);
        assert_eq!(TrendRegime::classify(&indicators(0.5, 1.0, 10.0)), TrendRegime::Bearish);
        assert_eq!(TrendRegime::classify(&indicators(0.5, 1.0, 25.1)), TrendRegime::StrongBearish);
        // equal lines are not a bullish cross
        assert_eq!(TrendRegime::classify(&indicators(1.0, 1.0, 10.0)), TrendRegime::Bearish);
    }

    #[test]
    fn test_trend_sub_scores() {
        assert_eq!(TrendRegime::StrongBullish.sub_score(), 100.0);
        assert_eq!(TrendRegime::Bullish.sub_score(), 75.0);
        assert_eq!(TrendRegime::Bearish.sub_score(), 25.0);
        assert_eq!(TrendRegime::StrongBearish.sub_score(), 0.0);
    }
}
