use analysis_core::stats;

/// RSI reported when the averages are not yet defined or the ratio is 0/0.
pub const RSI_NEUTRAL: f64 = 50.0;

/// ATR reported before `window` bars are available.
pub const ATR_DEFAULT: f64 = 0.0;

/// ADX reported before the directional index has been smoothed over `window` values.
pub const ADX_DEFAULT: f64 = 0.0;

/// Volume z-score reported for short windows or flat volume.
pub const VOLUME_Z_DEFAULT: f64 = 0.0;

/// Exponentially weighted running average updated one observation at a time:
/// `s_t = s_{t-1} + alpha * (x_t - s_{t-1})`, seeded by the first observation.
///
/// The smoothed value is only reported once `min_periods` observations have
/// been seen.
#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    alpha: f64,
    min_periods: usize,
    value: Option<f64>,
    count: usize,
}

impl Smoother {
    /// Wilder smoothing: `alpha = 1 / window`, defined after `window` observations.
    pub fn wilder(window: usize) -> Self {
        let window = window.max(1);
        Self {
            alpha: 1.0 / window as f64,
            min_periods: window,
            value: None,
            count: 0,
        }
    }

    /// Span EMA: `alpha = 2 / (span + 1)`, defined from the first observation.
    pub fn span(span: usize) -> Self {
        Self {
            alpha: 2.0 / (span.max(1) as f64 + 1.0),
            min_periods: 1,
            value: None,
            count: 0,
        }
    }

    /// Fold in one observation and return the running value, ignoring the
    /// minimum-period gate.
    pub fn update(&mut self, x: f64) -> f64 {
        let next = match self.value {
            Some(prev) => prev + self.alpha * (x - prev),
            None => x,
        };
        self.value = Some(next);
        self.count += 1;
        next
    }

    /// The smoothed value, or `None` while fewer than `min_periods`
    /// observations have been seen.
    pub fn value(&self) -> Option<f64> {
        if self.count >= self.min_periods {
            self.value
        } else {
            None
        }
    }
}

/// Relative Strength Index with Wilder smoothing.
///
/// The first bar contributes a change of zero. Returns [`RSI_NEUTRAL`] while
/// fewer than `window` changes have been observed or when both averages are
/// zero, and 100 when only gains have been seen.
pub fn rsi(closes: &[f64], window: usize) -> f64 {
    let mut avg_gain = Smoother::wilder(window);
    let mut avg_loss = Smoother::wilder(window);

    let mut prev: Option<f64> = None;
    for &close in closes {
        let change = prev.map_or(0.0, |p| close - p);
        avg_gain.update(change.max(0.0));
        avg_loss.update((-change).max(0.0));
        prev = Some(close);
    }

    match (avg_gain.value(), avg_loss.value()) {
        (Some(gain), Some(loss)) => rsi_from_averages(gain, loss),
        _ => RSI_NEUTRAL,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        // RS is unbounded with pure gains and 0/0 with no movement at all.
        return if avg_gain > 0.0 { 100.0 } else { RSI_NEUTRAL };
    }

    let rs = avg_gain / avg_loss;
    let value = 100.0 - (100.0 / (1.0 + rs));
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        RSI_NEUTRAL
    }
}

/// MACD (Moving Average Convergence Divergence), trailing values
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacdResult {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

/// MACD from span EMAs seeded by the first close, with no minimum-period gate.
pub fn macd(closes: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    let mut ema_fast = Smoother::span(fast_period);
    let mut ema_slow = Smoother::span(slow_period);
    let mut ema_signal = Smoother::span(signal_period);

    let mut result = MacdResult::default();
    for &close in closes {
        let macd_line = ema_fast.update(close) - ema_slow.update(close);
        let signal_line = ema_signal.update(macd_line);
        result = MacdResult {
            macd_line,
            signal_line,
            histogram: macd_line - signal_line,
        };
    }
    result
}

/// Per-bar true range. The first bar has no previous close, so its range is
/// `high - low`. Series are read up to the length of the shortest one.
pub fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    (0..n)
        .map(|i| {
            let high_low = highs[i] - lows[i];
            if i == 0 {
                return high_low;
            }
            let high_close = (highs[i] - closes[i - 1]).abs();
            let low_close = (lows[i] - closes[i - 1]).abs();
            high_low.max(high_close).max(low_close)
        })
        .collect()
}

/// Average True Range with Wilder smoothing; [`ATR_DEFAULT`] before `window` bars.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], window: usize) -> f64 {
    let mut smoothed = Smoother::wilder(window);
    for tr in true_ranges(highs, lows, closes) {
        smoothed.update(tr);
    }
    smoothed.value().unwrap_or(ATR_DEFAULT)
}

/// Directional movement for bar `i` relative to bar `i - 1`.
fn directional_movement(highs: &[f64], lows: &[f64], i: usize) -> (f64, f64) {
    if i == 0 {
        return (0.0, 0.0);
    }
    let up_move = highs[i] - highs[i - 1];
    let down_move = lows[i - 1] - lows[i];

    let plus_dm = if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 };
    let minus_dm = if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 };
    (plus_dm, minus_dm)
}

/// DX from smoothed directional movement and true range. A zero range or a
/// zero DI sum yields 0.
fn directional_index(plus_dm: f64, minus_dm: f64, true_range: f64) -> f64 {
    if true_range <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_dm / true_range;
    let minus_di = 100.0 * minus_dm / true_range;

    let di_sum = plus_di + minus_di;
    if di_sum <= 0.0 {
        return 0.0;
    }
    let dx = 100.0 * (plus_di - minus_di).abs() / di_sum;
    if dx.is_finite() { dx } else { 0.0 }
}

/// Average Directional Index (ADX), trend strength on a 0-100 scale.
///
/// DX becomes available once the smoothed +DM, -DM and true range are defined
/// (`window` bars); ADX is the Wilder-smoothed DX and needs a further
/// `window - 1` bars. Returns [`ADX_DEFAULT`] before that.
pub fn adx(highs: &[f64], lows: &[f64], closes: &[f64], window: usize) -> f64 {
    let ranges = true_ranges(highs, lows, closes);

    let mut smoothed_tr = Smoother::wilder(window);
    let mut smoothed_plus_dm = Smoother::wilder(window);
    let mut smoothed_minus_dm = Smoother::wilder(window);
    let mut smoothed_dx = Smoother::wilder(window);

    for (i, &tr) in ranges.iter().enumerate() {
        let (plus_dm, minus_dm) = directional_movement(highs, lows, i);
        smoothed_tr.update(tr);
        smoothed_plus_dm.update(plus_dm);
        smoothed_minus_dm.update(minus_dm);

        if let (Some(tr_s), Some(plus_s), Some(minus_s)) =
            (smoothed_tr.value(), smoothed_plus_dm.value(), smoothed_minus_dm.value())
        {
            smoothed_dx.update(directional_index(plus_s, minus_s, tr_s));
        }
    }

    smoothed_dx
        .value()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
        .unwrap_or(ADX_DEFAULT)
}

/// Z-score of the latest volume against the trailing `window` volumes
/// (current bar included), using the sample standard deviation.
pub fn volume_z_score(volumes: &[f64], window: usize) -> f64 {
    if window < 2 || volumes.len() < window {
        return VOLUME_Z_DEFAULT;
    }
    let recent = &volumes[volumes.len() - window..];
    let current = recent[recent.len() - 1];
    stats::z_score_of(current, recent)
}
