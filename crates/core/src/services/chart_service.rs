use chrono::{DateTime, Datelike, Timelike};

use crate::models::chart::{ChartBar, ChartPeriod, RawBar};

/// Moving-average windows derived for every series, in bar counts.
const MA_WINDOWS: [usize; 4] = [5, 20, 60, 120];

/// Turns raw endpoint bars into the display-ready candle series.
///
/// The core computes everything the renderer needs — labels, rounded
/// prices, candle range, trailing moving averages — so the frontend only
/// draws. Derivation is pure and idempotent: the same raw input always
/// yields the same series, and a period switch recomputes from scratch
/// rather than patching.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Derive the candle + moving-average series for one holding's bars.
    ///
    /// Bars with a missing open or close are feed gaps and are dropped
    /// before anything else; moving-average indices count over the cleaned
    /// sequence. Empty input yields an empty series.
    #[must_use]
    pub fn derive_series(&self, raw: &[RawBar], period: ChartPeriod) -> Vec<ChartBar> {
        let mut bars: Vec<ChartBar> = raw
            .iter()
            .filter_map(|bar| {
                let open = bar.open?;
                let close = bar.close?;
                // A gap bar can also miss high/low; fall back to the
                // wider of open/close so the candle stays well-formed.
                let high = bar.high.unwrap_or_else(|| open.max(close));
                let low = bar.low.unwrap_or_else(|| open.min(close));

                let rounded_high = round2(high);
                let rounded_low = round2(low);

                Some(ChartBar {
                    label: bucket_label(bar.timestamp, period),
                    timestamp: bar.timestamp,
                    open: round2(open),
                    high: rounded_high,
                    low: rounded_low,
                    close: round2(close),
                    candle_range: rounded_high - rounded_low,
                    volume: bar.volume.unwrap_or(0),
                    is_up: close >= open,
                    ma5: None,
                    ma20: None,
                    ma60: None,
                    ma120: None,
                })
            })
            .collect();

        self.fill_moving_averages(&mut bars);
        bars
    }

    /// Trailing simple moving averages over close, one running sum per
    /// window. `ma[w]` at index `i` exists only when `i >= w − 1` and is
    /// the mean of the `w` closes ending at `i`, rounded to 2 decimals.
    /// Windows populate independently.
    fn fill_moving_averages(&self, bars: &mut [ChartBar]) {
        for window in MA_WINDOWS {
            let mut sum = 0.0;
            for i in 0..bars.len() {
                sum += bars[i].close;
                if i >= window {
                    sum -= bars[i - window].close;
                }
                if i + 1 >= window {
                    let ma = round2(sum / window as f64);
                    match window {
                        5 => bars[i].ma5 = Some(ma),
                        20 => bars[i].ma20 = Some(ma),
                        60 => bars[i].ma60 = Some(ma),
                        120 => bars[i].ma120 = Some(ma),
                        _ => unreachable!(),
                    }
                }
            }
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

/// `H:MM` for intraday buckets, `M/D` for daily ones. Formed in UTC — the
/// raw timestamp rides along on every bar for callers that localize.
fn bucket_label(timestamp: i64, period: ChartPeriod) -> String {
    let dt = DateTime::from_timestamp(timestamp, 0).unwrap_or_default();
    if period.is_intraday() {
        format!("{}:{:02}", dt.hour(), dt.minute())
    } else {
        format!("{}/{}", dt.month(), dt.day())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
