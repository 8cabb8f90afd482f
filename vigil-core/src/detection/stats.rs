//! Sliding-window statistics over event timelines.
//!
//! All functions take event timestamps in seconds, sorted ascending.

use serde::{Deserialize, Serialize};

/// For every event `i`, the number of events in `[t_i, t_i + window)`.
pub fn window_counts(times: &[f64], window: f64) -> Vec<usize> {
    let mut counts = Vec::with_capacity(times.len());
    let mut end = 0;
    for (i, &start) in times.iter().enumerate() {
        end = end.max(i);
        while end < times.len() && times[end] < start + window {
            end += 1;
        }
        counts.push(end - i);
    }
    counts
}

/// Highest windowed event count. Fewer than two events is a rate of zero.
pub fn max_rate(times: &[f64], window: f64) -> u32 {
    if times.len() < 2 {
        return 0;
    }
    window_counts(times, window)
        .into_iter()
        .max()
        .unwrap_or(0) as u32
}

/// A contiguous range in which the windowed count reached a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: f64,
    pub end: f64,
    /// Highest windowed count inside the period.
    pub peak: u32,
}

/// Merges the windows `[t_i, t_i + window]` whose count is at least `limit`
/// into contiguous periods, clamped to `[0, duration]`.
pub fn critical_periods(times: &[f64], window: f64, limit: u32, duration: f64) -> Vec<Period> {
    if times.len() < 2 || limit == 0 {
        return Vec::new();
    }

    let mut periods: Vec<Period> = Vec::new();
    for (&start, count) in times.iter().zip(window_counts(times, window)) {
        let count = count as u32;
        if count < limit {
            continue;
        }
        let end = (start + window).min(duration);
        match periods.last_mut() {
            Some(last) if start <= last.end => {
                last.end = last.end.max(end);
                last.peak = last.peak.max(count);
            }
            _ => periods.push(Period {
                start: start.max(0.0),
                end,
                peak: count,
            }),
        }
    }
    periods
}

/// Characterisation of inter-event intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalStats {
    /// `1 / mean interval`, in Hz
    pub dominant_frequency: f64,
    /// Population standard deviation of the intervals, in seconds
    pub interval_stddev: f64,
    /// `1 - min(1, stddev / mean)`; 1.0 is perfectly periodic
    pub regularity: f64,
}

/// `None` with fewer than two events or when every event shares one timestamp.
pub fn interval_stats(times: &[f64]) -> Option<IntervalStats> {
    if times.len() < 2 {
        return None;
    }
    let intervals: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
    let n = intervals.len() as f64;
    let mean = intervals.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return None;
    }
    let variance = intervals.iter().map(|i| (i - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    Some(IntervalStats {
        dominant_frequency: 1.0 / mean,
        interval_stddev: stddev,
        regularity: 1.0 - (stddev / mean).min(1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * step).collect()
    }

    #[test]
    fn test_window_is_half_open() {
        // 0.0, 0.5, 1.0: the event at exactly 1.0 is outside [0, 1)
        let times = [0.0, 0.5, 1.0];
        assert_eq!(window_counts(&times, 1.0), vec![2, 2, 1]);
    }

    #[test]
    fn test_max_rate_needs_two_events() {
        assert_eq!(max_rate(&[], 1.0), 0);
        assert_eq!(max_rate(&[0.3], 1.0), 0);
        assert_eq!(max_rate(&[0.3, 0.4], 1.0), 2);
        assert_eq!(max_rate(&ticks(16, 0.125), 1.0), 8);
    }

    #[test]
    fn test_critical_periods_merge_and_clamp() {
        let mut times = ticks(5, 0.1); // 0.0 .. 0.4
        times.extend([5.0, 5.1, 5.2]);
        let periods = critical_periods(&times, 1.0, 3, 5.5);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].start, 0.0);
        assert_eq!(periods[0].peak, 5);
        assert_eq!(periods[1].start, 5.0);
        assert_eq!(periods[1].end, 5.5);
        assert_eq!(periods[1].peak, 3);
    }

    #[test]
    fn test_interval_stats() {
        let stats = interval_stats(&ticks(11, 0.2)).unwrap();
        assert!((stats.dominant_frequency - 5.0).abs() < 1e-9);
        assert!(stats.interval_stddev < 1e-9);
        assert!((stats.regularity - 1.0).abs() < 1e-9);

        let irregular = interval_stats(&[0.0, 0.1, 1.0]).unwrap();
        assert!(irregular.regularity < 0.5);

        assert!(interval_stats(&[1.0]).is_none());
        assert!(interval_stats(&[1.0, 1.0]).is_none());
    }
}
