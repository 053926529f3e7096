/// Throughput over the whole trial. Incorrect words count as attempts too.
pub fn words_per_minute(correct: u32, incorrect: u32, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    f64::from(correct + incorrect) * (60.0 / duration_secs)
}

/// Share of committed words that matched, as a percentage.
pub fn accuracy(correct: u32, incorrect: u32) -> f64 {
    let total = correct + incorrect;
    match total {
        0 => 0.0,
        _ => f64::from(correct) / f64::from(total) * 100.0,
    }
}

/// Display rounding only; keep the unrounded value for anything else.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wpm_counts_all_attempts() {
        assert_eq!(words_per_minute(10, 2, 30.0), 24.0);
        assert_eq!(words_per_minute(1, 1, 30.0), 4.0);
    }

    #[test]
    fn test_wpm_other_durations() {
        assert_eq!(words_per_minute(5, 0, 60.0), 5.0);
        assert_eq!(words_per_minute(3, 0, 15.0), 12.0);
    }

    #[test]
    fn test_wpm_zero_duration() {
        assert_eq!(words_per_minute(3, 4, 0.0), 0.0);
    }

    #[test]
    fn test_accuracy_guard() {
        assert_eq!(accuracy(0, 0), 0.0);
    }

    #[test]
    fn test_accuracy_values() {
        assert_eq!(accuracy(1, 1), 50.0);
        assert_eq!(accuracy(4, 0), 100.0);
        assert_eq!(accuracy(0, 3), 0.0);
    }

    #[test]
    fn test_accuracy_keeps_precision() {
        let acc = accuracy(1, 2);
        assert!((acc - 33.333333333333336).abs() < 1e-12);
        assert_eq!(round_to(acc, 2), 33.33);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(66.666, 2), 66.67);
        assert_eq!(round_to(50.0, 2), 50.0);
    }
}
