//! Flow-rate conversions.
//!
//! Pure helpers between the human-facing "tokens per hour" rate and the
//! integer "smallest units per second" rate the streaming protocol expects.

/// Decimals of the streaming tokens used by the marketplace.
pub const DEFAULT_DECIMALS: usize = 18;

/// Most decimals a token amount can use: a `uint256` holds at most 78 digits.
pub const MAX_DECIMALS: usize = 77;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Convert a per-hour rate into a per-second rate. No rounding.
///
/// ```
/// use gpuflow_lib::rates::per_hour_to_per_sec;
///
/// assert_eq!(per_hour_to_per_sec(3600.0), 1.0);
/// ```
pub fn per_hour_to_per_sec(rate_per_hour: f64) -> f64 {
    rate_per_hour / SECONDS_PER_HOUR
}

/// Shift a decimal token amount into an integer string of smallest units.
///
/// The fractional part is right-padded with zeros and cut to `decimals`
/// digits, so excess digits are truncated rather than rounded. Leading
/// zeros are stripped and an empty result becomes `"0"`. `decimals` is
/// capped at [`MAX_DECIMALS`].
///
/// ```
/// use gpuflow_lib::rates::tokens_per_sec_to_flow_rate_wei;
///
/// assert_eq!(tokens_per_sec_to_flow_rate_wei("1", 18), "1000000000000000000");
/// assert_eq!(tokens_per_sec_to_flow_rate_wei("0.5", 2), "50");
/// assert_eq!(tokens_per_sec_to_flow_rate_wei("0", 18), "0");
/// ```
pub fn tokens_per_sec_to_flow_rate_wei(rate_per_sec: &str, decimals: usize) -> String {
    let mut parts = rate_per_sec.split('.');
    let integer = parts.next().filter(|i| !i.is_empty()).unwrap_or("0");
    let fraction = parts.next().unwrap_or("");
    let decimals = decimals.min(MAX_DECIMALS);

    let mut joined = String::with_capacity(integer.len() + decimals);
    joined.push_str(integer);
    joined.extend(fraction.chars().chain(std::iter::repeat('0')).take(decimals));

    let normalized = joined.trim_start_matches('0');
    if normalized.is_empty() {
        "0".to_string()
    } else {
        normalized.to_string()
    }
}

/// Convert an hourly token rate into the wei-per-second string for a listing.
///
/// The per-second rate is formatted with the shortest round-tripping decimal
/// representation before the fixed-point shift.
pub fn hourly_rate_to_flow_rate_wei(tokens_per_hour: f64, decimals: usize) -> String {
    let per_sec = per_hour_to_per_sec(tokens_per_hour);
    tokens_per_sec_to_flow_rate_wei(&per_sec.to_string(), decimals)
}

/// Approximate tokens per hour for a wei-per-second rate, for display.
pub fn flow_rate_wei_to_tokens_per_hour(flow_rate: u128, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    flow_rate as f64 / scale * SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decimals_are_capped() {
        let wei = tokens_per_sec_to_flow_rate_wei("1", usize::MAX);
        assert_eq!(wei.len(), MAX_DECIMALS + 1);
        assert!(wei.starts_with('1'));
        assert_eq!(hourly_rate_to_flow_rate_wei(3600.0, usize::MAX), wei);
        assert!(flow_rate_wei_to_tokens_per_hour(1, usize::MAX) > 0.0);
    }

    #[test]
    fn per_hour_divides_by_3600() {
        assert_eq!(per_hour_to_per_sec(3600.0), 1.0);
        assert_eq!(per_hour_to_per_sec(1.0), 1.0 / 3600.0);
        assert_eq!(per_hour_to_per_sec(0.0), 0.0);
    }

    #[test]
    fn whole_token_shifts_by_decimals() {
        assert_eq!(
            tokens_per_sec_to_flow_rate_wei("1", 18),
            format!("1{}", "0".repeat(18))
        );
    }

    #[test]
    fn fraction_is_truncated_not_rounded() {
        assert_eq!(
            tokens_per_sec_to_flow_rate_wei("0.000000277777777777", 18),
            "277777777777"
        );
        assert_eq!(
            tokens_per_sec_to_flow_rate_wei("0.0002777777777777778", 18),
            "277777777777777"
        );
        assert_eq!(tokens_per_sec_to_flow_rate_wei("0.999", 2), "99");
    }

    #[test]
    fn zero_and_empty_normalize() {
        assert_eq!(tokens_per_sec_to_flow_rate_wei("0", 18), "0");
        assert_eq!(tokens_per_sec_to_flow_rate_wei("", 18), "0");
        assert_eq!(tokens_per_sec_to_flow_rate_wei("0.0", 18), "0");
        assert_eq!(tokens_per_sec_to_flow_rate_wei(".5", 1), "5");
        assert_eq!(tokens_per_sec_to_flow_rate_wei("007", 0), "7");
    }

    #[test]
    fn extra_dot_segments_are_ignored() {
        assert_eq!(tokens_per_sec_to_flow_rate_wei("1.2.3", 2), "120");
    }

    #[test]
    fn hourly_rate_matches_seed_listing() {
        // 1 token/hour is the first demo listing's rate.
        assert_eq!(hourly_rate_to_flow_rate_wei(1.0, 18), "277777777777777");
        assert_eq!(hourly_rate_to_flow_rate_wei(0.5, 18), "138888888888888");
    }

    #[test]
    fn display_rate_round_trips_approximately() {
        let per_hour = flow_rate_wei_to_tokens_per_hour(277_777_777_777_777, 18);
        assert!((per_hour - 1.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn integer_input_gains_exactly_decimals_zeros(n in 1u64..u64::MAX, decimals in 0usize..30) {
            let out = tokens_per_sec_to_flow_rate_wei(&n.to_string(), decimals);
            prop_assert_eq!(out, format!("{}{}", n, "0".repeat(decimals)));
        }

        #[test]
        fn output_is_canonical_digits(int in "[0-9]{0,10}", frac in "[0-9]{0,30}", decimals in 0usize..24) {
            let out = tokens_per_sec_to_flow_rate_wei(&format!("{}.{}", int, frac), decimals);
            prop_assert!(out.chars().all(|c| c.is_ascii_digit()));
            prop_assert!(out == "0" || !out.starts_with('0'));
        }
    }
}
