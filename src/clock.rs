use std::time::Duration;

use crate::error::SearchError;

/// What we know about our remaining time when a search call arrives.
///
/// On the very first ply some frameworks deliver a search limit instead of
/// a clock reading, so "no time information yet" is an expected state and
/// must not be conflated with a zero clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// No usable clock reading yet (first ply).
    Unknown,
    /// Remaining time on our clock.
    Remaining(Duration),
}

impl ClockState {
    pub fn from_millis(remaining_ms: u64) -> ClockState {
        ClockState::Remaining(Duration::from_millis(remaining_ms))
    }
}

/// Default per-candidate evaluation slice.
pub const DEFAULT_BASE_SLICE: Duration = Duration::from_millis(100);

/// Largest share of the remaining clock one ply may spend on evaluation.
const MAX_CLOCK_SHARE: f64 = 0.1;

/// Budgets are strictly positive; never hand the engine a zero deadline.
/// Kept at nanosecond scale so the floor cannot inflate the total spend
/// past the clock-share cap in a time scramble.
const MIN_BUDGET: Duration = Duration::from_nanos(1);

/// Computes the per-candidate time slice for one search call.
///
/// With an unknown clock the base slice is returned unchanged, so the first
/// move is never starved. Otherwise the slice shrinks just enough that
/// evaluating every candidate stays within 10% of the remaining time.
pub fn allocate(
    clock: ClockState,
    legal_move_count: usize,
    base_slice: Duration,
) -> Result<Duration, SearchError> {
    if legal_move_count == 0 {
        return Err(SearchError::NoLegalMoves);
    }

    let slice = match clock {
        ClockState::Unknown => base_slice,
        ClockState::Remaining(left) => {
            let cap = left.as_secs_f64() * MAX_CLOCK_SHARE;
            if legal_move_count as f64 * base_slice.as_secs_f64() > cap {
                Duration::from_secs_f64(cap / legal_move_count as f64)
            } else {
                base_slice
            }
        }
    };

    Ok(slice.max(MIN_BUDGET))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_clock_returns_base_slice_exactly() {
        let budget = allocate(ClockState::Unknown, 40, DEFAULT_BASE_SLICE).unwrap();
        assert_eq!(budget, DEFAULT_BASE_SLICE);
    }

    #[test]
    fn base_slice_kept_when_cap_not_binding() {
        // 5 moves * 100ms = 0.5s, well under 10% of 60s.
        let budget = allocate(ClockState::from_millis(60_000), 5, DEFAULT_BASE_SLICE).unwrap();
        assert_eq!(budget, DEFAULT_BASE_SLICE);
    }

    #[test]
    fn slice_shrinks_to_tenth_of_remaining() {
        // 40 moves * 100ms = 4s against a 2s clock: cap is 0.2s total.
        let budget = allocate(ClockState::from_millis(2_000), 40, DEFAULT_BASE_SLICE).unwrap();
        assert_eq!(budget, Duration::from_millis(5));
    }

    #[test]
    fn total_spend_never_exceeds_clock_share() {
        // n * budget <= remaining/10, up to the 1ms positivity floor.
        let eps = 1e-9;
        for remaining_ms in [150u64, 1_000, 8_000, 60_000, 600_000] {
            for count in [1usize, 2, 20, 40, 80, 218] {
                let clock = ClockState::from_millis(remaining_ms);
                let budget = allocate(clock, count, DEFAULT_BASE_SLICE).unwrap();
                let spent = count as f64 * budget.as_secs_f64();
                let cap = remaining_ms as f64 / 1000.0 * MAX_CLOCK_SHARE;
                let floor = count as f64 * MIN_BUDGET.as_secs_f64();
                let base_total = count as f64 * DEFAULT_BASE_SLICE.as_secs_f64();
                assert!(
                    spent <= cap.min(base_total) + floor + eps,
                    "spent {spent}s with {count} moves and {remaining_ms}ms left"
                );
            }
        }
    }

    #[test]
    fn budget_stays_positive_even_with_tiny_clock() {
        let budget = allocate(ClockState::from_millis(1), 218, DEFAULT_BASE_SLICE).unwrap();
        assert!(budget > Duration::ZERO);
    }

    #[test]
    fn scramble_spend_respects_the_cap() {
        // 40 moves with 200ms left: the cap allows 20ms across all
        // candidates, and the positivity floor must not push past it.
        let budget = allocate(ClockState::from_millis(200), 40, DEFAULT_BASE_SLICE).unwrap();
        assert!(budget > Duration::ZERO);
        let spent = 40.0 * budget.as_secs_f64();
        assert!(spent <= 0.020 + 1e-6, "spent {spent}s");
    }

    #[test]
    fn zero_legal_moves_is_an_error() {
        let err = allocate(ClockState::from_millis(5_000), 0, DEFAULT_BASE_SLICE).unwrap_err();
        assert!(matches!(err, SearchError::NoLegalMoves));
    }
}
