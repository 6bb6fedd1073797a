//! Progress smoother tests
//!
//! Covers the bootstrap, regression-guard, segment-advance, and easing paths.

use chrono::{DateTime, Duration, TimeZone, Utc};

use transit_planner::progress::{
    CONVERGENCE_WINDOW_MS, ProgressState, RawReading, smooth_progress,
};

// ============================================================================
// Test Fixtures
// ============================================================================

fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 27, 10, 0, 0).unwrap()
}

/// Builder for previous states with sensible defaults.
#[derive(Clone)]
struct TestState {
    state: ProgressState,
}

impl TestState {
    fn new() -> Self {
        Self {
            state: ProgressState {
                progress: 0.0,
                next_stop_seq: 1,
                next_stop_id: "stop-1".to_string(),
                prev_stop_seq: None,
                prev_stop_id: None,
                timestamp: base_now(),
            },
        }
    }

    fn progress(mut self, value: f64) -> Self {
        self.state.progress = value;
        self
    }

    fn segment(mut self, prev_seq: u32, next_seq: u32) -> Self {
        self.state.prev_stop_seq = Some(prev_seq);
        self.state.prev_stop_id = Some(format!("stop-{prev_seq}"));
        self.state.next_stop_seq = next_seq;
        self.state.next_stop_id = format!("stop-{next_seq}");
        self
    }

    fn age_ms(mut self, ms: i64) -> Self {
        self.state.timestamp = base_now() - Duration::milliseconds(ms);
        self
    }

    fn build(self) -> ProgressState {
        self.state
    }
}

fn reading(progress: f64, prev_seq: Option<u32>, next_seq: u32) -> RawReading {
    RawReading {
        progress,
        next_stop_seq: next_seq,
        next_stop_id: format!("stop-{next_seq}"),
        prev_stop_seq: prev_seq,
        prev_stop_id: prev_seq.map(|seq| format!("stop-{seq}")),
    }
}

fn assert_near(actual: f64, expected: f64, message: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{message} (expected ~{expected}, got {actual})"
    );
}

// ============================================================================
// Bootstrap
// ============================================================================

#[test]
fn first_observation_accepts_raw_reading() {
    let result = smooth_progress(reading(0.6, Some(2), 3), None, base_now());

    assert_near(result.progress, 0.6, "initial progress should accept raw reading");
    assert_eq!(result.next_stop_seq, 3);
    assert_eq!(result.next_stop_id, "stop-3");
    assert_eq!(result.prev_stop_seq, Some(2));
    assert_eq!(result.timestamp, base_now());
}

#[test]
fn first_observation_is_clamped() {
    let high = smooth_progress(reading(1.4, None, 1), None, base_now());
    assert_near(high.progress, 1.0, "raw above 1 should clamp");

    let low = smooth_progress(reading(-0.2, None, 1), None, base_now());
    assert_near(low.progress, 0.0, "raw below 0 should clamp");

    let nan = smooth_progress(reading(f64::NAN, None, 1), None, base_now());
    assert_near(nan.progress, 0.0, "NaN raw should clamp to 0");
}

// ============================================================================
// Sequence regression guard
// ============================================================================

#[test]
fn sequence_regression_is_ignored() {
    let previous = TestState::new()
        .segment(5, 6)
        .progress(0.55)
        .age_ms(3_000)
        .build();

    let result = smooth_progress(reading(0.25, Some(3), 4), Some(&previous), base_now());

    assert_near(result.progress, 0.55, "regression on stop seq should be ignored");
    assert_eq!(result.next_stop_seq, 6, "next stop seq should remain monotonic");
    assert_eq!(result.next_stop_id, "stop-6");
    assert_eq!(result.prev_stop_seq, Some(5));
    assert_eq!(
        result.timestamp,
        base_now(),
        "rejected reading should still refresh the timestamp"
    );
}

// ============================================================================
// Segment advance
// ============================================================================

#[test]
fn advancing_to_next_stop_snaps_to_raw() {
    let previous = TestState::new()
        .segment(5, 6)
        .progress(0.7)
        .age_ms(5_000)
        .build();

    let result = smooth_progress(reading(0.05, Some(6), 7), Some(&previous), base_now());

    assert_near(result.progress, 0.05, "progress should reset when bus advances");
    assert_eq!(result.next_stop_seq, 7);
    assert_eq!(result.next_stop_id, "stop-7");
    assert_eq!(result.prev_stop_seq, Some(6));
}

#[test]
fn advance_snaps_even_with_large_raw_value() {
    let previous = TestState::new()
        .segment(4, 5)
        .progress(0.9)
        .age_ms(5_000)
        .build();

    // No easing on a new segment, but clamping still applies.
    let result = smooth_progress(reading(2.5, Some(5), 6), Some(&previous), base_now());
    assert_near(result.progress, 1.0, "advance should snap to the clamped raw value");
    assert_eq!(result.next_stop_seq, 6);
}

// ============================================================================
// Same segment: no-advance path
// ============================================================================

#[test]
fn progress_does_not_regress_within_a_segment() {
    let previous = TestState::new()
        .segment(4, 5)
        .progress(0.4)
        .age_ms(5_000)
        .build();

    let result = smooth_progress(reading(0.1, Some(4), 5), Some(&previous), base_now());

    assert_near(result.progress, 0.4, "progress should not regress on same stop");
    assert_eq!(result.next_stop_seq, 5);
}

#[test]
fn equal_reading_is_a_no_op_that_refreshes_the_timestamp() {
    let previous = TestState::new()
        .segment(4, 5)
        .progress(0.4)
        .age_ms(10_000)
        .build();

    let result = smooth_progress(reading(0.4, Some(4), 5), Some(&previous), base_now());

    assert_near(result.progress, 0.4, "equal reading should hold position");
    assert_eq!(result.timestamp, base_now());

    // The refreshed timestamp feeds the next call's easing: half a window
    // later, a forward reading eases from the refresh, not the original age.
    let later = base_now() + Duration::milliseconds(CONVERGENCE_WINDOW_MS / 2);
    let next = smooth_progress(reading(0.8, Some(4), 5), Some(&result), later);
    assert_near(next.progress, 0.6, "easing should start from the refreshed timestamp");
}

#[test]
fn no_advance_keeps_known_prev_stop_when_reading_lacks_one() {
    let previous = TestState::new()
        .segment(4, 5)
        .progress(0.4)
        .age_ms(5_000)
        .build();

    let result = smooth_progress(reading(0.2, None, 5), Some(&previous), base_now());

    assert_eq!(result.prev_stop_seq, Some(4), "prev stop should fall back to the known value");
    assert_eq!(result.prev_stop_id.as_deref(), Some("stop-4"));
}

// ============================================================================
// Same segment: easing
// ============================================================================

#[test]
fn forward_reading_eases_instead_of_jumping() {
    let previous = TestState::new()
        .segment(3, 4)
        .progress(0.25)
        .age_ms(5_000)
        .build();

    let result = smooth_progress(reading(0.85, Some(3), 4), Some(&previous), base_now());

    assert!(result.progress > 0.25, "progress should advance forward");
    assert!(result.progress < 0.85, "easing should avoid instant jumps");
    // 5s of a 15s window: one third of the 0.6 delta.
    assert_near(result.progress, 0.45, "easing should be proportional to elapsed time");
}

#[test]
fn half_window_eases_halfway() {
    let previous = TestState::new()
        .segment(3, 4)
        .progress(0.2)
        .age_ms(CONVERGENCE_WINDOW_MS / 2)
        .build();

    let result = smooth_progress(reading(0.8, Some(3), 4), Some(&previous), base_now());
    assert_near(result.progress, 0.5, "half the window should cover half the delta");
}

#[test]
fn full_window_converges_to_raw() {
    let previous = TestState::new()
        .segment(3, 4)
        .progress(0.3)
        .age_ms(CONVERGENCE_WINDOW_MS)
        .build();

    let result = smooth_progress(reading(0.9, Some(3), 4), Some(&previous), base_now());
    assert_near(result.progress, 0.9, "a full window should converge to raw");
}

#[test]
fn long_gaps_converge_fully() {
    let previous = TestState::new()
        .segment(3, 4)
        .progress(0.3)
        .age_ms(60_000)
        .build();

    let result = smooth_progress(reading(0.9, Some(3), 4), Some(&previous), base_now());
    assert_near(result.progress, 0.9, "long gaps should allow full convergence");
}

#[test]
fn backdated_now_degrades_to_no_ease() {
    let previous = TestState::new().segment(3, 4).progress(0.3).build();

    // now is older than the previous timestamp; elapsed floors at zero.
    let earlier = base_now() - Duration::milliseconds(5_000);
    let result = smooth_progress(reading(0.9, Some(3), 4), Some(&previous), earlier);
    assert_near(result.progress, 0.3, "a backdated call should not move the position");
}

#[test]
fn smoothed_progress_always_stays_in_unit_range() {
    let previous = TestState::new()
        .segment(3, 4)
        .progress(0.95)
        .age_ms(60_000)
        .build();

    for raw in [-3.0, -0.01, 0.5, 0.999, 1.0, 1.5, 42.0, f64::NAN] {
        let result = smooth_progress(reading(raw, Some(3), 4), Some(&previous), base_now());
        assert!(
            (0.0..=1.0).contains(&result.progress),
            "progress {} out of range for raw {raw}",
            result.progress
        );
    }
}
