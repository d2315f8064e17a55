//! Property tests for the engine invariants.

use std::sync::Arc;

use clockwork_core::{Countdown, Event, Persistence, Stopwatch};
use proptest::prelude::*;

proptest! {
    #[test]
    fn countdown_decrements_by_one_and_completes_once(
        duration in 1u64..200,
        extra_ticks in 0usize..20,
        restarts in 0usize..4,
    ) {
        let mut cd = Countdown::new(duration);
        cd.start(0);
        let mut completions = 0;
        let mut prev = cd.remaining_secs();
        let total = duration as usize + extra_ticks;

        for i in 0..total {
            let now = (i as i64 + 1) * 1_000;
            if let Some(Event::CountdownCompleted { .. }) = cd.tick(now) {
                completions += 1;
            }
            if i < restarts {
                // Double-clicking start mid-run changes nothing.
                prop_assert!(cd.start(now).is_none() || !cd.is_running());
            }
            let rem = cd.remaining_secs();
            prop_assert!(rem <= prev);
            prop_assert!(prev - rem <= 1);
            prev = rem;
        }

        prop_assert_eq!(completions, 1);
        prop_assert_eq!(cd.remaining_secs(), 0);
        prop_assert!(!cd.is_running());
    }

    #[test]
    fn laps_are_kept_in_capture_order(gaps in proptest::collection::vec(0i64..5_000, 1..30)) {
        let mut sw = Stopwatch::new(Arc::new(Persistence::memory()));
        let mut now = 1_000;
        sw.start(now);
        let mut expected = Vec::new();
        for gap in gaps {
            now += gap;
            sw.lap(now);
            expected.push(sw.elapsed_ms());
        }
        prop_assert_eq!(sw.laps(), expected.as_slice());
        prop_assert!(sw.laps().windows(2).all(|w| w[0] <= w[1]));

        sw.reset(now);
        prop_assert!(sw.laps().is_empty());
    }

    #[test]
    fn stopwatch_elapsed_never_decreases(samples in proptest::collection::vec(-2_000i64..10_000, 1..50)) {
        let mut sw = Stopwatch::new(Arc::new(Persistence::memory()));
        sw.start(0);
        let mut last = 0;
        let mut now = 0;
        for step in samples {
            now += step;
            sw.sample(now);
            prop_assert!(sw.elapsed_ms() >= last);
            last = sw.elapsed_ms();
        }
    }
}
