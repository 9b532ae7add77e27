//! Property-based invariants of the resolver and page-turn controller.
//!
//! 1. Resolver order is non-decreasing as the page scrolls down
//! 2. A same-direction push at a boundary turns the page exactly once
//! 3. No two turns are ever issued within the lock window
//! 4. A reversal zeroes partial progress instead of netting it
//! 5. Away from a boundary every event passes through untouched

use std::time::Duration;

use proptest::prelude::*;
use slidenav::controller::{Disposition, PageTurnController, Tuning};
use slidenav::input::GestureInput;
use slidenav::registry::SectionRegistry;
use slidenav::resolver::resolve;
use slidenav::section::{Rect, SectionList};

const VH: f64 = 800.0;

fn registry_for(heights: &[f64], scroll_y: f64) -> SectionRegistry {
    let ids: Vec<String> = (0..heights.len()).map(|i| format!("s{i}")).collect();
    let mut reg = SectionRegistry::new(SectionList::new(ids.clone()).unwrap());
    let mut top = -scroll_y;
    for (id, h) in ids.iter().zip(heights) {
        reg.register(id, Some(Rect::new(top, top + h)));
        top += h;
    }
    reg
}

/// Three sections where the middle one exactly fills the viewport, so both
/// of its edges sit on a boundary.
fn middle_fills_viewport() -> SectionRegistry {
    registry_for(&[VH, VH, VH], VH)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

proptest! {
    #[test]
    fn resolver_is_monotonic(
        heights in prop::collection::vec(200.0f64..2000.0, 1..6),
        vh in 300.0f64..1200.0,
        mut scrolls in prop::collection::vec(0.0f64..10_000.0, 2..20),
    ) {
        scrolls.sort_by(f64::total_cmp);
        let mut prev = 0;
        for y in scrolls {
            let order = resolve(&registry_for(&heights, y), vh);
            prop_assert!(order >= prev, "order {order} < {prev} at scroll {y}");
            prev = order;
        }
    }

    #[test]
    fn single_trigger_per_gesture(
        deltas in prop::collection::vec(1.0f64..79.0, 1..40),
        gaps in prop::collection::vec(0u64..5, 40),
    ) {
        prop_assume!(deltas.iter().sum::<f64>() >= 80.0);
        let reg = registry_for(&[VH, VH, VH], 0.0);
        let mut c = PageTurnController::default();
        let mut t = 0;
        let mut turns = 0;
        for (d, gap) in deltas.iter().zip(&gaps) {
            t += gap;
            if let Disposition::Turn(_) = c.handle(GestureInput::Wheel(*d), &reg, VH, ms(t)) {
                turns += 1;
            }
        }
        prop_assert_eq!(turns, 1);
    }

    #[test]
    fn lock_excludes_second_turn(
        events in prop::collection::vec((-200.0f64..200.0, 0u64..400, any::<bool>()), 1..80),
    ) {
        let reg = middle_fills_viewport();
        let tuning = Tuning::default();
        let mut c = PageTurnController::new(tuning);
        let mut t = 0;
        let mut last_turn: Option<u64> = None;
        for (d, gap, touch) in events {
            t += gap;
            let input = if touch { GestureInput::Touch(d) } else { GestureInput::Wheel(d) };
            if let Disposition::Turn(_) = c.handle(input, &reg, VH, ms(t)) {
                if let Some(prev) = last_turn {
                    prop_assert!(t - prev >= tuning.lock.as_millis() as u64);
                }
                last_turn = Some(t);
            }
        }
    }

    #[test]
    fn reversal_resets_accumulator(
        back in -79.0f64..-0.5,
        forward in 0.5f64..79.0,
    ) {
        let reg = middle_fills_viewport();
        let mut c = PageTurnController::default();
        prop_assert_eq!(c.handle(GestureInput::Wheel(back), &reg, VH, ms(0)), Disposition::Consumed);
        prop_assert_eq!(c.handle(GestureInput::Wheel(forward), &reg, VH, ms(1)), Disposition::Consumed);
        prop_assert_eq!(c.accumulator(), forward);
    }

    #[test]
    fn off_boundary_passes_through(
        scroll in (VH + 16.0)..(2.0 * VH - 16.0),
        deltas in prop::collection::vec(-500.0f64..500.0, 1..20),
    ) {
        let reg = registry_for(&[VH, VH, VH], scroll);
        let mut c = PageTurnController::default();
        for (i, d) in deltas.into_iter().enumerate() {
            let now = ms(i as u64);
            prop_assert_eq!(c.handle(GestureInput::Wheel(d), &reg, VH, now), Disposition::PassThrough);
            prop_assert_eq!(c.accumulator(), 0.0);
        }
    }
}
