//! Gesture-to-page-turn state machine.
//!
//! Three phases: Idle, Accumulating, Locked. Every wheel/touch delta is fed
//! through [`PageTurnController::handle`], which decides synchronously
//! whether the host should let the browser scroll, swallow the event, or
//! swallow it and smooth-scroll to a neighbouring section.
//!
//! Sign convention: `delta_y < 0` pushes toward the previous section,
//! `delta_y > 0` toward the next. Wheel and touch share one accumulator so
//! alternating between a trackpad and a touchscreen cannot double-trigger.
//!
//! The lock is a timestamp comparison against the host-supplied monotonic
//! clock; it expires on the first event after the deadline and needs no
//! timer to cancel.

use std::time::Duration;

use log::{debug, info};

use crate::input::GestureInput;
use crate::registry::SectionRegistry;
use crate::resolver::resolve;

pub const DEFAULT_THRESHOLD: f64 = 80.0;
pub const DEFAULT_LOCK: Duration = Duration::from_millis(800);
pub const DEFAULT_BOUNDARY_TOLERANCE: f64 = 15.0;

/// Fixed paging constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Accumulated magnitude needed to turn the page.
    pub threshold: f64,
    /// Input is ignored for this long after a turn; must outlast the
    /// host's smooth-scroll animation.
    pub lock: Duration,
    /// Max distance (px) between a section edge and the viewport edge for
    /// the section to count as "at the boundary".
    pub boundary_tolerance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            lock: DEFAULT_LOCK,
            boundary_tolerance: DEFAULT_BOUNDARY_TOLERANCE,
        }
    }
}

/// A single navigation command: scroll section `to` into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTurn {
    pub from: usize,
    pub to: usize,
}

/// What the host should do with the event that was just handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the browser scroll normally.
    PassThrough,
    /// Prevent the default scroll; nothing else to do.
    Consumed,
    /// Prevent the default scroll and scroll the target section into view.
    Turn(PageTurn),
}

impl Disposition {
    pub fn prevents_default(self) -> bool {
        !matches!(self, Disposition::PassThrough)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Accumulating,
    Locked,
}

pub struct PageTurnController {
    tuning: Tuning,
    accumulator: f64,
    lock_deadline: Option<Duration>,
}

impl PageTurnController {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            accumulator: 0.0,
            lock_deadline: None,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn is_locked(&self, now: Duration) -> bool {
        self.lock_deadline.is_some_and(|deadline| now < deadline)
    }

    pub fn phase(&self, now: Duration) -> Phase {
        if self.is_locked(now) {
            Phase::Locked
        } else if self.accumulator != 0.0 {
            Phase::Accumulating
        } else {
            Phase::Idle
        }
    }

    /// Handle one gesture delta at monotonic time `now`.
    pub fn handle(
        &mut self,
        input: GestureInput,
        registry: &SectionRegistry,
        viewport_height: f64,
        now: Duration,
    ) -> Disposition {
        if self.is_locked(now) {
            debug!("gesture: {input:?} swallowed (locked)");
            return Disposition::Consumed;
        }

        let idx = resolve(registry, viewport_height);
        let Some(rect) = registry.rect(idx) else {
            // Nothing registered for the active section yet.
            self.accumulator = 0.0;
            return Disposition::PassThrough;
        };

        let delta = input.delta_y();
        let tol = self.tuning.boundary_tolerance;
        let at_top = rect.top.abs() <= tol;
        let at_bottom = (viewport_height - rect.bottom).abs() <= tol;
        let last = registry.len() - 1;

        // Top/previous is checked first; a section short enough to satisfy
        // both edges resolves in favour of going back.
        if at_top && delta < 0.0 && idx > 0 {
            return self.push(delta, idx, idx - 1, now);
        }
        if at_bottom && delta > 0.0 && idx < last {
            return self.push(delta, idx, idx + 1, now);
        }

        if self.accumulator != 0.0 {
            debug!(
                "gesture: accumulator {:.1} reset (idx={idx}, at_top={at_top}, at_bottom={at_bottom}, delta={delta})",
                self.accumulator
            );
        }
        self.accumulator = 0.0;
        Disposition::PassThrough
    }

    fn push(&mut self, delta: f64, from: usize, to: usize, now: Duration) -> Disposition {
        // Direction reversal never inherits the opposite side's progress.
        if self.accumulator * delta < 0.0 {
            self.accumulator = 0.0;
        }
        self.accumulator += delta;
        debug!(
            "gesture: accumulating {:.1}/{} toward section {to}",
            self.accumulator, self.tuning.threshold
        );

        if self.accumulator.abs() < self.tuning.threshold {
            return Disposition::Consumed;
        }

        self.accumulator = 0.0;
        self.lock_deadline = Some(now.saturating_add(self.tuning.lock));
        info!(
            "page turn: section {from} → {to} (locked for {}ms)",
            self.tuning.lock.as_millis()
        );
        Disposition::Turn(PageTurn { from, to })
    }
}

impl Default for PageTurnController {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}
