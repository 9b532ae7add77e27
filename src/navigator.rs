//! Page-shell session: wires the registry, resolver and controller to a host.
//!
//! One `Navigator` lives as long as the page shell. It is passed around by
//! reference, never stored globally, so tests can build isolated copies.

use std::time::Duration;

use log::{debug, info};

use crate::controller::{Disposition, PageTurnController, Tuning};
use crate::input::{GestureInput, TouchTracker, WheelDeltaMode, normalize_wheel};
use crate::registry::SectionRegistry;
use crate::resolver::ActiveSection;
use crate::section::{Rect, SectionList};

/// The embedding environment (browser, simulator, test double).
pub trait ScrollHost {
    /// Smooth-scroll so that section `order` aligns with the viewport top.
    fn scroll_into_view(&mut self, order: usize, id: &str);

    /// Called whenever the active section changes.
    fn active_changed(&mut self, _order: usize, _id: &str) {}
}

pub struct Navigator<H: ScrollHost> {
    registry: SectionRegistry,
    active: ActiveSection,
    controller: PageTurnController,
    touch: TouchTracker,
    viewport_height: f64,
    host: H,
}

impl<H: ScrollHost> Navigator<H> {
    pub fn new(sections: SectionList, tuning: Tuning, viewport_height: f64, host: H) -> Self {
        info!(
            "navigator: {} sections, threshold={}, lock={}ms, tolerance={}px",
            sections.len(),
            tuning.threshold,
            tuning.lock.as_millis(),
            tuning.boundary_tolerance
        );
        Self {
            registry: SectionRegistry::new(sections),
            active: ActiveSection::new(),
            controller: PageTurnController::new(tuning),
            touch: TouchTracker::new(),
            viewport_height,
            host,
        }
    }

    pub fn register(&mut self, id: &str, rect: Option<Rect>) {
        self.registry.register(id, rect);
    }

    /// Recompute the active section if the registry changed since the last call.
    ///
    /// Hosts call this once per batch of registrations (a scroll tick).
    pub fn refresh(&mut self) {
        if self.registry.take_dirty() {
            self.refresh_active();
        }
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        if height != self.viewport_height {
            debug!("navigator: viewport height {} → {height}", self.viewport_height);
            self.viewport_height = height;
            self.refresh_active();
        }
    }

    pub fn wheel(&mut self, delta_y: f64, mode: WheelDeltaMode, now: Duration) -> Disposition {
        let delta = normalize_wheel(delta_y, mode, self.viewport_height);
        self.gesture(GestureInput::Wheel(delta), now)
    }

    pub fn touch_start(&mut self, y: f64) {
        self.touch.start(y);
    }

    /// Feed a finger position. Returns the drag delta and the decision for it,
    /// or `None` when no touch is in progress.
    pub fn touch_move(&mut self, y: f64, now: Duration) -> Option<(f64, Disposition)> {
        let delta = self.touch.move_to(y)?;
        Some((delta, self.gesture(GestureInput::Touch(delta), now)))
    }

    pub fn touch_end(&mut self) {
        self.touch.end();
    }

    /// Scroll straight to a named section (navigation dock click).
    ///
    /// Returns false for unknown ids. Not subject to the gesture lock.
    pub fn jump_to(&mut self, id: &str) -> bool {
        let Some(order) = self.registry.sections().order_of(id) else {
            debug!("navigator: jump to unknown section '{id}' ignored");
            return false;
        };
        info!("navigator: jump to section {order} ({id})");
        self.host.scroll_into_view(order, id);
        true
    }

    pub fn active_order(&self) -> usize {
        self.active.current()
    }

    pub fn active_id(&self) -> &str {
        self.registry
            .sections()
            .id(self.active.current())
            .unwrap_or_default()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.is_active(&self.registry, id)
    }

    pub fn sections(&self) -> &SectionList {
        self.registry.sections()
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &PageTurnController {
        &self.controller
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn gesture(&mut self, input: GestureInput, now: Duration) -> Disposition {
        let disposition = self
            .controller
            .handle(input, &self.registry, self.viewport_height, now);
        if let Disposition::Turn(turn) = disposition
            && let Some(id) = self.registry.sections().id(turn.to)
        {
            self.host.scroll_into_view(turn.to, id);
        }
        disposition
    }

    fn refresh_active(&mut self) {
        if let Some(change) = self.active.refresh(&self.registry, self.viewport_height)
            && let Some(id) = self.registry.sections().id(change.to)
        {
            self.host.active_changed(change.to, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PageTurn;

    const VH: f64 = 800.0;

    #[derive(Default)]
    struct Recorder {
        scrolls: Vec<(usize, String)>,
        actives: Vec<String>,
    }

    impl ScrollHost for Recorder {
        fn scroll_into_view(&mut self, order: usize, id: &str) {
            self.scrolls.push((order, id.to_string()));
        }

        fn active_changed(&mut self, _order: usize, id: &str) {
            self.actives.push(id.to_string());
        }
    }

    fn navigator() -> Navigator<Recorder> {
        Navigator::new(
            SectionList::default(),
            Tuning::default(),
            VH,
            Recorder::default(),
        )
    }

    fn layout(nav: &mut Navigator<Recorder>, scroll_y: f64) {
        let ids: Vec<String> = nav.sections().iter().map(String::from).collect();
        for (i, id) in ids.iter().enumerate() {
            let top = i as f64 * VH - scroll_y;
            nav.register(id, Some(Rect::new(top, top + VH)));
        }
        nav.refresh();
    }

    #[test]
    fn turn_issues_exactly_one_scroll() {
        let mut nav = navigator();
        layout(&mut nav, 0.0);
        let mut turns = 0;
        for i in 0..6 {
            let d = nav.wheel(30.0, WheelDeltaMode::Pixel, Duration::from_millis(i * 10));
            if matches!(d, Disposition::Turn(_)) {
                turns += 1;
            }
        }
        assert_eq!(turns, 1);
        assert_eq!(nav.host().scrolls, vec![(1, "resume".to_string())]);
    }

    #[test]
    fn active_change_is_reported_once() {
        let mut nav = navigator();
        layout(&mut nav, 0.0);
        assert!(nav.host().actives.is_empty());
        layout(&mut nav, 800.0);
        layout(&mut nav, 805.0);
        assert_eq!(nav.host().actives, vec!["resume".to_string()]);
        assert_eq!(nav.active_id(), "resume");
        assert!(nav.is_active("resume"));
    }

    #[test]
    fn touch_gesture_turns_page() {
        let mut nav = navigator();
        layout(&mut nav, 0.0);
        nav.touch_start(600.0);
        assert_eq!(
            nav.touch_move(550.0, Duration::ZERO),
            Some((50.0, Disposition::Consumed))
        );
        assert_eq!(
            nav.touch_move(500.0, Duration::from_millis(16)),
            Some((50.0, Disposition::Turn(PageTurn { from: 0, to: 1 })))
        );
        nav.touch_end();
        assert_eq!(nav.touch_move(100.0, Duration::from_secs(5)), None);
    }

    #[test]
    fn touch_move_reports_drag_delta() {
        let mut nav = navigator();
        // mid-section: nothing is consumed, the delta drives native scroll
        layout(&mut nav, 1200.0);
        assert_eq!(nav.touch_move(300.0, Duration::ZERO), None);
        nav.touch_start(300.0);
        assert_eq!(
            nav.touch_move(340.0, Duration::ZERO),
            Some((-40.0, Disposition::PassThrough))
        );
        assert_eq!(
            nav.touch_move(310.0, Duration::from_millis(16)),
            Some((30.0, Disposition::PassThrough))
        );
    }

    #[test]
    fn line_mode_wheel_is_scaled() {
        let mut nav = navigator();
        layout(&mut nav, 0.0);
        // 5 lines * 16px = 80px reaches the threshold in one event
        assert!(matches!(
            nav.wheel(5.0, WheelDeltaMode::Line, Duration::ZERO),
            Disposition::Turn(_)
        ));
    }

    #[test]
    fn jump_to_named_section() {
        let mut nav = navigator();
        assert!(nav.jump_to("projects"));
        assert!(!nav.jump_to("blog"));
        assert_eq!(nav.host().scrolls, vec![(2, "projects".to_string())]);
    }

    #[test]
    fn viewport_change_refreshes_active() {
        let mut nav = navigator();
        layout(&mut nav, 300.0);
        assert_eq!(nav.active_id(), "hero");
        // resume's top (500) crosses the midpoint of a taller viewport
        nav.set_viewport_height(1000.0);
        assert_eq!(nav.active_id(), "resume");
    }

    #[test]
    fn gestures_before_registration_pass_through() {
        let mut nav = navigator();
        assert_eq!(
            nav.wheel(1000.0, WheelDeltaMode::Pixel, Duration::ZERO),
            Disposition::PassThrough
        );
        assert!(nav.host().scrolls.is_empty());
    }
}
