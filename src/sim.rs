//! Simulated page: a vertical stack of sections under a fixed viewport.
//!
//! Stands in for the browser when replaying traces. Smooth scrolling is
//! modelled as an instant jump; the lock window covers the animation anyway.

use log::debug;

use crate::navigator::ScrollHost;
use crate::section::Rect;

pub struct SimulatedPage {
    heights: Vec<f64>,
    viewport_height: f64,
    scroll_y: f64,
    /// Every `scroll_into_view` command received, in order.
    pub commands: Vec<usize>,
}

impl SimulatedPage {
    pub fn new(heights: Vec<f64>, viewport_height: f64) -> Self {
        Self {
            heights,
            viewport_height,
            scroll_y: 0.0,
            commands: Vec::new(),
        }
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
        self.scroll_y = self.scroll_y.min(self.max_scroll());
    }

    pub fn document_height(&self) -> f64 {
        self.heights.iter().fold(0.0, |acc, h| acc + h)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    /// Offset of section `order`'s top from the document top.
    pub fn section_offset(&self, order: usize) -> f64 {
        // fold from +0.0: an empty f64 sum is -0.0
        self.heights.iter().take(order).fold(0.0, |acc, h| acc + h)
    }

    /// Native scroll by `delta` pixels, clamped to the document.
    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_y = (self.scroll_y + delta).clamp(0.0, self.max_scroll());
    }

    pub fn scroll_to_section(&mut self, order: usize) {
        let y = self.section_offset(order).min(self.max_scroll());
        debug!("sim: scroll_y {} → {y} (section {order})", self.scroll_y);
        self.scroll_y = y;
    }

    /// Current viewport rectangles, one per section.
    pub fn rects(&self) -> Vec<Rect> {
        let mut top = -self.scroll_y;
        self.heights
            .iter()
            .map(|h| {
                let rect = Rect::new(top, top + h);
                top += h;
                rect
            })
            .collect()
    }
}

impl ScrollHost for SimulatedPage {
    fn scroll_into_view(&mut self, order: usize, _id: &str) {
        self.commands.push(order);
        self.scroll_to_section(order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rects_follow_scroll() {
        let mut page = SimulatedPage::new(vec![800.0, 1200.0, 800.0], 800.0);
        page.scroll_by(1000.0);
        let rects = page.rects();
        assert_eq!(rects[0], Rect::new(-1000.0, -200.0));
        assert_eq!(rects[1], Rect::new(-200.0, 1000.0));
        assert_eq!(rects[2], Rect::new(1000.0, 1800.0));
    }

    #[test]
    fn scroll_is_clamped() {
        let mut page = SimulatedPage::new(vec![800.0, 800.0], 800.0);
        page.scroll_by(-50.0);
        assert_eq!(page.scroll_y(), 0.0);
        page.scroll_by(5000.0);
        assert_eq!(page.scroll_y(), 800.0);
    }

    #[test]
    fn first_section_offset_is_positive_zero() {
        let mut page = SimulatedPage::new(vec![800.0, 800.0], 800.0);
        page.scroll_by(300.0);
        page.scroll_to_section(0);
        assert_eq!(page.scroll_y(), 0.0);
        assert!(page.scroll_y().is_sign_positive());
        assert!(page.section_offset(0).is_sign_positive());
        assert!(SimulatedPage::new(vec![], 800.0).document_height().is_sign_positive());
    }

    #[test]
    fn scroll_into_view_records_and_jumps() {
        let mut page = SimulatedPage::new(vec![800.0, 800.0, 800.0], 800.0);
        page.scroll_into_view(2, "c");
        assert_eq!(page.commands, vec![2]);
        assert_eq!(page.scroll_y(), 1600.0);
    }
}
