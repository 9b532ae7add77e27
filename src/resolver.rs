//! Active-section resolution from cached geometry.

use log::debug;

use crate::registry::SectionRegistry;

/// Fraction of the viewport height a section's top must cross to become active.
pub const ACTIVE_LINE_RATIO: f64 = 0.5;

/// Resolve the active section's order.
///
/// Scans from the last section backwards and returns the first one whose top
/// has crossed the viewport midpoint, so the furthest-advanced section wins
/// during a fast transition. Sections with no rectangle are skipped; when
/// nothing qualifies the first section is active.
pub fn resolve(registry: &SectionRegistry, viewport_height: f64) -> usize {
    let line = viewport_height * ACTIVE_LINE_RATIO;
    (0..registry.len())
        .rev()
        .find(|&order| registry.rect(order).is_some_and(|r| r.top <= line))
        .unwrap_or(0)
}

/// A change of the active section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveChange {
    pub from: usize,
    pub to: usize,
}

/// Reactive "current active section" value for UI chrome.
///
/// Only reports a change when the resolved section actually differs.
#[derive(Debug, Default)]
pub struct ActiveSection {
    current: usize,
}

impl ActiveSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn refresh(
        &mut self,
        registry: &SectionRegistry,
        viewport_height: f64,
    ) -> Option<ActiveChange> {
        let to = resolve(registry, viewport_height);
        if to == self.current {
            return None;
        }
        let change = ActiveChange {
            from: self.current,
            to,
        };
        debug!("active section: {} → {}", change.from, change.to);
        self.current = to;
        Some(change)
    }

    pub fn is_active(&self, registry: &SectionRegistry, id: &str) -> bool {
        registry.sections().order_of(id) == Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{Rect, SectionList};

    const VH: f64 = 800.0;

    /// Register every default section stacked one viewport tall at `scroll_y`.
    fn stacked(scroll_y: f64) -> SectionRegistry {
        let mut reg = SectionRegistry::new(SectionList::default());
        let ids: Vec<String> = reg.sections().iter().map(String::from).collect();
        for (i, id) in ids.iter().enumerate() {
            let top = i as f64 * VH - scroll_y;
            reg.register(id, Some(Rect::new(top, top + VH)));
        }
        reg
    }

    #[test]
    fn empty_registry_resolves_first() {
        let reg = SectionRegistry::new(SectionList::default());
        assert_eq!(resolve(&reg, VH), 0);
    }

    #[test]
    fn top_of_page_is_first_section() {
        assert_eq!(resolve(&stacked(0.0), VH), 0);
    }

    #[test]
    fn midpoint_is_inclusive() {
        // resume's top sits exactly on the midpoint
        assert_eq!(resolve(&stacked(400.0), VH), 1);
        assert_eq!(resolve(&stacked(399.0), VH), 0);
    }

    #[test]
    fn furthest_advanced_section_wins() {
        assert_eq!(resolve(&stacked(1999.0), VH), 2);
        // lab's top lands exactly on the midpoint
        assert_eq!(resolve(&stacked(2000.0), VH), 3);
        assert_eq!(resolve(&stacked(2400.0), VH), 3);
    }

    #[test]
    fn missing_rects_are_skipped() {
        let mut reg = SectionRegistry::new(SectionList::default());
        reg.register("projects", Some(Rect::new(-50.0, 750.0)));
        assert_eq!(resolve(&reg, VH), 2);
    }

    #[test]
    fn tracker_reports_only_changes() {
        let mut active = ActiveSection::new();
        assert_eq!(active.refresh(&stacked(0.0), VH), None);
        assert_eq!(
            active.refresh(&stacked(800.0), VH),
            Some(ActiveChange { from: 0, to: 1 })
        );
        assert_eq!(active.refresh(&stacked(810.0), VH), None);
        assert!(active.is_active(&stacked(810.0), "resume"));
        assert!(!active.is_active(&stacked(810.0), "hero"));
    }
}
