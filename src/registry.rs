//! Section registry: section id → last reported bounding rectangle.
//!
//! Pure bookkeeping. Section components report their rectangle on mount,
//! resize and every scroll tick; the resolver and controller read it back.

use log::debug;

use crate::section::{Rect, SectionList};

pub struct SectionRegistry {
    sections: SectionList,
    rects: Vec<Option<Rect>>,
    dirty: bool,
}

impl SectionRegistry {
    pub fn new(sections: SectionList) -> Self {
        let rects = vec![None; sections.len()];
        Self {
            sections,
            rects,
            dirty: false,
        }
    }

    /// Store (or clear, with `None`) the rectangle for `id`.
    ///
    /// Unknown ids are ignored: late-unmounting components may still report
    /// during teardown. Re-registering the same value leaves the registry clean.
    pub fn register(&mut self, id: &str, rect: Option<Rect>) {
        let Some(order) = self.sections.order_of(id) else {
            debug!("registry: ignoring unknown section '{id}'");
            return;
        };
        if self.rects[order] == rect {
            return;
        }
        self.rects[order] = rect;
        self.dirty = true;
    }

    /// Return whether anything changed since the last call, clearing the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn rect(&self, order: usize) -> Option<Rect> {
        self.rects.get(order).copied().flatten()
    }

    pub fn has_any_rect(&self) -> bool {
        self.rects.iter().any(Option::is_some)
    }

    pub fn sections(&self) -> &SectionList {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
