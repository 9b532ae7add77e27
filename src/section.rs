//! Section identities and viewport geometry.

use anyhow::{Result, bail};

/// The site's static section order.
pub const DEFAULT_SECTIONS: &[&str] = &["hero", "resume", "projects", "lab"];

/// Bounding rectangle of a section's root element, in viewport coordinates.
///
/// `top` is negative once the section has scrolled above the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Ordered, duplicate-free list of section ids.
///
/// A section's `order` is its index in this list; it is fixed at
/// construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionList {
    ids: Vec<String>,
}

impl SectionList {
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            bail!("section list is empty");
        }
        for (i, id) in ids.iter().enumerate() {
            if id.is_empty() {
                bail!("section {i} has an empty id");
            }
            if ids[..i].contains(id) {
                bail!("duplicate section id '{id}'");
            }
        }
        Ok(Self { ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn order_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|s| s == id)
    }

    pub fn id(&self, order: usize) -> Option<&str> {
        self.ids.get(order).map(String::as_str)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl Default for SectionList {
    fn default() -> Self {
        Self {
            ids: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
