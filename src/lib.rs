//! Boundary-triggered section paging for full-viewport single-page sites.
//!
//! The page is an ordered stack of sections, each one viewport tall. Wheel
//! and touch input scrolls normally inside a section; pushing past a
//! section's top or bottom edge accumulates into a discrete page turn.
//!
//! Data flow:
//!   host events → [`navigator::Navigator`] → [`controller::PageTurnController`]
//!   (reads [`registry::SectionRegistry`] + [`resolver`]) → `scroll_into_view`
//!   on the host → host re-registers rectangles → active section recomputed.

pub mod config;
pub mod controller;
pub mod input;
pub mod navigator;
pub mod registry;
pub mod replay;
pub mod resolver;
pub mod section;
pub mod sim;
pub mod watch;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebNavigator;
