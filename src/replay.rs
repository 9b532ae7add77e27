//! Gesture trace replay against a simulated page.
//!
//! A trace is a TOML file describing the page (viewport height, section
//! heights) and a timeline of input events. Replaying feeds each event to a
//! [`Navigator`] driving a [`SimulatedPage`]: events the navigator lets
//! through scroll the page natively, page turns jump to the target section,
//! and after every event all rectangles are re-registered like a browser
//! scroll tick would.
//!
//! A trace without `[[section]]` tables lays out the configured section
//! list, each section one viewport tall.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;

use crate::controller::{Disposition, PageTurn, Tuning};
use crate::input::{WheelDeltaMode, normalize_wheel};
use crate::navigator::Navigator;
use crate::section::SectionList;
use crate::sim::SimulatedPage;

// ---------------------------------------------------------------------------
// TraceFile — deserialized from TOML (per-kind fields optional)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct TraceFile {
    pub viewport_height: f64,
    #[serde(default)]
    pub start_section: Option<String>,
    #[serde(rename = "section", default)]
    pub sections: Vec<SectionEntry>,
    #[serde(rename = "event", default)]
    pub events: Vec<EventEntry>,
}

#[derive(Deserialize)]
pub struct SectionEntry {
    pub id: String,
    pub height: f64,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
    Jump,
    Resize,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeltaModeName {
    #[default]
    Pixel,
    Line,
    Page,
}

impl From<DeltaModeName> for WheelDeltaMode {
    fn from(m: DeltaModeName) -> Self {
        match m {
            DeltaModeName::Pixel => WheelDeltaMode::Pixel,
            DeltaModeName::Line => WheelDeltaMode::Line,
            DeltaModeName::Page => WheelDeltaMode::Page,
        }
    }
}

#[derive(Deserialize)]
pub struct EventEntry {
    pub at_ms: u64,
    pub kind: EventKind,
    pub delta_y: Option<f64>,
    #[serde(default)]
    pub delta_mode: DeltaModeName,
    pub y: Option<f64>,
    pub target: Option<String>,
    pub height: Option<f64>,
}

// ---------------------------------------------------------------------------
// Trace — validated
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum TraceAction {
    Wheel { delta_y: f64, mode: WheelDeltaMode },
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd,
    Jump { target: String },
    Resize { height: f64 },
}

impl fmt::Display for TraceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceAction::Wheel { delta_y, mode } => match mode {
                WheelDeltaMode::Pixel => write!(f, "wheel {delta_y:+}"),
                WheelDeltaMode::Line => write!(f, "wheel {delta_y:+} lines"),
                WheelDeltaMode::Page => write!(f, "wheel {delta_y:+} pages"),
            },
            TraceAction::TouchStart { y } => write!(f, "touch start y={y}"),
            TraceAction::TouchMove { y } => write!(f, "touch move y={y}"),
            TraceAction::TouchEnd => write!(f, "touch end"),
            TraceAction::Jump { target } => write!(f, "jump {target}"),
            TraceAction::Resize { height } => write!(f, "resize {height}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub at: Duration,
    pub action: TraceAction,
}

pub struct Trace {
    pub viewport_height: f64,
    pub sections: SectionList,
    pub heights: Vec<f64>,
    pub start_section: usize,
    pub events: Vec<TraceEvent>,
}

impl Trace {
    /// Parse a trace. `fallback` supplies the sections when the trace lists none.
    pub fn from_toml_str(text: &str, fallback: &SectionList) -> Result<Self> {
        let file: TraceFile = toml::from_str(text).context("failed to parse trace")?;
        file.resolve(fallback)
    }

    pub fn load(path: &Path, fallback: &SectionList) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text, fallback)
            .with_context(|| format!("invalid trace {}", path.display()))
    }
}

impl TraceFile {
    pub fn resolve(self, fallback: &SectionList) -> Result<Trace> {
        if !is_positive(self.viewport_height) {
            bail!("viewport_height must be positive, got {}", self.viewport_height);
        }
        let (sections, heights) = if self.sections.is_empty() {
            debug!("trace: no sections listed, using {} configured", fallback.len());
            (fallback.clone(), vec![self.viewport_height; fallback.len()])
        } else {
            let sections = SectionList::new(self.sections.iter().map(|s| s.id.clone()))?;
            let mut heights = Vec::with_capacity(self.sections.len());
            for s in &self.sections {
                if !is_positive(s.height) {
                    bail!("section '{}' height must be positive, got {}", s.id, s.height);
                }
                heights.push(s.height);
            }
            (sections, heights)
        };
        let start_section = match &self.start_section {
            None => 0,
            Some(id) => sections
                .order_of(id)
                .ok_or_else(|| anyhow::anyhow!("unknown start_section '{id}'"))?,
        };

        let mut events = Vec::with_capacity(self.events.len());
        let mut last_ms = 0;
        for (i, e) in self.events.into_iter().enumerate() {
            if e.at_ms < last_ms {
                bail!("event {i}: at_ms {} goes back in time (previous {last_ms})", e.at_ms);
            }
            last_ms = e.at_ms;
            let action = match e.kind {
                EventKind::Wheel => TraceAction::Wheel {
                    delta_y: finite(require(e.delta_y, i, "delta_y")?, i, "delta_y")?,
                    mode: e.delta_mode.into(),
                },
                EventKind::TouchStart => TraceAction::TouchStart {
                    y: finite(require(e.y, i, "y")?, i, "y")?,
                },
                EventKind::TouchMove => TraceAction::TouchMove {
                    y: finite(require(e.y, i, "y")?, i, "y")?,
                },
                EventKind::TouchEnd => TraceAction::TouchEnd,
                EventKind::Jump => TraceAction::Jump {
                    target: require(e.target, i, "target")?,
                },
                EventKind::Resize => {
                    let height = require(e.height, i, "height")?;
                    if !is_positive(height) {
                        bail!("event {i}: resize height must be positive, got {height}");
                    }
                    TraceAction::Resize { height }
                }
            };
            events.push(TraceEvent {
                at: Duration::from_millis(e.at_ms),
                action,
            });
        }

        Ok(Trace {
            viewport_height: self.viewport_height,
            sections,
            heights,
            start_section,
            events,
        })
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn require<T>(value: Option<T>, index: usize, field: &str) -> Result<T> {
    value.ok_or_else(|| anyhow::anyhow!("event {index}: missing '{field}'"))
}

fn finite(value: f64, index: usize, field: &str) -> Result<f64> {
    if !value.is_finite() {
        bail!("event {index}: '{field}' must be finite, got {value}");
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Outcome of one replayed event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub at: Duration,
    pub action: TraceAction,
    /// `None` for events that carry no gesture delta (touch start/end, jump, resize).
    pub disposition: Option<Disposition>,
    pub active: String,
    pub scroll_y: f64,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.disposition {
            None => "-".to_string(),
            Some(Disposition::PassThrough) => "pass".to_string(),
            Some(Disposition::Consumed) => "consumed".to_string(),
            Some(Disposition::Turn(t)) => format!("turn {} → {}", t.from, t.to),
        };
        let action = self.action.to_string();
        write!(
            f,
            "{:>6}ms  {:<22} {:<14} active={:<10} scroll_y={}",
            self.at.as_millis(),
            action,
            outcome,
            self.active,
            self.scroll_y
        )
    }
}

pub struct ReplayReport {
    pub events: Vec<EventRecord>,
    pub turns: Vec<(Duration, PageTurn)>,
    pub final_active: String,
    pub final_scroll_y: f64,
}

pub fn replay(trace: &Trace, tuning: Tuning) -> ReplayReport {
    let page = SimulatedPage::new(trace.heights.clone(), trace.viewport_height);
    let mut nav = Navigator::new(trace.sections.clone(), tuning, trace.viewport_height, page);
    nav.host_mut().scroll_to_section(trace.start_section);
    sync(&mut nav);

    let mut records = Vec::with_capacity(trace.events.len());
    let mut turns = Vec::new();

    for event in &trace.events {
        let now = event.at;
        let disposition = match &event.action {
            TraceAction::Wheel { delta_y, mode } => {
                let d = nav.wheel(*delta_y, *mode, now);
                if d == Disposition::PassThrough {
                    let px = normalize_wheel(*delta_y, *mode, nav.viewport_height());
                    nav.host_mut().scroll_by(px);
                }
                Some(d)
            }
            TraceAction::TouchStart { y } => {
                nav.touch_start(*y);
                None
            }
            TraceAction::TouchMove { y } => {
                // a move with no touch in progress has nothing to drag
                let (delta, d) = nav
                    .touch_move(*y, now)
                    .unwrap_or((0.0, Disposition::PassThrough));
                if d == Disposition::PassThrough {
                    nav.host_mut().scroll_by(delta);
                }
                Some(d)
            }
            TraceAction::TouchEnd => {
                nav.touch_end();
                None
            }
            TraceAction::Jump { target } => {
                nav.jump_to(target);
                None
            }
            TraceAction::Resize { height } => {
                nav.host_mut().set_viewport_height(*height);
                nav.set_viewport_height(*height);
                None
            }
        };
        if let Some(Disposition::Turn(turn)) = disposition {
            turns.push((now, turn));
        }
        sync(&mut nav);

        let record = EventRecord {
            at: now,
            action: event.action.clone(),
            disposition,
            active: nav.active_id().to_string(),
            scroll_y: nav.host().scroll_y(),
        };
        debug!("replay: {record}");
        records.push(record);
    }

    ReplayReport {
        events: records,
        turns,
        final_active: nav.active_id().to_string(),
        final_scroll_y: nav.host().scroll_y(),
    }
}

/// Re-register every section's rectangle from the page, like a scroll tick.
fn sync(nav: &mut Navigator<SimulatedPage>) {
    let sections = nav.sections().clone();
    let rects = nav.host().rects();
    for (id, rect) in sections.iter().zip(rects) {
        nav.register(id, Some(rect));
    }
    nav.refresh();
}
