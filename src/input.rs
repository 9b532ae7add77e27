//! Input processing layer: wheel delta normalization and touch tracking.
//!
//! Pure logic, no I/O. Both input kinds end up as a signed vertical delta
//! where positive means "toward the next section".

/// Pixels per DOM line-mode wheel step.
pub const LINE_HEIGHT_PX: f64 = 16.0;

/// A normalized gesture delta fed to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    Wheel(f64),
    Touch(f64),
}

impl GestureInput {
    pub fn delta_y(self) -> f64 {
        match self {
            GestureInput::Wheel(d) | GestureInput::Touch(d) => d,
        }
    }
}

/// Unit of a raw wheel delta (`WheelEvent.deltaMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    /// Map the DOM `deltaMode` constant; unknown values are treated as pixels.
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => WheelDeltaMode::Line,
            2 => WheelDeltaMode::Page,
            _ => WheelDeltaMode::Pixel,
        }
    }
}

/// Convert a raw wheel delta to pixels.
pub fn normalize_wheel(delta_y: f64, mode: WheelDeltaMode, viewport_height: f64) -> f64 {
    match mode {
        WheelDeltaMode::Pixel => delta_y,
        WheelDeltaMode::Line => delta_y * LINE_HEIGHT_PX,
        WheelDeltaMode::Page => delta_y * viewport_height,
    }
}

/// Tracks the last touch position so moves can be turned into deltas.
#[derive(Debug, Default)]
pub struct TouchTracker {
    last_y: Option<f64>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, y: f64) {
        self.last_y = Some(y);
    }

    /// Returns `previous - current` (finger moving up = positive = next
    /// section), or `None` when no touch is in progress.
    pub fn move_to(&mut self, y: f64) -> Option<f64> {
        let prev = self.last_y?;
        self.last_y = Some(y);
        Some(prev - y)
    }

    pub fn end(&mut self) {
        self.last_y = None;
    }

    pub fn is_active(&self) -> bool {
        self.last_y.is_some()
    }
}
