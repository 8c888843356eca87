// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod animation;
pub mod config;
pub mod drawing;
pub mod error;
pub mod geometry;
pub mod viewer;

pub use animation::{
    animate, ease_in_out_cubic, AnimationHandle, AnimationJob, Easing, FrameQueue,
    FrameScheduler, TimerScheduler,
};
pub use config::{Color, GaugeConfig, LabelRenderer, ViewerConfig};
pub use drawing::{Container, Document, GaugeDrawing, SharedDrawing};
pub use error::{GaugeError, ViewerError};
pub use geometry::{ArcPath, Dial};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use drawing::{PathElement, TextElement, LABEL_X, LABEL_Y};
use geometry::{normalize, round_to};

/// Conventional duration for [`Gauge::set_value_animated`].
pub const DEFAULT_ANIMATION_SECONDS: f64 = 1.0;

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for feeding a gauge from another thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeCommand {
    SetValue(f64),
    SetValueAnimated(f64, f64), // value, seconds
    SetMaxValue(f64),
}

/// A configuration problem that was fixed up instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// The start angle was not greater than the end angle; the two were swapped.
    SwappedAngles { start: f64, end: f64 },
    /// The initial value was outside `[0, max]`.
    ClampedValue { requested: f64, applied: f64 },
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::SwappedAngles { start, end } => write!(
                f,
                "start angle {start} should be greater than end angle {end}, swapped"
            ),
            Correction::ClampedValue { requested, applied } => {
                write!(f, "initial value {requested} clamped to {applied}")
            }
        }
    }
}

/// Result of a construction that may have applied corrections.
#[derive(Debug)]
pub enum Outcome<T> {
    Clean(T),
    Corrected(T, Vec<Correction>),
}

impl<T> Outcome<T> {
    fn new(value: T, corrections: Vec<Correction>) -> Self {
        if corrections.is_empty() {
            Outcome::Clean(value)
        } else {
            Outcome::Corrected(value, corrections)
        }
    }

    pub fn corrections(&self) -> &[Correction] {
        match self {
            Outcome::Clean(_) => &[],
            Outcome::Corrected(_, corrections) => corrections,
        }
    }

    pub fn is_corrected(&self) -> bool {
        matches!(self, Outcome::Corrected(..))
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Clean(value) | Outcome::Corrected(value, _) => value,
        }
    }
}

/// Circular gauge: a background dial, a value arc and an optional label.
///
/// The logical value changes immediately on every setter; animated changes
/// only lag on screen. At most one animation runs at a time: starting a new
/// one, or setting a value directly, cancels the one in flight.
pub struct Gauge {
    value: f64,
    limit: Rc<Cell<f64>>,
    painter: ValuePainter,
    scheduler: Rc<dyn FrameScheduler>,
    animation: Option<AnimationHandle>,
    // set when the limit changed since the drawing was last brought up to date
    stale: bool,
}

impl Gauge {
    /// Builds the drawing, attaches it to `container` and paints the initial
    /// value.
    pub fn create<C>(
        container: &mut C,
        config: GaugeConfig,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Result<Outcome<Gauge>, GaugeError>
    where
        C: Container + ?Sized,
    {
        let mut corrections = Vec::new();

        check_limit(config.max)?;
        check_value(config.value)?;
        for angle in [config.dial_start_angle, config.dial_end_angle] {
            if !angle.is_finite() {
                return Err(GaugeError::InvalidAngle(angle));
            }
        }
        if !(config.radius.is_finite() && config.radius > 0.0) {
            return Err(GaugeError::InvalidRadius(config.radius));
        }

        let (mut start, mut end) = (config.dial_start_angle, config.dial_end_angle);
        if start < end {
            corrections.push(Correction::SwappedAngles { start, end });
            std::mem::swap(&mut start, &mut end);
        }
        // more than a full turn apart leaves a negative span
        if start - end > 360.0 {
            return Err(GaugeError::InvalidAngle(start));
        }

        let value = normalize(config.value, config.max);
        if value != config.value {
            corrections.push(Correction::ClampedValue {
                requested: config.value,
                applied: value,
            });
        }
        for correction in &corrections {
            log::warn!("gauge: {}", correction);
        }

        let dial = Dial::new(start, end, config.radius);
        let limit = Rc::new(Cell::new(config.max));
        let label = config.show_value.then(|| config.label.clone());

        let drawing = Rc::new(RefCell::new(GaugeDrawing {
            class: config.gauge_class,
            dial: PathElement {
                class: config.dial_class,
                stroke: config.dial_color,
                stroke_width: config.dial_stroke_width,
                arc: dial.background_arc(),
            },
            label: label.as_ref().map(|_| TextElement {
                class: config.value_text_class,
                x: LABEL_X,
                y: LABEL_Y,
                content: String::new(),
            }),
            value: PathElement {
                class: config.value_dial_class,
                stroke: config.value_color,
                stroke_width: config.value_stroke_width,
                arc: dial.value_arc(0.0, config.max),
            },
        }));

        let painter = ValuePainter {
            drawing: Rc::clone(&drawing),
            dial,
            limit: Rc::clone(&limit),
            label,
        };
        painter.paint(value);
        container.attach(drawing);

        let gauge = Gauge {
            value,
            limit,
            painter,
            scheduler,
            animation: None,
            stale: false,
        };
        Ok(Outcome::new(gauge, corrections))
    }

    /// Replaces the limit. Nothing is redrawn until the next value is set;
    /// the logical value is clamped to the new limit.
    ///
    /// A running animation keeps going against the new limit unless the clamp
    /// moved the logical value, in which case its target is gone and it is
    /// cancelled.
    pub fn set_max_value(&mut self, max: f64) -> Result<(), GaugeError> {
        check_limit(max)?;
        if max == self.limit.get() {
            return Ok(());
        }
        self.limit.set(max);
        let clamped = normalize(self.value, max);
        if clamped != self.value {
            self.cancel_animation();
            self.value = clamped;
        }
        self.stale = true;
        Ok(())
    }

    /// Clamps and paints `value` right away, cancelling any running animation.
    pub fn set_value(&mut self, value: f64) -> Result<(), GaugeError> {
        check_value(value)?;
        self.cancel_animation();
        self.value = normalize(value, self.limit.get());
        self.painter.paint(self.value);
        self.stale = false;
        Ok(())
    }

    /// Animates from the current value to `value` over `duration_seconds`.
    ///
    /// Returns `None` without scheduling anything when the clamped target
    /// equals the current value; if the limit changed since the last draw the
    /// target is painted right away instead. The logical value is the target
    /// as soon as this returns; the arc and label catch up frame by frame.
    pub fn set_value_animated(
        &mut self,
        value: f64,
        duration_seconds: f64,
    ) -> Result<Option<AnimationHandle>, GaugeError> {
        check_value(value)?;
        let target = normalize(value, self.limit.get());
        if target == self.value {
            if self.stale && !self.is_animating() {
                self.painter.paint(target);
                self.stale = false;
            }
            return Ok(None);
        }
        self.cancel_animation();
        self.stale = false;

        let painter = self.painter.clone();
        let job = AnimationJob::new(self.value, target, move |v| {
            painter.paint(round_to(v, 2))
        })
        .duration(duration_seconds);
        let handle = animate(&self.scheduler, job);

        self.value = target;
        self.animation = Some(handle.clone());
        Ok(Some(handle))
    }

    /// The last logical value, not the one currently on screen.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn max_value(&self) -> f64 {
        self.limit.get()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(AnimationHandle::is_active)
    }

    pub fn dial(&self) -> Dial {
        self.painter.dial
    }

    pub fn drawing(&self) -> SharedDrawing {
        Rc::clone(&self.painter.drawing)
    }

    pub fn to_svg(&self) -> String {
        self.painter.drawing.borrow().to_svg()
    }

    /// The value arc's `d` attribute as currently drawn.
    pub fn value_path(&self) -> String {
        self.painter.drawing.borrow().value.d()
    }

    /// The label as currently drawn, if the value is shown.
    pub fn label_text(&self) -> Option<String> {
        self.painter.drawing.borrow().label_text().map(str::to_string)
    }

    pub fn apply(&mut self, command: GaugeCommand) -> Result<(), GaugeError> {
        match command {
            GaugeCommand::SetValue(value) => self.set_value(value),
            GaugeCommand::SetValueAnimated(value, seconds) => {
                self.set_value_animated(value, seconds).map(|_| ())
            }
            GaugeCommand::SetMaxValue(max) => self.set_max_value(max),
        }
    }

    fn cancel_animation(&mut self) {
        if let Some(handle) = self.animation.take() {
            handle.cancel();
        }
    }
}

impl Drop for Gauge {
    fn drop(&mut self) {
        self.cancel_animation();
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge")
            .field("value", &self.value)
            .field("limit", &self.limit.get())
            .field("dial", &self.painter.dial)
            .field("animating", &self.is_animating())
            .finish()
    }
}

// ============================================================================
// INTERNAL IMPLEMENTATION
// ============================================================================

/// Writes a value into the shared drawing. Cloned into animation frames.
#[derive(Clone)]
struct ValuePainter {
    drawing: SharedDrawing,
    dial: Dial,
    limit: Rc<Cell<f64>>,
    label: Option<LabelRenderer>,
}

impl ValuePainter {
    fn paint(&self, value: f64) {
        let limit = self.limit.get();
        let mut drawing = self.drawing.borrow_mut();
        // the arc never runs past the dial, even for a value above a lowered limit
        drawing.value.arc = self.dial.value_arc(normalize(value, limit), limit);
        if let (Some(renderer), Some(text)) = (&self.label, drawing.label.as_mut()) {
            text.content = renderer.render(value);
        }
    }
}

fn check_limit(limit: f64) -> Result<(), GaugeError> {
    if limit.is_finite() && limit > 0.0 {
        Ok(())
    } else {
        Err(GaugeError::InvalidLimit(limit))
    }
}

fn check_value(value: f64) -> Result<(), GaugeError> {
    if value.is_nan() {
        Err(GaugeError::InvalidValue(value))
    } else {
        Ok(())
    }
}
