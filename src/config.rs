use bon::Builder;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::geometry::round_half_up;

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Turns the current value into the center label text.
#[derive(Clone)]
pub struct LabelRenderer(Rc<dyn Fn(f64) -> String>);

impl LabelRenderer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn render(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl Default for LabelRenderer {
    /// Nearest integer, halves rounded up.
    fn default() -> Self {
        Self::new(|value| format!("{}", round_half_up(value) + 0.0))
    }
}

impl fmt::Debug for LabelRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelRenderer")
    }
}

/// Gauge options. Everything except `max` is fixed once the gauge exists.
#[derive(Debug, Clone, Builder)]
pub struct GaugeConfig {
    // Dial geometry
    #[builder(default = 135.0)]
    pub dial_start_angle: f64,
    #[builder(default = 45.0)]
    pub dial_end_angle: f64,
    #[builder(default = 400.0)]
    pub radius: f64,

    // Values
    #[builder(default = 100.0)]
    pub max: f64,
    #[builder(default = 0.0)]
    pub value: f64,
    #[builder(default = true)]
    pub show_value: bool,
    #[builder(default)]
    pub label: LabelRenderer,

    // Class identifiers
    #[builder(default = "value".to_string())]
    pub value_dial_class: String,
    #[builder(default = "value-text".to_string())]
    pub value_text_class: String,
    #[builder(default = "dial".to_string())]
    pub dial_class: String,
    #[builder(default = "gauge".to_string())]
    pub gauge_class: String,

    // Strokes
    #[builder(default = Color::new(0xee, 0xee, 0xee))]
    pub dial_color: Color,
    #[builder(default = 20.0)]
    pub dial_stroke_width: f64,
    #[builder(default = Color::new(0x66, 0x66, 0x66))]
    pub value_color: Color,
    #[builder(default = 25.0)]
    pub value_stroke_width: f64,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Configuration for the native preview window
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub max_framerate: f64,
    pub background_color: Color,
    pub text_color: Color,
    /// TrueType/OpenType font for the label. Without one the label is not drawn.
    pub font_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Gauge".to_string(),
            width: 300,
            height: 300,
            max_framerate: 60.0,
            background_color: Color::new(0xff, 0xff, 0xff),
            text_color: Color::new(0x33, 0x33, 0x33),
            font_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = GaugeConfig::default();
        assert_eq!(config.dial_start_angle, 135.0);
        assert_eq!(config.dial_end_angle, 45.0);
        assert_eq!(config.radius, 400.0);
        assert_eq!(config.max, 100.0);
        assert_eq!(config.value, 0.0);
        assert!(config.show_value);
        assert_eq!(config.value_dial_class, "value");
        assert_eq!(config.value_text_class, "value-text");
        assert_eq!(config.dial_class, "dial");
        assert_eq!(config.gauge_class, "gauge");
    }

    #[test]
    fn default_label_rounds_to_integer() {
        let label = LabelRenderer::default();
        assert_eq!(label.render(0.0), "0");
        assert_eq!(label.render(42.49), "42");
        assert_eq!(label.render(42.5), "43");
        assert_eq!(label.render(99.99), "100");
    }

    #[test]
    fn builder_overrides() {
        let config = GaugeConfig::builder()
            .max(250.0)
            .label(LabelRenderer::new(|v| format!("{v:.1} km/h")))
            .dial_class("track".to_string())
            .build();
        assert_eq!(config.max, 250.0);
        assert_eq!(config.label.render(12.34), "12.3 km/h");
        assert_eq!(config.dial_class, "track");
        assert_eq!(config.radius, 400.0);
    }

    #[test]
    fn color_hex() {
        assert_eq!(Color::new(0xee, 0xee, 0xee).to_hex(), "#eeeeee");
        assert_eq!(Color::new(0x06, 0x60, 0xff).to_hex(), "#0660ff");
    }
}
