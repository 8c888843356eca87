//! Value to angle to SVG arc conversion.
//!
//! All angles are in degrees. Angle 0 lies on the positive x-axis and angles
//! grow clockwise in screen space (y points down), so 90 is straight down.

use std::fmt;

/// Side length of the square drawing coordinate system.
pub const VIEWBOX_SIZE: f64 = 1000.0;
/// Logical center of every dial.
pub const CENTER_X: f64 = 500.0;
pub const CENTER_Y: f64 = 500.0;

/// Rounds half-way cases towards positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to `places` decimal places, half-way cases towards positive infinity.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    round_half_up(value * factor) / factor
}

/// Clamps `value` into `[0, limit]`.
pub fn normalize(value: f64, limit: f64) -> f64 {
    if value > limit {
        limit
    } else if value < 0.0 {
        0.0
    } else {
        value
    }
}

pub fn percentage(value: f64, limit: f64) -> f64 {
    100.0 * value / limit
}

/// Translates a percentage to an angle, e.g. 50% of a 180 degree span is 90.
pub fn angle_for(percentage: f64, span_angle: f64) -> f64 {
    percentage * span_angle / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Point on the circle of `radius` around `(cx, cy)`, rounded to 3 decimals.
pub fn cartesian(cx: f64, cy: f64, radius: f64, angle: f64) -> Point {
    let rad = angle.to_radians();
    Point {
        x: round_to(cx + radius * rad.cos(), 3),
        y: round_to(cy + radius * rad.sin(), 3),
    }
}

/// Both ends of an arc around the fixed center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialCoords {
    pub start: Point,
    pub end: Point,
}

pub fn dial_coords(radius: f64, start_angle: f64, end_angle: f64) -> DialCoords {
    DialCoords {
        start: cartesian(CENTER_X, CENTER_Y, radius, start_angle),
        end: cartesian(CENTER_X, CENTER_Y, radius, end_angle),
    }
}

/// A single clockwise SVG elliptical-arc command around the dial center.
///
/// The large-arc flag is set unless the caller clears it with
/// [`ArcPath::large_arc`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPath {
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub large_arc: bool,
}

impl ArcPath {
    pub fn new(radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            radius,
            start_angle,
            end_angle,
            large_arc: true,
        }
    }

    pub fn large_arc(mut self, large_arc: bool) -> Self {
        self.large_arc = large_arc;
        self
    }

    pub fn coords(&self) -> DialCoords {
        dial_coords(self.radius, self.start_angle, self.end_angle)
    }

    /// Clockwise angle covered between the two endpoints, in `[0, 360)`.
    pub fn sweep(&self) -> f64 {
        let sweep = self.end_angle - self.start_angle;
        if (0.0..360.0).contains(&sweep) {
            sweep
        } else {
            sweep.rem_euclid(360.0)
        }
    }

    /// The `d` attribute value: `M x1 y1 A r r 0 flag 1 x2 y2`.
    pub fn path_data(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let DialCoords { start, end } = self.coords();
        write!(
            f,
            "M {} {} A {} {} 0 {} 1 {} {}",
            Num(start.x),
            Num(start.y),
            Num(self.radius),
            Num(self.radius),
            u8::from(self.large_arc),
            Num(end.x),
            Num(end.y),
        )
    }
}

/// Path data for an arc; `large_arc` of `None` means the flag is set.
pub fn path_string(
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    large_arc: Option<bool>,
) -> String {
    let arc = ArcPath::new(radius, start_angle, end_angle);
    match large_arc {
        Some(flag) => arc.large_arc(flag).path_data(),
        None => arc.path_data(),
    }
}

/// Formats numbers without a trailing `.0` and without negative zero.
pub(crate) struct Num(pub f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // -0.0 + 0.0 == +0.0
        write!(f, "{}", self.0 + 0.0)
    }
}

// ============================================================================
// DIAL
// ============================================================================

/// Angular layout of one gauge: always sweeps the long way from `start_angle`
/// clockwise to `end_angle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dial {
    pub start_angle: f64,
    pub end_angle: f64,
    pub radius: f64,
}

impl Dial {
    pub fn new(start_angle: f64, end_angle: f64, radius: f64) -> Self {
        Self {
            start_angle,
            end_angle,
            radius,
        }
    }

    /// Total visual span, `360 - |start - end|`.
    pub fn span(&self) -> f64 {
        360.0 - (self.start_angle - self.end_angle).abs()
    }

    pub fn sweep_for(&self, value: f64, limit: f64) -> f64 {
        angle_for(percentage(value, limit), self.span())
    }

    /// Foreground arc for `value`.
    pub fn value_arc(&self, value: f64, limit: f64) -> ArcPath {
        let sweep = self.sweep_for(value, limit);
        ArcPath::new(self.radius, self.start_angle, self.start_angle + sweep)
            .large_arc(sweep > 180.0)
    }

    /// Full-range background arc.
    pub fn background_arc(&self) -> ArcPath {
        let sweep = angle_for(100.0, self.span());
        ArcPath::new(self.radius, self.start_angle, self.end_angle).large_arc(sweep > 180.0)
    }
}

impl Default for Dial {
    fn default() -> Self {
        Self::new(135.0, 45.0, 400.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_clamps_into_range() {
        assert_eq!(normalize(-5.0, 100.0), 0.0);
        assert_eq!(normalize(-0.001, 100.0), 0.0);
        assert_eq!(normalize(150.0, 100.0), 100.0);
        assert_eq!(normalize(f64::INFINITY, 100.0), 100.0);
        assert_eq!(normalize(42.5, 100.0), 42.5);
        assert_eq!(normalize(100.0, 100.0), 100.0);
    }

    #[test]
    fn percentage_and_angle() {
        assert_eq!(percentage(50.0, 100.0), 50.0);
        assert_eq!(percentage(25.0, 200.0), 12.5);
        assert_eq!(angle_for(50.0, 180.0), 90.0);
        assert_eq!(angle_for(100.0, 270.0), 270.0);
    }

    #[test]
    fn cartesian_rounds_to_three_places() {
        assert_eq!(
            cartesian(500.0, 500.0, 400.0, 135.0),
            Point {
                x: 217.157,
                y: 782.843
            }
        );
        assert_eq!(cartesian(500.0, 500.0, 400.0, 0.0), Point { x: 900.0, y: 500.0 });
        // clockwise in screen space: 90 degrees points down
        assert_eq!(cartesian(500.0, 500.0, 400.0, 90.0), Point { x: 500.0, y: 900.0 });
    }

    #[test]
    fn zero_length_arc_has_coincident_ends() {
        let coords = dial_coords(400.0, 135.0, 135.0);
        assert_eq!(coords.start, coords.end);
        assert_eq!(
            path_string(400.0, 135.0, 135.0, None),
            "M 217.157 782.843 A 400 400 0 1 1 217.157 782.843"
        );
    }

    #[test]
    fn path_string_honours_explicit_flag() {
        assert_eq!(
            path_string(400.0, 135.0, 270.0, Some(false)),
            "M 217.157 782.843 A 400 400 0 0 1 500 100"
        );
    }

    #[test]
    fn sweep_flag_follows_sweep_angle() {
        let dial = Dial::default();
        assert_eq!(dial.span(), 270.0);

        assert_eq!(dial.sweep_for(50.0, 100.0), 135.0);
        assert!(!dial.value_arc(50.0, 100.0).large_arc);

        assert_eq!(dial.sweep_for(80.0, 100.0), 216.0);
        assert!(dial.value_arc(80.0, 100.0).large_arc);
    }

    #[test]
    fn background_arc_spans_full_dial() {
        let arc = Dial::default().background_arc();
        assert!(arc.large_arc);
        assert_eq!(arc.sweep(), 270.0);
        assert_eq!(arc.path_data(), "M 217.157 782.843 A 400 400 0 1 1 782.843 782.843");
    }

    #[test]
    fn narrow_dial_background_uses_small_arc() {
        // 200 - 10 = 190 degrees apart, so the long way round is 170 degrees
        let arc = Dial::new(200.0, 10.0, 300.0).background_arc();
        assert!(!arc.large_arc);
    }

    #[test]
    fn negative_zero_is_printed_as_zero() {
        assert_eq!(Num(-0.0).to_string(), "0");
        assert_eq!(Num(12.0).to_string(), "12");
        assert_eq!(Num(-3.25).to_string(), "-3.25");
    }

    #[test]
    fn half_up_rounding() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_to(12.345678, 2), 12.35);
        assert_eq!(round_to(79.996, 2), 80.0);
    }
}
