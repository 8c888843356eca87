//! The three shapes a gauge draws, and where they get attached.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::config::Color;
use crate::geometry::{ArcPath, Num, CENTER_X, VIEWBOX_SIZE};

/// Label anchor, a little below the center so digits look centered.
pub const LABEL_X: f64 = CENTER_X;
pub const LABEL_Y: f64 = 550.0;

/// A stroked, unfilled arc.
#[derive(Debug, Clone, PartialEq)]
pub struct PathElement {
    pub class: String,
    pub stroke: Color,
    pub stroke_width: f64,
    pub arc: ArcPath,
}

impl PathElement {
    /// The `d` attribute.
    pub fn d(&self) -> String {
        self.arc.path_data()
    }

    fn write_svg(&self, out: &mut String) {
        let _ = write!(
            out,
            r#"<path class="{}" fill="transparent" stroke="{}" stroke-width="{}" d="{}"/>"#,
            escape(&self.class),
            self.stroke.to_hex(),
            Num(self.stroke_width),
            self.d()
        );
    }
}

/// Centered, large, bold sans-serif text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub class: String,
    pub x: f64,
    pub y: f64,
    pub content: String,
}

impl TextElement {
    fn write_svg(&self, out: &mut String) {
        let _ = write!(
            out,
            r#"<text class="{}" x="{}" y="{}" font-size="400%" font-family="sans-serif" font-weight="bold" text-anchor="middle">{}</text>"#,
            escape(&self.class),
            Num(self.x),
            Num(self.y),
            escape(&self.content)
        );
    }
}

/// Drawing root on the fixed 1000x1000 coordinate system: background arc,
/// optional label, value arc, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeDrawing {
    pub class: String,
    pub dial: PathElement,
    pub label: Option<TextElement>,
    pub value: PathElement,
}

impl GaugeDrawing {
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg viewBox="0 0 {size} {size}" class="{}">"#,
            escape(&self.class),
            size = Num(VIEWBOX_SIZE)
        );
        self.dial.write_svg(&mut out);
        if let Some(label) = &self.label {
            label.write_svg(&mut out);
        }
        self.value.write_svg(&mut out);
        out.push_str("</svg>");
        out
    }

    pub fn label_text(&self) -> Option<&str> {
        self.label.as_ref().map(|l| l.content.as_str())
    }
}

pub type SharedDrawing = Rc<RefCell<GaugeDrawing>>;

/// A surface gauges attach their drawing to.
pub trait Container {
    fn attach(&mut self, drawing: SharedDrawing);
}

/// In-memory container that serializes its drawings as SVG markup.
#[derive(Debug, Default)]
pub struct Document {
    drawings: Vec<SharedDrawing>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    pub fn drawings(&self) -> &[SharedDrawing] {
        &self.drawings
    }

    /// Current markup of every attached drawing, one per line.
    pub fn to_svg(&self) -> String {
        self.drawings
            .iter()
            .map(|d| d.borrow().to_svg())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Container for Document {
    fn attach(&mut self, drawing: SharedDrawing) {
        self.drawings.push(drawing);
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drawing(label: Option<&str>) -> GaugeDrawing {
        GaugeDrawing {
            class: "gauge".to_string(),
            dial: PathElement {
                class: "dial".to_string(),
                stroke: Color::new(0xee, 0xee, 0xee),
                stroke_width: 20.0,
                arc: ArcPath::new(400.0, 135.0, 45.0),
            },
            label: label.map(|text| TextElement {
                class: "value-text".to_string(),
                x: LABEL_X,
                y: LABEL_Y,
                content: text.to_string(),
            }),
            value: PathElement {
                class: "value".to_string(),
                stroke: Color::new(0x66, 0x66, 0x66),
                stroke_width: 25.0,
                arc: ArcPath::new(400.0, 135.0, 135.0).large_arc(false),
            },
        }
    }

    #[test]
    fn svg_keeps_paint_order() {
        let svg = drawing(Some("0")).to_svg();
        assert_eq!(
            svg,
            concat!(
                r#"<svg viewBox="0 0 1000 1000" class="gauge">"#,
                r##"<path class="dial" fill="transparent" stroke="#eeeeee" stroke-width="20" d="M 217.157 782.843 A 400 400 0 1 1 782.843 782.843"/>"##,
                r#"<text class="value-text" x="500" y="550" font-size="400%" font-family="sans-serif" font-weight="bold" text-anchor="middle">0</text>"#,
                r##"<path class="value" fill="transparent" stroke="#666666" stroke-width="25" d="M 217.157 782.843 A 400 400 0 0 1 217.157 782.843"/>"##,
                "</svg>"
            )
        );
    }

    #[test]
    fn hidden_label_is_omitted() {
        let svg = drawing(None).to_svg();
        assert!(!svg.contains("<text"));
        assert_eq!(drawing(None).label_text(), None);
    }

    #[test]
    fn label_text_is_escaped() {
        let svg = drawing(Some("<5 & up>")).to_svg();
        assert!(svg.contains(">&lt;5 &amp; up&gt;</text>"));
    }

    #[test]
    fn document_collects_attached_drawings() {
        let mut doc = Document::new();
        assert!(doc.is_empty());
        doc.attach(Rc::new(RefCell::new(drawing(Some("1")))));
        doc.attach(Rc::new(RefCell::new(drawing(Some("2")))));
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.to_svg().lines().count(), 2);
    }
}
