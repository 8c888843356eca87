//! Native preview window.
//!
//! Rasterizes a [`GaugeDrawing`] into a `pixels` frame buffer and runs the
//! gauge's [`FrameQueue`] once per redraw, which makes the window's redraw
//! cadence the per-frame callback for animations.

use pixels::{Pixels, SurfaceTexture};
use rusttype::{point, Font, PositionedGlyph, Scale};

use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::animation::FrameQueue;
use crate::config::{Color, ViewerConfig};
use crate::drawing::{GaugeDrawing, PathElement, TextElement};
use crate::error::ViewerError;
use crate::geometry::{CENTER_X, CENTER_Y, VIEWBOX_SIZE};
use crate::{Gauge, GaugeCommand};

/// SVG `font-size="400%"` of the 16 unit default.
const LABEL_FONT_SIZE: f64 = 64.0;

/// Opens a window showing `gauge` until it is closed.
///
/// `frames` must be the queue the gauge was created with. Commands arriving
/// on `receiver` are applied at the start of each frame.
pub fn run(
    mut gauge: Gauge,
    frames: Rc<FrameQueue>,
    receiver: Option<Receiver<GaugeCommand>>,
    config: ViewerConfig,
) -> Result<(), ViewerError> {
    let font = match &config.font_path {
        Some(path) => Some(load_font(path)?),
        None => {
            log::warn!("no font configured, the value label will not be drawn");
            None
        }
    };

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(
            config.width as f64,
            config.height as f64,
        ))
        .with_resizable(true)
        .build(&event_loop)?;

    let window = std::sync::Arc::new(window);
    let window_clone = window.clone();
    let size = window.inner_size();
    let mut fb_width = size.width as usize;
    let mut fb_height = size.height as usize;
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;
    log::info!("viewer started at {}x{}", fb_width, fb_height);

    let frame_duration = Duration::from_secs_f64(1.0 / config.max_framerate);
    let mut last_frame = Instant::now();

    event_loop.run(move |event, window_target| {
        window_target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    log::info!("viewer closed at value {}", gauge.value());
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    fb_width = new_size.width as usize;
                    fb_height = new_size.height as usize;
                    let _ = pixels.resize_buffer(new_size.width, new_size.height);
                    let _ = pixels.resize_surface(new_size.width, new_size.height);
                }
                WindowEvent::RedrawRequested => {
                    if let Some(ref receiver) = receiver {
                        while let Ok(command) = receiver.try_recv() {
                            if let Err(e) = gauge.apply(command) {
                                log::warn!("ignoring {:?}: {}", command, e);
                            }
                        }
                    }
                    frames.run_frame();

                    let drawing = gauge.drawing();
                    let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                    render_gauge(&mut canvas, &drawing.borrow(), font.as_ref(), &config);
                    if let Err(e) = pixels.render() {
                        log::error!("render failed: {}", e);
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if last_frame.elapsed() >= frame_duration {
                    window_clone.request_redraw();
                    last_frame = Instant::now();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn load_font(path: &Path) -> Result<Font<'static>, ViewerError> {
    let data = std::fs::read(path)?;
    Font::try_from_vec(data).ok_or_else(|| ViewerError::FontFormat(path.display().to_string()))
}

// ============================================================================
// RASTERIZATION
// ============================================================================

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }
}

/// Maps the 1000x1000 drawing space onto the largest centered square.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    fn fit(width: usize, height: usize) -> Self {
        let side = width.min(height) as f64;
        Self {
            scale: side / VIEWBOX_SIZE,
            offset_x: (width as f64 - side) / 2.0,
            offset_y: (height as f64 - side) / 2.0,
        }
    }

    fn to_pixels(self, x: f64, y: f64) -> (f64, f64) {
        (self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }
}

fn render_gauge(
    canvas: &mut Canvas,
    drawing: &GaugeDrawing,
    font: Option<&Font>,
    config: &ViewerConfig,
) {
    canvas.clear(config.background_color);
    let viewport = Viewport::fit(canvas.width, canvas.height);
    render_arc(canvas, viewport, &drawing.dial);
    if let (Some(label), Some(font)) = (&drawing.label, font) {
        render_label(canvas, viewport, label, font, config.text_color);
    }
    render_arc(canvas, viewport, &drawing.value);
}

fn render_arc(canvas: &mut Canvas, viewport: Viewport, path: &PathElement) {
    let sweep = path.arc.sweep();
    if sweep <= 0.0 {
        return;
    }
    let (cx, cy) = viewport.to_pixels(CENTER_X, CENTER_Y);
    let r = path.arc.radius * viewport.scale;
    let half = (path.stroke_width * viewport.scale / 2.0).max(0.5);
    let start = path.arc.start_angle;

    let reach = r + half + 1.0;
    let min_x = (cx - reach).floor().max(0.0) as usize;
    let min_y = (cy - reach).floor().max(0.0) as usize;
    let max_x = ((cx + reach).ceil() as usize).min(canvas.width);
    let max_y = ((cy + reach).ceil() as usize).min(canvas.height);
    let color = path.stroke;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let aa = (half + 0.5 - (dist - r).abs()).clamp(0.0, 1.0);
            if aa <= 0.0 {
                continue;
            }
            let angle = dy.atan2(dx).to_degrees();
            if (angle - start).rem_euclid(360.0) <= sweep {
                set_pixel(canvas.frame, canvas.width, x, y, color, aa as f32);
            }
        }
    }
}

fn render_label(
    canvas: &mut Canvas,
    viewport: Viewport,
    label: &TextElement,
    font: &Font,
    color: Color,
) {
    let scale = Scale::uniform((LABEL_FONT_SIZE * viewport.scale) as f32);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(&label.content, scale, point(0.0, 0.0))
        .collect();
    let (min_x, max_x) = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .fold((i32::MAX, i32::MIN), |(min_x, max_x), bb| {
            (min_x.min(bb.min.x), max_x.max(bb.max.x))
        });
    if min_x >= max_x {
        return;
    }

    // text-anchor="middle" with the baseline on y
    let (x, y) = viewport.to_pixels(label.x, label.y);
    let offset_x = x.round() as i32 - (max_x - min_x) / 2;
    let baseline = y.round() as i32;
    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + bb.min.x - min_x + gx as i32;
                let py = baseline + bb.min.y + gy as i32;
                let inside = px >= 0
                    && py >= 0
                    && (px as usize) < canvas.width
                    && (py as usize) < canvas.height;
                if inside {
                    set_pixel(canvas.frame, canvas.width, px as usize, py as usize, color, v);
                }
            });
        }
    }
}

fn set_pixel(frame: &mut [u8], width: usize, x: usize, y: usize, color: Color, alpha: f32) {
    if x < width && y < frame.len() / (width * 4) {
        let idx = (y * width + x) * 4;
        let (r, g, b) = color.as_tuple();
        let a = alpha.clamp(0.0, 1.0);
        let blend = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
        let out = [
            blend(r, frame[idx]),
            blend(g, frame[idx + 1]),
            blend(b, frame[idx + 2]),
            0xff,
        ];
        frame[idx..idx + 4].copy_from_slice(&out);
    }
}
