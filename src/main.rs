use clap::Parser;
use rand::Rng;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use gauge_dial::{
    viewer, Document, FrameQueue, Gauge, GaugeCommand, GaugeConfig, TimerScheduler, ViewerConfig,
    DEFAULT_ANIMATION_SECONDS,
};

/// Circular gauge driven by values read from stdin, one per line.
#[derive(Debug, Parser)]
#[command(name = "gauge-dial", version)]
struct Args {
    /// Upper limit of the gauge
    #[arg(long, default_value_t = 100.0)]
    max: f64,

    /// Initial value
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    value: f64,

    /// Dial start angle in degrees, clockwise from the positive x-axis
    #[arg(long, default_value_t = 135.0, allow_negative_numbers = true)]
    start_angle: f64,

    /// Dial end angle in degrees
    #[arg(long, default_value_t = 45.0, allow_negative_numbers = true)]
    end_angle: f64,

    #[arg(long, default_value_t = 400.0)]
    radius: f64,

    /// Seconds each value change is animated over
    #[arg(long, default_value_t = DEFAULT_ANIMATION_SECONDS)]
    duration: f64,

    /// Do not draw the value label
    #[arg(long)]
    hide_value: bool,

    #[arg(long, default_value = "Gauge")]
    title: String,

    /// Font used for the value label in the window
    #[arg(long)]
    font: Option<PathBuf>,

    /// Apply stdin values without a window and print the final SVG
    #[arg(long)]
    svg: bool,

    /// Feed random values instead of reading stdin
    #[arg(long)]
    demo: bool,
}

impl Args {
    fn gauge_config(&self) -> GaugeConfig {
        GaugeConfig::builder()
            .max(self.max)
            .value(self.value)
            .dial_start_angle(self.start_angle)
            .dial_end_angle(self.end_angle)
            .radius(self.radius)
            .show_value(!self.hide_value)
            .build()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.svg {
        return print_svg(&args);
    }

    let frames = Rc::new(FrameQueue::new());
    let mut document = Document::new();
    let gauge = Gauge::create(&mut document, args.gauge_config(), frames.clone())?.into_inner();

    let (sender, receiver) = mpsc::channel();
    let duration = args.duration;
    if args.demo {
        thread::spawn(move || feed_random(sender, args.max, duration));
    } else {
        thread::spawn(move || feed_stdin(sender, duration));
    }

    let config = ViewerConfig {
        title: args.title.clone(),
        font_path: args.font.clone(),
        ..ViewerConfig::default()
    };
    viewer::run(gauge, frames, Some(receiver), config)?;
    Ok(())
}

fn print_svg(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let timer = Rc::new(TimerScheduler::new());
    let mut document = Document::new();
    let mut gauge = Gauge::create(&mut document, args.gauge_config(), timer.clone())?.into_inner();

    for line in io::stdin().lock().lines() {
        let line = line?;
        match line.trim().parse::<f64>() {
            Ok(value) => {
                gauge.set_value_animated(value, args.duration)?;
                timer.run_until_idle();
            }
            Err(_) if line.trim().is_empty() => {}
            Err(e) => log::warn!("skipping {:?}: {}", line, e),
        }
    }

    println!("{}", document.to_svg());
    Ok(())
}

fn feed_stdin(sender: Sender<GaugeCommand>, duration: f64) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match line.trim().parse::<f64>() {
            Ok(value) => {
                if sender.send(GaugeCommand::SetValueAnimated(value, duration)).is_err() {
                    break;
                }
            }
            Err(e) => log::warn!("skipping {:?}: {}", line, e),
        }
    }
}

fn feed_random(sender: Sender<GaugeCommand>, max: f64, duration: f64) {
    let mut rng = rand::rng();
    let pause = Duration::from_secs_f64(duration.max(0.0) + 0.5);
    loop {
        let value = rng.random_range(0.0..=max);
        if sender.send(GaugeCommand::SetValueAnimated(value, duration)).is_err() {
            break;
        }
        thread::sleep(pause);
    }
}
