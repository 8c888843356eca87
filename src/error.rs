use thiserror::Error;

/// Inputs the gauge refuses instead of drawing NaN geometry.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GaugeError {
    #[error("gauge limit must be finite and positive, got {0}")]
    InvalidLimit(f64),

    #[error("dial radius must be finite and positive, got {0}")]
    InvalidRadius(f64),

    #[error("dial angle must be finite, got {0}")]
    InvalidAngle(f64),

    #[error("gauge value must be a number, got {0}")]
    InvalidValue(f64),
}

/// Errors from the native preview window.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("pixel buffer error: {0}")]
    Pixels(#[from] pixels::Error),

    #[error("failed to read font: {0}")]
    FontIo(#[from] std::io::Error),

    #[error("unsupported font data in {0}")]
    FontFormat(String),
}
