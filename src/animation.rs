//! Frame-paced value interpolation.
//!
//! An [`AnimationJob`] runs for `round(60 * duration)` frames. Frame `i`
//! (1-indexed) computes `progress = i / iterations`, eases it and hands the
//! interpolated value to the job's step callback. Frames are requested through
//! a [`FrameScheduler`], so the same job can be driven by a window's redraw
//! loop, by [`TimerScheduler`], or stepped by hand in tests with [`FrameQueue`].
//!
//! Everything here is single-threaded: callbacks run one after another and a
//! job only "suspends" between frames.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

/// Nominal frame cadence. Durations are converted to frame counts with it.
pub const FRAMES_PER_SECOND: f64 = 60.0;

/// Interval used when no native per-frame callback is available.
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(16_666_667);

pub type FrameCallback = Box<dyn FnOnce()>;

/// Source of "next frame" callbacks.
pub trait FrameScheduler {
    /// Runs `callback` once, on the next frame.
    fn request_frame(&self, callback: FrameCallback);
}

// ============================================================================
// SCHEDULERS
// ============================================================================

/// Queue of callbacks waiting for the next frame.
///
/// Nothing happens until the owner calls [`FrameQueue::run_frame`]; callbacks
/// requested while a frame runs wait for the following frame.
#[derive(Default)]
pub struct FrameQueue {
    pending: RefCell<VecDeque<FrameCallback>>,
    frames_run: Cell<u64>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every callback that was pending when the frame started and
    /// returns how many ran.
    pub fn run_frame(&self) -> usize {
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let count = due.len();
        for callback in due {
            callback();
        }
        self.frames_run.set(self.frames_run.get() + 1);
        count
    }

    /// Runs frames until nothing is pending or `max_frames` have run.
    /// Returns the number of frames run.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while !self.is_idle() && frames < max_frames {
            self.run_frame();
            frames += 1;
        }
        frames
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run.get()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) {
        self.pending.borrow_mut().push_back(callback);
    }
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending())
            .field("frames_run", &self.frames_run.get())
            .finish()
    }
}

/// Fixed-interval fallback: paces a [`FrameQueue`] with a ~16.67 ms timer on
/// the calling thread.
#[derive(Debug)]
pub struct TimerScheduler {
    queue: FrameQueue,
    interval: Duration,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::with_interval(FRAME_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            queue: FrameQueue::new(),
            interval,
        }
    }

    /// Blocks, running one frame per interval, until no callback is pending.
    pub fn run_until_idle(&self) -> u64 {
        let start = self.queue.frames_run();
        let mut last_frame = Instant::now();
        while !self.queue.is_idle() {
            let elapsed = last_frame.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
            last_frame = Instant::now();
            self.queue.run_frame();
        }
        let frames = self.queue.frames_run() - start;
        log::debug!("timer scheduler idle after {} frames", frames);
        frames
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for TimerScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        self.queue.request_frame(callback);
    }
}

// ============================================================================
// EASING
// ============================================================================

/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Clone, Default)]
pub enum Easing {
    #[default]
    EaseInOutCubic,
    Linear,
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Easing {
    pub fn evaluate(&self, progress: f64) -> f64 {
        match self {
            Easing::EaseInOutCubic => ease_in_out_cubic(progress),
            Easing::Linear => progress,
            Easing::Custom(f) => f(progress),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        Easing::Custom(Rc::new(f))
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::EaseInOutCubic => write!(f, "EaseInOutCubic"),
            Easing::Linear => write!(f, "Linear"),
            Easing::Custom(_) => write!(f, "Custom"),
        }
    }
}

pub fn ease_in_out_cubic(progress: f64) -> f64 {
    let p = progress / 0.5;
    if p < 1.0 {
        0.5 * p.powi(3)
    } else {
        0.5 * ((p - 2.0).powi(3) + 2.0)
    }
}

// ============================================================================
// JOBS
// ============================================================================

pub struct AnimationJob {
    pub start: f64,
    pub end: f64,
    pub duration_seconds: f64,
    pub easing: Easing,
    step: Box<dyn FnMut(f64)>,
}

impl AnimationJob {
    /// One second, ease-in-out-cubic.
    pub fn new<F>(start: f64, end: f64, step: F) -> Self
    where
        F: FnMut(f64) + 'static,
    {
        Self {
            start,
            end,
            duration_seconds: 1.0,
            easing: Easing::default(),
            step: Box::new(step),
        }
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// `round(60 * duration)`, at least one frame so that zero, negative and
    /// NaN durations jump straight to `end`.
    pub fn iteration_count(&self) -> u32 {
        let frames = (FRAMES_PER_SECOND * self.duration_seconds).round();
        if frames >= 1.0 {
            frames as u32
        } else {
            1
        }
    }

    pub fn value_at(&self, progress: f64) -> f64 {
        (self.end - self.start) * self.easing.evaluate(progress) + self.start
    }
}

impl fmt::Debug for AnimationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationJob")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("duration_seconds", &self.duration_seconds)
            .field("easing", &self.easing)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct JobStatus {
    cancelled: Cell<bool>,
    finished: Cell<bool>,
    frames: Cell<u32>,
}

/// Handle to a running job. Dropping it does not stop the job.
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    status: Rc<JobStatus>,
}

impl AnimationHandle {
    /// Stops the job before its next frame. The step callback is not invoked
    /// again and no further frame is requested.
    pub fn cancel(&self) {
        if !self.status.finished.get() && !self.status.cancelled.replace(true) {
            log::debug!("animation cancelled after {} frames", self.status.frames.get());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.cancelled.get()
    }

    /// True once the final frame ran or a cancelled job observed its cancel.
    pub fn is_finished(&self) -> bool {
        self.status.finished.get()
    }

    pub fn is_active(&self) -> bool {
        !self.is_finished() && !self.is_cancelled()
    }

    /// Frames that invoked the step callback so far.
    pub fn frames(&self) -> u32 {
        self.status.frames.get()
    }
}

struct JobRun {
    job: AnimationJob,
    iterations: u32,
    current: u32,
    status: Rc<JobStatus>,
}

impl JobRun {
    /// Runs one frame; returns whether another frame is needed.
    fn advance(&mut self) -> bool {
        if self.status.cancelled.get() {
            self.status.finished.set(true);
            return false;
        }
        self.current += 1;
        let progress = f64::from(self.current) / f64::from(self.iterations);
        let value = self.job.value_at(progress);
        (self.job.step)(value);
        self.status.frames.set(self.current);
        if progress < 1.0 {
            true
        } else {
            self.status.finished.set(true);
            log::debug!("animation finished at {} after {} frames", value, self.current);
            false
        }
    }
}

/// Starts `job` on `scheduler`. The first step runs on the next frame.
pub fn animate(scheduler: &Rc<dyn FrameScheduler>, job: AnimationJob) -> AnimationHandle {
    let status = Rc::new(JobStatus::default());
    let iterations = job.iteration_count();
    log::debug!(
        "animating {} -> {} over {} frames ({:?})",
        job.start,
        job.end,
        iterations,
        job.easing
    );
    let run = Rc::new(RefCell::new(JobRun {
        job,
        iterations,
        current: 0,
        status: Rc::clone(&status),
    }));
    schedule(Rc::downgrade(scheduler), run);
    AnimationHandle { status }
}

fn schedule(scheduler: Weak<dyn FrameScheduler>, run: Rc<RefCell<JobRun>>) {
    let Some(target) = scheduler.upgrade() else {
        log::debug!("frame scheduler dropped, animation abandoned");
        return;
    };
    target.request_frame(Box::new(move || {
        let more = run.borrow_mut().advance();
        if more {
            schedule(scheduler, run);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn queue() -> (Rc<FrameQueue>, Rc<dyn FrameScheduler>) {
        let queue = Rc::new(FrameQueue::new());
        let scheduler: Rc<dyn FrameScheduler> = queue.clone();
        (queue, scheduler)
    }

    fn recorder() -> (Rc<RefCell<Vec<f64>>>, impl FnMut(f64) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |v| sink.borrow_mut().push(v))
    }

    #[test]
    fn ease_in_out_cubic_fixed_points() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!(ease_in_out_cubic(0.25) < 0.25);
        assert!(ease_in_out_cubic(0.75) > 0.75);
    }

    #[test]
    fn ease_in_out_cubic_is_symmetric() {
        for p in [0.1, 0.2, 0.3, 0.4] {
            let sum = ease_in_out_cubic(p) + ease_in_out_cubic(1.0 - p);
            assert!((sum - 1.0).abs() < 1e-12, "p = {p}");
        }
    }

    #[test]
    fn iteration_count_rounds_sixty_per_second() {
        let job = |d| AnimationJob::new(0.0, 1.0, |_| {}).duration(d);
        assert_eq!(job(1.0).iteration_count(), 60);
        assert_eq!(job(0.5).iteration_count(), 30);
        assert_eq!(job(0.0251).iteration_count(), 2);
        assert_eq!(job(0.0).iteration_count(), 1);
        assert_eq!(job(-3.0).iteration_count(), 1);
        assert_eq!(job(f64::NAN).iteration_count(), 1);
    }

    #[test]
    fn nothing_runs_before_the_first_frame() {
        let (queue, scheduler) = queue();
        let (seen, step) = recorder();
        let handle = animate(&scheduler, AnimationJob::new(0.0, 10.0, step));
        assert!(seen.borrow().is_empty());
        assert_eq!(queue.pending(), 1);
        assert!(handle.is_active());
    }

    #[test]
    fn runs_exactly_iteration_count_frames_and_lands_on_end() {
        let (queue, scheduler) = queue();
        let (seen, step) = recorder();
        let handle = animate(
            &scheduler,
            AnimationJob::new(10.0, 20.0, step).duration(0.5),
        );

        let frames = queue.run_until_idle(1000);
        assert_eq!(frames, 30);
        assert!(handle.is_finished());
        assert_eq!(handle.frames(), 30);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 30);
        assert_eq!(seen[14], 15.0); // progress 0.5
        assert_eq!(*seen.last().unwrap(), 20.0);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn linear_easing_steps_evenly() {
        let (queue, scheduler) = queue();
        let (seen, step) = recorder();
        animate(
            &scheduler,
            AnimationJob::new(0.0, 4.0, step)
                .duration(4.0 / 60.0)
                .easing(Easing::Linear),
        );
        queue.run_until_idle(10);
        assert_eq!(*seen.borrow(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn custom_easing_shapes_each_step() {
        let (queue, scheduler) = queue();
        let (seen, step) = recorder();
        let snap = Easing::custom(|p| if p < 0.5 { 0.0 } else { 1.0 });
        assert_eq!(format!("{snap:?}"), "Custom");
        animate(
            &scheduler,
            AnimationJob::new(10.0, 20.0, step)
                .duration(4.0 / 60.0)
                .easing(snap),
        );
        queue.run_until_idle(10);
        assert_eq!(*seen.borrow(), vec![10.0, 20.0, 20.0, 20.0]);
    }

    #[test]
    fn one_step_per_frame() {
        let (queue, scheduler) = queue();
        let (seen, step) = recorder();
        animate(&scheduler, AnimationJob::new(0.0, 1.0, step));
        for expected in 1..=3 {
            assert_eq!(queue.run_frame(), 1);
            assert_eq!(seen.borrow().len(), expected);
        }
    }

    #[test]
    fn zero_duration_jumps_to_end() {
        let (queue, scheduler) = queue();
        let (seen, step) = recorder();
        animate(&scheduler, AnimationJob::new(3.0, 7.0, step).duration(0.0));
        assert_eq!(queue.run_until_idle(10), 1);
        assert_eq!(*seen.borrow(), vec![7.0]);
    }

    #[test]
    fn cancel_stops_before_next_step() {
        let (queue, scheduler) = queue();
        let (seen, step) = recorder();
        let handle = animate(&scheduler, AnimationJob::new(0.0, 100.0, step));
        queue.run_frame();
        queue.run_frame();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(!handle.is_finished());

        queue.run_until_idle(1000);
        assert_eq!(seen.borrow().len(), 2);
        assert!(handle.is_finished());
        assert!(queue.is_idle());
    }

    #[test]
    fn independent_jobs_interleave() {
        let (queue, scheduler) = queue();
        let (seen_a, step_a) = recorder();
        let (seen_b, step_b) = recorder();
        animate(&scheduler, AnimationJob::new(0.0, 1.0, step_a).duration(0.1));
        animate(&scheduler, AnimationJob::new(5.0, 1.0, step_b).duration(0.05));
        assert_eq!(queue.run_frame(), 2);
        queue.run_until_idle(100);
        assert_eq!(seen_a.borrow().len(), 6);
        assert_eq!(seen_b.borrow().len(), 3);
    }

    #[test]
    fn dropping_queue_discards_pending_frames() {
        let queue = Rc::new(FrameQueue::new());
        let scheduler: Rc<dyn FrameScheduler> = queue.clone();
        let (seen, step) = recorder();
        let handle = animate(&scheduler, AnimationJob::new(0.0, 1.0, step));
        drop(scheduler);
        queue.run_frame();
        drop(queue);
        assert_eq!(seen.borrow().len(), 1);
        assert!(!handle.is_finished());
    }

    #[test]
    fn timer_scheduler_drains_queue() {
        let timer = Rc::new(TimerScheduler::with_interval(Duration::from_millis(1)));
        let scheduler: Rc<dyn FrameScheduler> = timer.clone();
        let (seen, step) = recorder();
        animate(&scheduler, AnimationJob::new(0.0, 2.0, step).duration(0.05));
        assert_eq!(timer.run_until_idle(), 3);
        assert!(timer.is_idle());
        assert_eq!(*seen.borrow().last().unwrap(), 2.0);
    }
}
