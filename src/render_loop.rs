//! Background render thread driving a [`Surface`] at a fixed frame interval.

use std::{
    sync::{
        Arc, Mutex,
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::{
    clock::AnimationClock,
    config::{BorderConfig, ConfigHandle, ConfigSource},
    core::Rgb8,
    error::{GlowError, GlowResult},
    render::{DrawTarget, render_frame},
    surface::{Surface, begin_frame},
};

/// Pacing and teardown settings for a [`RenderLoop`].
#[derive(Clone, Debug)]
pub struct LoopOpts {
    /// Target time between frame starts (~60 Hz by default). Best effort.
    pub frame_interval: Duration,
    /// How long [`RenderLoop::stop`] waits for the thread before detaching it.
    pub stop_timeout: Duration,
    /// Color every frame is cleared to before the border is drawn.
    pub background: Rgb8,
}

impl Default for LoopOpts {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            stop_timeout: Duration::from_secs(1),
            background: Rgb8::BLACK,
        }
    }
}

enum LoopCommand {
    Stop,
}

struct Worker {
    commands: Sender<LoopCommand>,
    // The thread hands its clock back on exit so the animation resumes where it stopped.
    done: Receiver<AnimationClock>,
    handle: JoinHandle<()>,
}

/// Owns the render thread for one surface.
///
/// Stopped until [`start`](Self::start); `start` while running restarts the thread, so at most
/// one loop ever draws to the surface. Dropping the loop stops it.
pub struct RenderLoop<S: Surface + 'static> {
    surface: Arc<Mutex<S>>,
    source: Arc<dyn ConfigSource>,
    config: ConfigHandle,
    opts: LoopOpts,
    clock: AnimationClock,
    worker: Option<Worker>,
}

impl<S: Surface + 'static> RenderLoop<S> {
    pub fn new(surface: Arc<Mutex<S>>, source: Arc<dyn ConfigSource>, opts: LoopOpts) -> Self {
        let initial = match source.load() {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(error = %err, "config load failed; using defaults");
                BorderConfig::default()
            }
        };
        Self {
            surface,
            source,
            config: ConfigHandle::new(initial),
            opts,
            clock: AnimationClock::new(),
            worker: None,
        }
    }

    pub fn surface(&self) -> &Arc<Mutex<S>> {
        &self.surface
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Configuration the next frame will use.
    pub fn config(&self) -> Arc<BorderConfig> {
        self.config.snapshot()
    }

    /// Swap in a new configuration; a running loop picks it up on the current or next frame.
    pub fn set_config(&self, config: BorderConfig) {
        self.config.replace(config);
    }

    /// Phase the animation will resume from. Only meaningful while stopped; the running
    /// thread owns the live clock.
    pub fn resume_phase(&self) -> f64 {
        self.clock.phase()
    }

    /// Host visibility hook: visible starts (or restarts) the loop, hidden stops it.
    pub fn set_visible(&mut self, visible: bool) -> GlowResult<()> {
        tracing::debug!(visible, "visibility changed");
        if visible {
            self.start()
        } else {
            self.stop();
            Ok(())
        }
    }

    /// Stop any running thread, reload the configuration and spawn a fresh render thread.
    pub fn start(&mut self) -> GlowResult<()> {
        self.stop();
        self.reload_config();

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::sync_channel(1);
        let frame_loop = FrameLoop {
            surface: Arc::clone(&self.surface),
            config: self.config.clone(),
            opts: self.opts.clone(),
            clock: self.clock,
            commands: cmd_rx,
        };

        let handle = std::thread::Builder::new()
            .name("glowborder-render".to_string())
            .spawn(move || {
                let clock = frame_loop.run();
                let _ = done_tx.send(clock);
            })
            .map_err(|e| GlowError::render(format!("failed to spawn render thread: {e}")))?;

        self.worker = Some(Worker {
            commands: cmd_tx,
            done: done_rx,
            handle,
        });
        tracing::debug!("render thread started");
        Ok(())
    }

    /// Signal the render thread and wait (bounded by `stop_timeout`) for it to exit.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = worker.commands.send(LoopCommand::Stop);

        match worker.done.recv_timeout(self.opts.stop_timeout) {
            Ok(clock) => {
                self.clock = clock;
                if worker.handle.join().is_err() {
                    tracing::warn!("render thread panicked after reporting exit");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout = ?self.opts.stop_timeout,
                    "render thread did not stop in time; detaching it"
                );
                self.clock = AnimationClock::new();
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.handle.join();
                tracing::warn!("render thread exited abnormally");
                self.clock = AnimationClock::new();
            }
        }
        tracing::debug!("render thread stopped");
    }

    fn reload_config(&self) {
        match self.source.load() {
            Ok(config) => {
                tracing::debug!(
                    thickness_px = config.thickness_px,
                    speed = config.speed,
                    visible_percent = config.visible_percent,
                    corner_radius_px = config.corner_radius_px,
                    colors = config.palette.len(),
                    "config reloaded"
                );
                self.config.replace(config);
            }
            Err(err) => {
                tracing::warn!(error = %err, "config reload failed; keeping previous config");
            }
        }
    }
}

impl<S: Surface + 'static> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State moved onto the render thread.
struct FrameLoop<S: Surface> {
    surface: Arc<Mutex<S>>,
    config: ConfigHandle,
    opts: LoopOpts,
    clock: AnimationClock,
    commands: Receiver<LoopCommand>,
}

impl<S: Surface> FrameLoop<S> {
    fn run(mut self) -> AnimationClock {
        loop {
            let frame_start = Instant::now();
            if self.stop_requested() {
                break;
            }

            self.draw_frame();

            let remaining = self
                .opts
                .frame_interval
                .saturating_sub(frame_start.elapsed());
            match self.commands.recv_timeout(remaining) {
                Ok(LoopCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        self.clock
    }

    fn stop_requested(&self) -> bool {
        matches!(
            self.commands.try_recv(),
            Ok(LoopCommand::Stop) | Err(TryRecvError::Disconnected)
        )
    }

    fn draw_frame(&mut self) {
        let config = self.config.snapshot();
        let mut surface = self.surface.lock().unwrap_or_else(|e| e.into_inner());
        let Some(mut frame) = begin_frame(&mut *surface) else {
            tracing::trace!("surface unavailable; skipping frame");
            return;
        };

        let size = frame.size();
        let target = frame.target();
        target.clear(self.opts.background);
        match render_frame(&config, self.clock.phase(), size, target) {
            Ok(_) => {
                self.clock.advance(1, config.speed);
            }
            Err(err) => tracing::warn!(error = %err, "dropped frame"),
        }
    }
}
