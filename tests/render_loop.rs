use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use glowborder::{
    BorderConfig, DrawCommand, DrawList, GlowError, GlowResult, LoopOpts, PixmapSurface,
    RenderLoop, Rgb8, Surface, SurfaceSize,
};

/// Surface that records what each presented frame drew.
struct RecordingSurface {
    size: SurfaceSize,
    available: Arc<AtomicBool>,
    acquired: bool,
    list: DrawList,
    presented: Arc<Mutex<Vec<DrawList>>>,
    concurrent: Arc<AtomicUsize>,
}

impl RecordingSurface {
    fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            available: Arc::new(AtomicBool::new(true)),
            acquired: false,
            list: DrawList::new(),
            presented: Arc::new(Mutex::new(Vec::new())),
            concurrent: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Surface for RecordingSurface {
    type Target = DrawList;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn try_acquire(&mut self) -> bool {
        if !self.available.load(Ordering::SeqCst) {
            return false;
        }
        assert!(!self.acquired, "buffer acquired twice");
        assert_eq!(self.concurrent.fetch_add(1, Ordering::SeqCst), 0);
        self.acquired = true;
        self.list = DrawList::new();
        true
    }

    fn target(&mut self) -> &mut DrawList {
        &mut self.list
    }

    fn present(&mut self) {
        assert!(self.acquired, "present without acquire");
        self.acquired = false;
        self.concurrent.fetch_sub(1, Ordering::SeqCst);
        let frame = std::mem::take(&mut self.list);
        self.presented.lock().unwrap().push(frame);
    }
}

fn fast_opts() -> LoopOpts {
    LoopOpts {
        frame_interval: Duration::from_millis(2),
        ..LoopOpts::default()
    }
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

fn count(presented: &Arc<Mutex<Vec<DrawList>>>) -> usize {
    presented.lock().unwrap().len()
}

#[test]
fn frames_clear_then_stroke_until_stopped() {
    let surface = RecordingSurface::new(SurfaceSize::new(120, 80));
    let presented = Arc::clone(&surface.presented);
    let surface = Arc::new(Mutex::new(surface));

    let mut rl = RenderLoop::new(surface, Arc::new(BorderConfig::default()), fast_opts());
    assert!(!rl.is_running());
    rl.start().unwrap();
    assert!(rl.is_running());
    assert!(wait_for(|| count(&presented) >= 3));

    rl.stop();
    assert!(!rl.is_running());
    let after_stop = count(&presented);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(count(&presented), after_stop);

    let frames = presented.lock().unwrap();
    for frame in frames.iter() {
        assert_eq!(frame.commands.first(), Some(&DrawCommand::Clear(Rgb8::BLACK)));
        assert!(frame.strokes().count() >= 50);
    }
}

#[test]
fn clock_advances_once_per_drawn_frame_and_resumes() {
    let surface = Arc::new(Mutex::new(RecordingSurface::new(SurfaceSize::new(64, 64))));
    let presented = Arc::clone(&surface.lock().unwrap().presented);

    let config = BorderConfig {
        speed: 100,
        ..BorderConfig::default()
    };
    let mut rl = RenderLoop::new(surface, Arc::new(config), fast_opts());
    rl.start().unwrap();
    assert!(wait_for(|| count(&presented) >= 5));
    rl.stop();

    let frames = count(&presented);
    // One degree per frame at speed 100, well short of a full turn.
    assert_eq!(rl.resume_phase(), frames as f64);

    rl.start().unwrap();
    assert!(wait_for(|| count(&presented) > frames));
    rl.stop();
    assert_eq!(rl.resume_phase(), count(&presented) as f64);
}

#[test]
fn unavailable_surface_skips_frames_without_advancing() {
    let surface = RecordingSurface::new(SurfaceSize::new(64, 64));
    let available = Arc::clone(&surface.available);
    let presented = Arc::clone(&surface.presented);
    available.store(false, Ordering::SeqCst);

    let mut rl = RenderLoop::new(
        Arc::new(Mutex::new(surface)),
        Arc::new(BorderConfig::default()),
        fast_opts(),
    );
    rl.start().unwrap();
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(count(&presented), 0);

    available.store(true, Ordering::SeqCst);
    assert!(wait_for(|| count(&presented) >= 1));
    rl.stop();
    assert!(rl.resume_phase() > 0.0);
}

#[test]
fn failed_frames_are_presented_but_do_not_advance() {
    let surface = RecordingSurface::new(SurfaceSize::new(64, 64));
    let presented = Arc::clone(&surface.presented);
    let config = BorderConfig {
        palette: vec![],
        ..BorderConfig::default()
    };

    let mut rl = RenderLoop::new(Arc::new(Mutex::new(surface)), Arc::new(config), fast_opts());
    rl.start().unwrap();
    assert!(wait_for(|| count(&presented) >= 3));
    rl.stop();

    assert_eq!(rl.resume_phase(), 0.0);
}

#[test]
fn every_start_reloads_the_config() {
    let loads = Arc::new(AtomicUsize::new(0));
    let thickness = Arc::new(Mutex::new(10.0));
    let source = {
        let loads = Arc::clone(&loads);
        let thickness = Arc::clone(&thickness);
        move || -> GlowResult<BorderConfig> {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(BorderConfig {
                thickness_px: *thickness.lock().unwrap(),
                ..BorderConfig::default()
            })
        }
    };

    let surface = Arc::new(Mutex::new(RecordingSurface::new(SurfaceSize::new(64, 64))));
    let presented = Arc::clone(&surface.lock().unwrap().presented);
    let mut rl = RenderLoop::new(surface, Arc::new(source), fast_opts());
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    *thickness.lock().unwrap() = 24.0;
    rl.set_visible(true).unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(rl.config().thickness_px, 24.0);

    assert!(wait_for(|| count(&presented) >= 1));
    rl.set_visible(false).unwrap();
    let frames = presented.lock().unwrap();
    let (_, style, _) = frames[0].strokes().next().unwrap();
    assert_eq!(style.width, 24.0);
}

#[test]
fn failed_reload_keeps_previous_config() {
    let fail = Arc::new(AtomicBool::new(false));
    let source = {
        let fail = Arc::clone(&fail);
        move || -> GlowResult<BorderConfig> {
            if fail.load(Ordering::SeqCst) {
                Err(GlowError::validation("store unavailable"))
            } else {
                Ok(BorderConfig {
                    speed: 7,
                    ..BorderConfig::default()
                })
            }
        }
    };

    let surface = Arc::new(Mutex::new(RecordingSurface::new(SurfaceSize::new(32, 32))));
    let mut rl = RenderLoop::new(surface, Arc::new(source), fast_opts());
    fail.store(true, Ordering::SeqCst);
    rl.start().unwrap();
    assert_eq!(rl.config().speed, 7);
    rl.stop();
}

#[test]
fn restart_never_runs_two_loops() {
    let surface = RecordingSurface::new(SurfaceSize::new(48, 48));
    let presented = Arc::clone(&surface.presented);
    let mut rl = RenderLoop::new(
        Arc::new(Mutex::new(surface)),
        Arc::new(BorderConfig::default()),
        fast_opts(),
    );

    // RecordingSurface asserts on overlapping acquisitions.
    for _ in 0..5 {
        rl.start().unwrap();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(wait_for(|| count(&presented) >= 1));
    drop(rl);
}

#[test]
fn set_config_applies_to_the_running_loop() {
    let surface = RecordingSurface::new(SurfaceSize::new(64, 64));
    let presented = Arc::clone(&surface.presented);
    let mut rl = RenderLoop::new(
        Arc::new(Mutex::new(surface)),
        Arc::new(BorderConfig::default()),
        fast_opts(),
    );
    rl.start().unwrap();
    rl.set_config(BorderConfig {
        palette: vec![Rgb8::WHITE],
        ..BorderConfig::default()
    });

    assert!(wait_for(|| {
        presented
            .lock()
            .unwrap()
            .last()
            .and_then(|f| f.strokes().next().map(|(_, _, c)| c))
            == Some(Rgb8::WHITE)
    }));
    rl.stop();
}

#[test]
fn pixmap_surface_loop_presents_frames() {
    let surface = Arc::new(Mutex::new(
        PixmapSurface::new(SurfaceSize::new(32, 32)).unwrap(),
    ));
    let mut rl = RenderLoop::new(
        Arc::clone(&surface),
        Arc::new(BorderConfig::default()),
        fast_opts(),
    );
    rl.start().unwrap();
    assert!(wait_for(|| surface.lock().unwrap().frames_presented() >= 2));
    rl.stop();

    let frame = surface.lock().unwrap().front_frame();
    assert!(frame.data.chunks(4).any(|px| px[0] != 0 || px[1] != 0 || px[2] != 0));
}

/// Surface whose acquisition blocks for `STALL` while `stall` is set.
struct StallingSurface {
    stall: Arc<AtomicBool>,
    stalled: Arc<AtomicBool>,
    presented: Arc<AtomicUsize>,
    list: DrawList,
}

const STALL: Duration = Duration::from_millis(1000);

impl Surface for StallingSurface {
    type Target = DrawList;

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(48, 48)
    }

    fn try_acquire(&mut self) -> bool {
        if self.stall.load(Ordering::SeqCst) {
            self.stalled.store(true, Ordering::SeqCst);
            std::thread::sleep(STALL);
        }
        self.list = DrawList::new();
        true
    }

    fn target(&mut self) -> &mut DrawList {
        &mut self.list
    }

    fn present(&mut self) {
        self.presented.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn stuck_thread_is_detached_after_stop_timeout() {
    let stall = Arc::new(AtomicBool::new(false));
    let stalled = Arc::new(AtomicBool::new(false));
    let presented = Arc::new(AtomicUsize::new(0));
    let surface = StallingSurface {
        stall: Arc::clone(&stall),
        stalled: Arc::clone(&stalled),
        presented: Arc::clone(&presented),
        list: DrawList::new(),
    };
    let opts = LoopOpts {
        stop_timeout: Duration::from_millis(200),
        ..fast_opts()
    };
    let mut rl = RenderLoop::new(
        Arc::new(Mutex::new(surface)),
        Arc::new(BorderConfig::default()),
        opts,
    );

    rl.start().unwrap();
    assert!(wait_for(|| presented.load(Ordering::SeqCst) >= 3));
    stall.store(true, Ordering::SeqCst);
    assert!(wait_for(|| stalled.load(Ordering::SeqCst)));

    let t0 = Instant::now();
    rl.stop();
    let took = t0.elapsed();
    assert!(took >= Duration::from_millis(200), "stop returned after {took:?}");
    assert!(took < Duration::from_millis(900), "stop waited for the thread: {took:?}");
    assert!(!rl.is_running());
    // The detached thread keeps its clock, so the next run starts over.
    assert_eq!(rl.resume_phase(), 0.0);

    // The new thread waits for the surface until the old one lets go, then draws.
    stall.store(false, Ordering::SeqCst);
    let before = presented.load(Ordering::SeqCst);
    rl.start().unwrap();
    assert!(rl.is_running());
    assert!(wait_for(|| presented.load(Ordering::SeqCst) >= before + 2));
    rl.stop();
    assert!(rl.resume_phase() > 0.0);
}
