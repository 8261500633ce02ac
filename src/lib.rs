#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod core;
pub mod cpu;
pub mod error;
pub mod geometry;
pub mod preview;
pub mod ramp;
pub mod render;
pub mod render_loop;
pub mod sampler;
pub mod segmenter;
pub mod surface;

pub use clock::{AnimationClock, tick};
pub use config::{BorderConfig, ConfigHandle, ConfigSource, default_palette};
pub use crate::core::{Rgb8, SurfaceSize};
pub use cpu::CpuCanvas;
pub use error::{GlowError, GlowResult};
pub use geometry::{boundary_path, inset_bounds};
pub use preview::PreviewAnimator;
pub use ramp::ColorRamp;
pub use render::{DrawCommand, DrawList, DrawTarget, FrameStats, StrokeStyle, render_frame};
pub use render_loop::{LoopOpts, RenderLoop};
pub use sampler::{PathFragment, PathSampler};
pub use segmenter::{Segment, compute_segments};
pub use surface::{FrameGuard, FrameRGBA, PixmapSurface, Surface, begin_frame};
