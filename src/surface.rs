use crate::{
    core::SurfaceSize,
    cpu::CpuCanvas,
    error::{GlowError, GlowResult},
    render::DrawTarget,
};

/// A presentable drawing surface owned by the host.
///
/// One frame is `try_acquire` → draw into `target` → `present`. Use [`begin_frame`] rather than
/// calling these directly so `present` always runs.
pub trait Surface: Send {
    type Target: DrawTarget;

    fn size(&self) -> SurfaceSize;

    /// Lock the back buffer for drawing. Returns `false` when the surface cannot be drawn
    /// right now (hidden, detached, zero-sized); the caller skips the frame.
    fn try_acquire(&mut self) -> bool;

    /// Drawing target of the acquired buffer.
    fn target(&mut self) -> &mut Self::Target;

    /// Release the buffer acquired by `try_acquire` and show it.
    fn present(&mut self);
}

/// Scoped buffer acquisition. Presents the buffer when dropped, including on early return,
/// error propagation and unwinding.
pub struct FrameGuard<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    size: SurfaceSize,
}

impl<S: Surface + ?Sized> FrameGuard<'_, S> {
    /// Surface size captured when the buffer was acquired.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn target(&mut self) -> &mut S::Target {
        self.surface.target()
    }
}

impl<S: Surface + ?Sized> Drop for FrameGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.present();
    }
}

pub fn begin_frame<S: Surface + ?Sized>(surface: &mut S) -> Option<FrameGuard<'_, S>> {
    let size = surface.size();
    if !surface.try_acquire() {
        return None;
    }
    Some(FrameGuard { surface, size })
}

/// RGBA8 frame read back from a surface.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel data with straight (non-premultiplied) alpha, as image files expect.
    pub fn to_straight_alpha(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Double-buffered CPU surface.
///
/// Frames are drawn into the back buffer and swapped to the front on present, so readers of
/// [`front_frame`](Self::front_frame) only ever see complete frames.
pub struct PixmapSurface {
    width: u16,
    height: u16,
    canvas: CpuCanvas,
    front: vello_cpu::Pixmap,
    back: vello_cpu::Pixmap,
    attached: bool,
    acquired: bool,
    presented: u64,
}

impl PixmapSurface {
    pub fn new(size: SurfaceSize) -> GlowResult<Self> {
        let (width, height) = checked_dims(size)?;
        Ok(Self {
            width,
            height,
            canvas: CpuCanvas::new(width, height),
            front: vello_cpu::Pixmap::new(width, height),
            back: vello_cpu::Pixmap::new(width, height),
            attached: true,
            acquired: false,
            presented: 0,
        })
    }

    /// Reallocate both buffers for a new size. Contents are discarded.
    pub fn resize(&mut self, size: SurfaceSize) -> GlowResult<()> {
        let (width, height) = checked_dims(size)?;
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.canvas = CpuCanvas::new(width, height);
        self.front = vello_cpu::Pixmap::new(width, height);
        self.back = vello_cpu::Pixmap::new(width, height);
        Ok(())
    }

    /// Mark the surface as gone; acquisition fails until [`attach`](Self::attach).
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// Copy of the most recently presented frame (premultiplied RGBA8).
    pub fn front_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.front.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

impl Surface for PixmapSurface {
    type Target = CpuCanvas;

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(u32::from(self.width), u32::from(self.height))
    }

    fn try_acquire(&mut self) -> bool {
        if !self.attached || self.acquired {
            return false;
        }
        self.canvas = CpuCanvas::new(self.width, self.height);
        self.acquired = true;
        true
    }

    fn target(&mut self) -> &mut CpuCanvas {
        &mut self.canvas
    }

    fn present(&mut self) {
        if !self.acquired {
            return;
        }
        self.acquired = false;
        match self.canvas.finish_into(&mut self.back) {
            Ok(()) => {
                std::mem::swap(&mut self.front, &mut self.back);
                self.presented += 1;
            }
            Err(err) => tracing::warn!(error = %err, "discarding unpresentable frame"),
        }
    }
}

fn checked_dims(size: SurfaceSize) -> GlowResult<(u16, u16)> {
    if size.is_empty() {
        return Err(GlowError::surface("surface width/height must be > 0"));
    }
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| GlowError::surface("surface width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| GlowError::surface("surface height exceeds u16"))?;
    Ok((w, h))
}
