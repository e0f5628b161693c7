//! Render-surface backends.
//!
//! One window-system-facing interface, two interchangeable implementations:
//! [`SoftSurface`] blits the active tab's BGRA frame into the window with a
//! CPU swapchain, and [`HeadlessSurface`] records presentations offscreen
//! for tests and CI. The frame machinery and the tab registry depend on
//! neither; they only ever see [`PaintSurface`].

use std::num::NonZeroU32;
use std::rc::Rc;

use tao::window::Window;

use crate::types::frame::BufferSize;

/// Borrowed view of a tab's frame for presentation.
#[derive(Debug, Clone, Copy)]
pub struct FrameRef<'a> {
    pub pixels: &'a [u8],
    pub size: BufferSize,
    pub stride: usize,
}

/// A GUI-visible paint target for one window's content area.
pub trait PaintSurface {
    /// Present `frame` into a window of `width` x `height` physical pixels,
    /// clearing any area the frame does not cover. `None` clears the whole
    /// content area (no tab, or no paint yet).
    fn present(
        &mut self,
        width: u32,
        height: u32,
        frame: Option<FrameRef<'_>>,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// Window background behind and around the page content.
const CLEAR_COLOR: u32 = 0x001e1f24;

/// CPU-blit surface over the native window.
pub struct SoftSurface {
    surface: softbuffer::Surface<Rc<Window>, Rc<Window>>,
}

impl SoftSurface {
    pub fn new(window: Rc<Window>) -> Result<Self, Box<dyn std::error::Error>> {
        let context = softbuffer::Context::new(Rc::clone(&window))?;
        let surface = softbuffer::Surface::new(&context, window)?;
        Ok(Self { surface })
    }
}

impl PaintSurface for SoftSurface {
    fn present(
        &mut self,
        width: u32,
        height: u32,
        frame: Option<FrameRef<'_>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Ok(());
        };
        self.surface.resize(w, h)?;

        let mut target = self.surface.buffer_mut()?;
        target.fill(CLEAR_COLOR);

        if let Some(frame) = frame {
            blit(&mut target, width, height, frame);
        }

        target.present()?;
        Ok(())
    }
}

/// Offscreen surface: keeps the last presented pixels for inspection.
#[derive(Default)]
pub struct HeadlessSurface {
    last: Vec<u32>,
    width: u32,
    height: u32,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> (&[u32], u32, u32) {
        (&self.last, self.width, self.height)
    }
}

impl PaintSurface for HeadlessSurface {
    fn present(
        &mut self,
        width: u32,
        height: u32,
        frame: Option<FrameRef<'_>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.last.clear();
        self.last.resize((width * height) as usize, CLEAR_COLOR);
        self.width = width;
        self.height = height;
        if let Some(frame) = frame {
            blit(&mut self.last, width, height, frame);
        }
        Ok(())
    }
}

/// Copy BGRA rows into the `0RGB` u32 layout the swapchain expects. BGRA
/// bytes read little-endian are exactly `0xAARRGGBB`, so each pixel is one
/// `u32::from_le_bytes` plus an alpha mask.
fn blit(target: &mut [u32], target_width: u32, target_height: u32, frame: FrameRef<'_>) {
    let copy_w = (frame.size.width.max(0) as u32).min(target_width) as usize;
    let copy_h = (frame.size.height.max(0) as u32).min(target_height) as usize;

    for row in 0..copy_h {
        let src_row = &frame.pixels[row * frame.stride..];
        let dst_row = &mut target[row * target_width as usize..];
        for col in 0..copy_w {
            let px = &src_row[col * 4..col * 4 + 4];
            let bgra = u32::from_le_bytes([px[0], px[1], px[2], px[3]]);
            dst_row[col] = bgra & 0x00ff_ffff;
        }
    }
}
