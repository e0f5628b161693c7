use serde::{Deserialize, Serialize};

/// Dimensions of a pixel buffer in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSize {
    pub width: i32,
    pub height: i32,
}

impl BufferSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A rectangular region of a frame that changed since the previous paint,
/// in pixel units relative to the owning buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rect with no area contributes nothing to a copy.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the rect lies fully within `[0, width) x [0, height)` of
    /// a buffer of the given size.
    pub fn contained_in(&self, size: BufferSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= size.width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= size.height)
    }
}

/// An exclusively-owned BGRA pixel buffer with a 4-byte-aligned row stride.
///
/// The backing storage is allocated once, zero-initialized, and is immutable
/// in size for the buffer's lifetime: a size change always replaces the
/// buffer, never grows it in place. Buffers are never shared between tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: i32,
    height: i32,
    stride: usize,
}

impl PixelBuffer {
    pub(crate) fn from_parts(data: Vec<u8>, width: i32, height: i32, stride: usize) -> Self {
        debug_assert_eq!(data.len(), stride * height as usize);
        Self {
            data,
            width,
            height,
            stride,
        }
    }

    /// Whether backing storage exists. A default-constructed buffer has none
    /// and is not a valid copy destination.
    pub fn is_allocated(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn size(&self) -> BufferSize {
        BufferSize::new(self.width, self.height)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Bytes per row, always a multiple of 4 and >= `width * 4`.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The pixel row at `y`, trimmed to the visible `width * 4` bytes.
    pub fn row(&self, y: i32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * 4]
    }
}
