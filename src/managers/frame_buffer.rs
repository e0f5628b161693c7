//! Frame buffer allocation and copy semantics.
//!
//! The engine's paint callback hands us raw BGRA pixels on its own thread;
//! this manager owns getting those bytes into a tab's [`PixelBuffer`]
//! without reading or writing out of bounds, and without paying for a
//! full-frame copy when the engine reports fine-grained dirty regions.
//! It knows nothing about tabs or threads: pure data movement.

use tracing::{debug, warn};

use crate::types::errors::FrameBufferError;
use crate::types::frame::{BufferSize, DirtyRect, PixelBuffer};

/// Hard ceiling for either buffer dimension, in pixels.
pub const MAX_DIMENSION: i32 = 8192;

/// Hard ceiling for a single buffer's backing storage: 256 MiB.
pub const MAX_BUFFER_BYTES: usize = 256 * 1024 * 1024;

const BYTES_PER_PIXEL: usize = 4;

/// Bytes per row for a given width: `width * 4` rounded up to the next
/// multiple of 4. With 4-byte pixels the rounding is already satisfied, but
/// the alignment is part of the buffer contract, not an accident of the
/// pixel format.
pub fn calculate_stride(width: i32) -> usize {
    (width as usize * BYTES_PER_PIXEL + 3) & !3
}

/// Trait defining the frame buffer operations.
pub trait FrameBufferManagerTrait {
    fn allocate(&self, size: BufferSize) -> Result<PixelBuffer, FrameBufferError>;
    fn copy_full(
        &self,
        dest: &mut PixelBuffer,
        src: &[u8],
        size: BufferSize,
    ) -> Result<(), FrameBufferError>;
    fn copy_dirty(
        &self,
        dest: &mut PixelBuffer,
        src: &[u8],
        size: BufferSize,
        dirty: &[DirtyRect],
    ) -> Result<(), FrameBufferError>;
}

/// Stateless implementation of the frame buffer operations.
pub struct FrameBufferManager;

impl FrameBufferManager {
    pub fn new() -> Self {
        Self
    }

    /// Shared preconditions for both copy entry points. Returns the source
    /// row stride (the producer reports width-only rows).
    fn check_copy(
        dest: &PixelBuffer,
        src: &[u8],
        size: BufferSize,
    ) -> Result<usize, FrameBufferError> {
        if src.is_empty() {
            return Err(FrameBufferError::NullSource);
        }
        if !dest.is_allocated() {
            return Err(FrameBufferError::InvalidDestination);
        }
        if dest.size() != size {
            return Err(FrameBufferError::SizeMismatch);
        }
        let src_stride = size.width as usize * BYTES_PER_PIXEL;
        // The original consumed a raw pointer here; with a slice we can
        // refuse a short source instead of reading garbage.
        if src.len() < src_stride * size.height as usize {
            return Err(FrameBufferError::SizeMismatch);
        }
        Ok(src_stride)
    }
}

impl Default for FrameBufferManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBufferManagerTrait for FrameBufferManager {
    /// Allocate a zero-initialized buffer for `size`.
    ///
    /// Fails with `InvalidSize` for non-positive dimensions, dimensions over
    /// [`MAX_DIMENSION`], or a byte size over [`MAX_BUFFER_BYTES`]; with
    /// `OutOfMemory` when the allocator refuses.
    fn allocate(&self, size: BufferSize) -> Result<PixelBuffer, FrameBufferError> {
        if size.width <= 0 || size.height <= 0 {
            return Err(FrameBufferError::InvalidSize(size.width, size.height));
        }
        if size.width > MAX_DIMENSION || size.height > MAX_DIMENSION {
            return Err(FrameBufferError::InvalidSize(size.width, size.height));
        }

        let stride = calculate_stride(size.width);
        let bytes = stride
            .checked_mul(size.height as usize)
            .ok_or(FrameBufferError::InvalidSize(size.width, size.height))?;
        if bytes > MAX_BUFFER_BYTES {
            return Err(FrameBufferError::InvalidSize(size.width, size.height));
        }

        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| FrameBufferError::OutOfMemory)?;
        data.resize(bytes, 0);

        Ok(PixelBuffer::from_parts(data, size.width, size.height, stride))
    }

    /// Copy a whole frame from `src` into `dest`.
    ///
    /// Copies `min(src_stride, dest_stride)` bytes per row for `size.height`
    /// rows, which tolerates a source stride wider than the destination
    /// without reading past destination bounds. Never mutates `src`.
    fn copy_full(
        &self,
        dest: &mut PixelBuffer,
        src: &[u8],
        size: BufferSize,
    ) -> Result<(), FrameBufferError> {
        let src_stride = Self::check_copy(dest, src, size)?;
        let dest_stride = dest.stride();
        let row_bytes = src_stride.min(dest_stride);

        let data = dest.data_mut();
        for row in 0..size.height as usize {
            let src_off = row * src_stride;
            let dest_off = row * dest_stride;
            data[dest_off..dest_off + row_bytes]
                .copy_from_slice(&src[src_off..src_off + row_bytes]);
        }
        Ok(())
    }

    /// Copy only the dirty regions of a frame from `src` into `dest`.
    ///
    /// An empty rect list degrades to [`copy_full`](Self::copy_full); that
    /// is the whole-frame policy when the engine cannot report fine-grained
    /// dirt, not a no-op. Rects that are zero-area or fall outside the
    /// buffer are skipped and logged; one bad rect never discards the rest
    /// of the update.
    fn copy_dirty(
        &self,
        dest: &mut PixelBuffer,
        src: &[u8],
        size: BufferSize,
        dirty: &[DirtyRect],
    ) -> Result<(), FrameBufferError> {
        if dirty.is_empty() {
            return self.copy_full(dest, src, size);
        }

        let src_stride = Self::check_copy(dest, src, size)?;
        let dest_stride = dest.stride();

        let data = dest.data_mut();
        for rect in dirty {
            if rect.is_empty() {
                debug!(?rect, "skipping zero-area dirty rect");
                continue;
            }
            if !rect.contained_in(size) {
                warn!(?rect, width = size.width, height = size.height, "skipping out-of-bounds dirty rect");
                continue;
            }

            // Row-by-row with row-local offsets against the respective
            // strides. Row granularity, never per-pixel: alignment is
            // row-uniform even when the strides differ.
            let x_off = rect.x as usize * BYTES_PER_PIXEL;
            let rect_bytes = rect.width as usize * BYTES_PER_PIXEL;
            for row in rect.y as usize..(rect.y + rect.height) as usize {
                let src_off = row * src_stride + x_off;
                let dest_off = row * dest_stride + x_off;
                data[dest_off..dest_off + rect_bytes]
                    .copy_from_slice(&src[src_off..src_off + rect_bytes]);
            }
        }
        Ok(())
    }
}
