// Texel blocks handed to the span fillers by the surface cache.
// The fillers only ever read them, one polygon at a time.

use std::ops::Index;

/// A rectangular block of 8-bit palette indices in row-major order.
///
/// `width` doubles as the row stride used by the fillers
/// (`pixels[t * width + s]`).
#[derive(Clone, Debug, PartialEq)]
pub struct CacheBlock {
    pub name: String,
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for CacheBlock {
    fn default() -> Self {
        Self {
            name: "CHECKER".into(),
            width: 8,
            height: 8,
            pixels: checker_pixels(8, 8, 1, 8, 16),
        }
    }
}

fn checker_pixels(width: usize, height: usize, cell: usize, light: u8, dark: u8) -> Vec<u8> {
    let cell = cell.max(1);
    let mut pixels = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            pixels[y * width + x] = if ((x / cell) ^ (y / cell)) & 1 == 0 {
                light
            } else {
                dark
            };
        }
    }
    pixels
}

/// Things that can go wrong when building a block.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Pixel vector does not hold exactly `width * height` texels.
    #[error("cache block {width}x{height} needs {} texels, got {len}", width * height)]
    SizeMismatch {
        width: usize,
        height: usize,
        len: usize,
    },

    /// Zero-sized blocks cannot be sampled.
    #[error("cache block must be at least 1x1")]
    Empty,
}

impl CacheBlock {
    /// Wrap already decoded texels.
    pub fn new<S: Into<String>>(
        name: S,
        width: usize,
        height: usize,
        pixels: Vec<u8>,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        if pixels.len() != width * height {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            pixels,
        })
    }

    /// Two-colour checkerboard with `cell`-texel squares.
    pub fn checker<S: Into<String>>(
        name: S,
        width: usize,
        height: usize,
        cell: usize,
        light: u8,
        dark: u8,
    ) -> Result<Self, TextureError> {
        Self::new(name, width, height, checker_pixels(width, height, cell, light, dark))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Largest 16.16 `s` that still lands inside the block.
    #[inline]
    pub fn s_extent(&self) -> i32 {
        ((self.width as i32) << 16) - 1
    }

    /// Largest 16.16 `t` that still lands inside the block.
    #[inline]
    pub fn t_extent(&self) -> i32 {
        ((self.height as i32) << 16) - 1
    }
}

impl Index<usize> for CacheBlock {
    type Output = u8;
    #[inline(always)]
    fn index(&self, idx: usize) -> &u8 {
        &self.pixels[idx]
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
