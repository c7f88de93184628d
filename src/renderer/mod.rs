//! Span rendering abstraction layer.
//!
//! *Polygon setup never touches a pixel buffer directly.*
//! It produces a [`SpanChain`] and a [`Gradients`] context per visible
//! polygon and hands them, wrapped in a [`SurfaceDraw`], to a type that
//! implements [`SpanRenderer`].
//!
//! * The fill routines in [`software`] are plain functions over borrowed
//!   buffers; [`Software`] is the back-end that owns a frame and picks the
//!   right routine per surface.
//! * A helper blanket-impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.

use std::collections::TryReserveError;

use crate::surface::CacheBlock;

pub mod software;
pub mod spans;

pub use software::{Gradients, PlaneEq, Software, Subdiv};
pub use spans::{NO_SPAN, Span, SpanChain, SpanId};

/// An axis-aligned pixel rectangle inside a buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Things that can go wrong outside the per-pixel paths.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RasterError {
    /// Scratch tables for the screen warp could not be allocated.
    #[error("cannot allocate {len} warp {what}")]
    ScratchAlloc {
        what: &'static str,
        len: usize,
        #[source]
        source: TryReserveError,
    },

    /// A rectangle handed to the warp does not fit its buffer.
    #[error("{which} rect {rect:?} does not fit a buffer of {len} pixels with stride {stride}")]
    RectOutOfBounds {
        which: &'static str,
        rect: Rect,
        stride: usize,
        len: usize,
    },
}

/// How a surface's texels are mapped onto its spans.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Lit, cached texture; affine chunks with optional dithering.
    Solid,
    /// Water, slime, lava: a repeating 64×64 tile, time-distorted.
    Turbulent,
}

/// Everything needed to fill one polygon.
#[derive(Clone, Copy)]
pub struct SurfaceDraw<'a> {
    pub kind: SurfaceKind,
    pub spans: &'a SpanChain,
    pub gradients: &'a Gradients,
    pub cache: &'a CacheBlock,
}

/// Pixel format of the software frame-buffer (8-bit palette index).
pub type Pixel = u8;

/// A renderer that owns an internal view buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
pub trait SpanRenderer {
    /// (Re)allocate internal buffers for the requested resolution, clear
    /// them and latch the frame time used by animated surfaces.
    fn begin_frame(&mut self, width: usize, height: usize, time: f64);

    /// Fill the colour and depth of every span of one polygon.
    fn draw_surface(&mut self, surface: &SurfaceDraw<'_>);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Pixel], w, h)` is run exactly once per frame.
    fn end_frame<F>(&mut self, submit: F) -> Result<(), RasterError>
    where
        F: FnOnce(&[Pixel], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: SpanRenderer {
    fn draw_frame<F>(
        &mut self,
        width: usize,
        height: usize,
        time: f64,
        surfaces: &[SurfaceDraw<'_>],
        submit: F,
    ) -> Result<(), RasterError>
    where
        F: FnOnce(&[Pixel], usize, usize),
    {
        self.begin_frame(width, height, time);
        for s in surfaces {
            self.draw_surface(s);
        }
        self.end_frame(submit)
    }
}
impl<T: SpanRenderer + ?Sized> RendererExt for T {}
