//! ---------------------------------------------------------------------------
//! Classic software (CPU) span renderer
//!
//! * Fills an 8-bit palettised view buffer and a 16-bit depth buffer.
//! * Relies on polygon setup to feed one [`SurfaceDraw`] per visible
//!   polygon; spans never overlap within a frame, so depth is written but
//!   never tested here.
//!
//! The fill routines themselves are free functions over borrowed buffers
//! and can be driven without [`Software`].
//! ---------------------------------------------------------------------------

mod dither;
mod gradients;
mod solid;
mod subspan;
mod turb_tables;
mod turbulent;
mod warp;
mod zspans;

pub use dither::{DITHER_KERNEL, draw_spans8_dither};
pub use gradients::{FIXED_ONE, Fixed16, Gradients, PlaneEq, SpanStart, clamp_fixed};
pub use solid::{draw_spans, draw_spans8, draw_spans16};
pub use subspan::{Resume, Subdiv, Subspan, SubspanWalker};
pub use turb_tables::{
    INTSINTABLE, SINTABLE, TURB_AMP, TURB_CYCLE, TURB_SCREEN_AMP, TURB_SPEED, TURB_TEX_SIZE,
    Turb, turb_phase,
};
pub use turbulent::draw_turbulent_spans;
pub use warp::warp_screen;
pub use zspans::{ZSpanLayout, draw_z_spans};

use crate::{
    config::RasterConfig,
    renderer::{
        Pixel, RasterError, Rect, SpanRenderer, SurfaceDraw, SurfaceKind, spans::Span,
    },
};

/// Borrow the `count` destination cells of `span` in a row-major buffer.
#[inline]
pub(crate) fn span_row<'b, T>(buf: &'b mut [T], stride: usize, span: &Span) -> &'b mut [T] {
    let x = span.x_start as usize;
    let n = span.count as usize;
    debug_assert!(x + n <= stride, "span {span:?} runs past row stride {stride}");
    let start = span.y as usize * stride + x;
    &mut buf[start..start + n]
}

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

/// Span renderer owning one frame's view, depth and present buffers.
#[derive(Default)]
pub struct Software {
    pub config: RasterConfig,

    view: Vec<Pixel>,
    /* warp target, only touched when `config.warp` is set */
    present: Vec<Pixel>,
    zbuffer: Vec<u16>,

    width: usize,
    height: usize,
    time: f64,
}

impl Software {
    pub fn new(config: RasterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The frame rendered so far (before any warp).
    pub fn view(&self) -> &[Pixel] {
        &self.view
    }

    pub fn zbuffer(&self) -> &[u16] {
        &self.zbuffer
    }
}

/*──────────────────────── SpanRenderer trait impl ────────────────────*/
impl SpanRenderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize, time: f64) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            log::debug!("software renderer resized {}x{} -> {w}x{h}", self.width, self.height);
            self.width = w;
            self.height = h;
            self.view.resize(w * h, 0);
            self.present.resize(w * h, 0);
            self.zbuffer.resize(w * h, 0);
        }

        self.view.fill(0);
        // zero is infinitely far away
        self.zbuffer.fill(0);
        self.time = time;
    }

    fn draw_surface(&mut self, surf: &SurfaceDraw<'_>) {
        let (spans, grads, cache) = (surf.spans, surf.gradients, surf.cache);
        let stride = self.width;

        match surf.kind {
            SurfaceKind::Turbulent => {
                draw_turbulent_spans(spans, grads, cache, &mut self.view, stride, self.time)
            }
            SurfaceKind::Solid if self.config.dither => {
                draw_spans8_dither(spans, grads, cache, &mut self.view, stride)
            }
            SurfaceKind::Solid => {
                draw_spans(spans, grads, cache, &mut self.view, stride, self.config.subdiv)
            }
        }

        draw_z_spans(spans, &grads.zi, &mut self.zbuffer, stride);
    }

    fn end_frame<F>(&mut self, submit: F) -> Result<(), RasterError>
    where
        F: FnOnce(&[Pixel], usize, usize),
    {
        if !self.config.warp {
            submit(&self.view, self.width, self.height);
            return Ok(());
        }

        let full = Rect::new(0, 0, self.width, self.height);
        warp_screen(
            &self.view,
            self.width,
            full,
            &mut self.present,
            self.width,
            full,
            self.time,
        )?;
        submit(&self.present, self.width, self.height);
        Ok(())
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
