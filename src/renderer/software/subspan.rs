//! Piecewise-affine walk across one span.
//!
//! A span is cut into chunks of 8 or 16 pixels. At the far edge of every
//! chunk `1/z` is divided out once to get exact `s`/`t`; inside the chunk
//! the texture coordinates are stepped linearly. The last chunk targets the
//! span's last pixel instead of the far edge, so it never steps past the
//! polygon, and derives its step by division because its width is arbitrary.

use super::gradients::{Fixed16, Gradients, clamp_fixed};
use crate::renderer::spans::Span;

/// Affine chunk width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subdiv {
    Eight,
    Sixteen,
}

impl Subdiv {
    #[inline(always)]
    pub const fn width(self) -> i32 {
        match self {
            Subdiv::Eight => 8,
            Subdiv::Sixteen => 16,
        }
    }

    /// `log2(width)`.
    #[inline(always)]
    pub const fn shift(self) -> u32 {
        match self {
            Subdiv::Eight => 3,
            Subdiv::Sixteen => 4,
        }
    }
}

/// Where the next chunk starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resume {
    /// Restart from the exactly projected far-edge coordinates.
    FarEdge,
    /// Continue from `s + count * sstep`, i.e. wherever stepping ended.
    Stepped,
}

/// One affine chunk, ready to be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subspan {
    pub s: Fixed16,
    pub t: Fixed16,
    pub sstep: Fixed16,
    pub tstep: Fixed16,
    pub snext: Fixed16,
    pub tnext: Fixed16,
    pub count: usize,
    /// Final chunk of the span (division-based step).
    pub last: bool,
}

impl Subspan {
    /// `(s, t)` of the `i`-th pixel of the chunk.
    #[inline(always)]
    pub fn coords(&self, i: usize) -> (Fixed16, Fixed16) {
        let i = i as i32;
        (
            self.s.wrapping_add(self.sstep.wrapping_mul(i)),
            self.t.wrapping_add(self.tstep.wrapping_mul(i)),
        )
    }
}

/// Iterator over the chunks of a single span.
pub struct SubspanWalker<'g> {
    grads: &'g Gradients,
    subdiv: Subdiv,
    resume: Resume,

    /* gradients advanced by one full chunk */
    sdivz_chunk: f32,
    tdivz_chunk: f32,
    zi_chunk: f32,

    sdivz: f32,
    tdivz: f32,
    zi: f32,

    s: Fixed16,
    t: Fixed16,
    // kept across chunks: a one-pixel final chunk reuses the previous step
    sstep: Fixed16,
    tstep: Fixed16,

    remaining: i32,
}

impl<'g> SubspanWalker<'g> {
    pub fn new(grads: &'g Gradients, subdiv: Subdiv, resume: Resume, span: &Span) -> Self {
        let width = subdiv.width() as f32;
        let start = grads.span_start(span);
        Self {
            grads,
            subdiv,
            resume,
            sdivz_chunk: grads.sdivz.step_u * width,
            tdivz_chunk: grads.tdivz.step_u * width,
            zi_chunk: grads.zi.step_u * width,
            sdivz: start.sdivz,
            tdivz: start.tdivz,
            zi: start.zi,
            s: start.s,
            t: start.t,
            sstep: 0,
            tstep: 0,
            remaining: span.count as i32,
        }
    }

    /// Far-edge coordinates clamped to `[chunk width, extent]`. The raised
    /// lower bound keeps negative steps from rounding off the block.
    #[inline(always)]
    fn project_far(&self) -> (Fixed16, Fixed16) {
        let lo = self.subdiv.width();
        let (s, t) = self.grads.project(self.sdivz, self.tdivz, self.zi);
        (
            clamp_fixed(s, lo, self.grads.s_extent),
            clamp_fixed(t, lo, self.grads.t_extent),
        )
    }
}

impl Iterator for SubspanWalker<'_> {
    type Item = Subspan;

    fn next(&mut self) -> Option<Subspan> {
        if self.remaining <= 0 {
            return None;
        }

        let count = self.remaining.min(self.subdiv.width());
        self.remaining -= count;
        let last = self.remaining == 0;

        let (snext, tnext) = if !last {
            self.sdivz += self.sdivz_chunk;
            self.tdivz += self.tdivz_chunk;
            self.zi += self.zi_chunk;

            let (snext, tnext) = self.project_far();
            let shift = self.subdiv.shift();
            self.sstep = (snext - self.s) >> shift;
            self.tstep = (tnext - self.t) >> shift;
            (snext, tnext)
        } else {
            let count_minus1 = (count - 1) as f32;
            self.sdivz += self.grads.sdivz.step_u * count_minus1;
            self.tdivz += self.grads.tdivz.step_u * count_minus1;
            self.zi += self.grads.zi.step_u * count_minus1;

            let (snext, tnext) = self.project_far();
            if count > 1 {
                self.sstep = (snext - self.s) / (count - 1);
                self.tstep = (tnext - self.t) / (count - 1);
            }
            (snext, tnext)
        };

        let chunk = Subspan {
            s: self.s,
            t: self.t,
            sstep: self.sstep,
            tstep: self.tstep,
            snext,
            tnext,
            count: count as usize,
            last,
        };

        match self.resume {
            Resume::FarEdge => {
                self.s = snext;
                self.t = tnext;
            }
            Resume::Stepped => {
                (self.s, self.t) = chunk.coords(chunk.count);
            }
        }

        Some(chunk)
    }
}
