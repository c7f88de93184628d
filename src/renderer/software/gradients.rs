use crate::renderer::spans::Span;

/// 16.16 fixed-point value.
pub type Fixed16 = i32;

/// `1.0` in 16.16.
pub const FIXED_ONE: f32 = 65536.0;

/// A quantity that varies linearly over the screen:
/// `value(u, v) = origin + v * step_v + u * step_u`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaneEq {
    pub origin: f32,
    pub step_u: f32,
    pub step_v: f32,
}

impl PlaneEq {
    pub const fn new(origin: f32, step_u: f32, step_v: f32) -> Self {
        Self {
            origin,
            step_u,
            step_v,
        }
    }

    /// Evaluate at screen pixel `(u, v)`. The summation order is part of
    /// the bit-exact output.
    #[inline(always)]
    pub fn at(&self, u: f32, v: f32) -> f32 {
        self.origin + v * self.step_v + u * self.step_u
    }
}

/// Per-polygon perspective gradients, produced by polygon setup.
///
/// `sdivz` / `tdivz` are in texels per unit of `1/z`; `s_adjust`,
/// `t_adjust` shift the projected coordinates into the cache block and
/// `s_extent`, `t_extent` are the largest valid 16.16 coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gradients {
    pub sdivz: PlaneEq,
    pub tdivz: PlaneEq,
    pub zi: PlaneEq,
    pub s_adjust: Fixed16,
    pub t_adjust: Fixed16,
    pub s_extent: Fixed16,
    pub t_extent: Fixed16,
}

/// Interpolants at the first pixel of a span, `s`/`t` already clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpanStart {
    pub sdivz: f32,
    pub tdivz: f32,
    pub zi: f32,
    pub s: Fixed16,
    pub t: Fixed16,
}

impl Gradients {
    /// Project the perspective quantities back to 16.16 texel space.
    #[inline(always)]
    pub fn project(&self, sdivz: f32, tdivz: f32, zi: f32) -> (Fixed16, Fixed16) {
        let z = FIXED_ONE / zi; // prescale to 16.16
        let s = ((sdivz * z) as i32).wrapping_add(self.s_adjust);
        let t = ((tdivz * z) as i32).wrapping_add(self.t_adjust);
        (s, t)
    }

    /// Interpolants at `span`'s first pixel, clamped to `[0, extent]`.
    pub fn span_start(&self, span: &Span) -> SpanStart {
        let du = span.x_start as f32;
        let dv = span.y as f32;

        let sdivz = self.sdivz.at(du, dv);
        let tdivz = self.tdivz.at(du, dv);
        let zi = self.zi.at(du, dv);

        let (s, t) = self.project(sdivz, tdivz, zi);
        SpanStart {
            sdivz,
            tdivz,
            zi,
            s: clamp_fixed(s, 0, self.s_extent),
            t: clamp_fixed(t, 0, self.t_extent),
        }
    }
}

/// Clamp with the upper bound tested first: `hi` wins only when `v > hi`,
/// a value below both bounds takes `lo`.
#[inline(always)]
pub fn clamp_fixed(v: Fixed16, lo: Fixed16, hi: Fixed16) -> Fixed16 {
    if v > hi {
        hi
    } else if v < lo {
        lo
    } else {
        v
    }
}
