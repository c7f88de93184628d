//! Ordered-dither texture spans.
//!
//! Each pixel nudges its texture coordinate by a sub-texel offset picked
//! from a 2×2 kernel by screen parity, so neighbouring pixels alternate
//! between two nearby texels. Chunks are always 8 pixels wide.

use super::{
    gradients::{Fixed16, Gradients},
    span_row,
    subspan::{Resume, Subdiv, SubspanWalker},
};
use crate::{renderer::spans::SpanChain, surface::CacheBlock};

/// `(s, t)` offsets in 16.16, indexed `[x & 1][y & 1]`.
pub const DITHER_KERNEL: [[(Fixed16, Fixed16); 2]; 2] = [
    [(16384, 0), (49152, 32768)],
    [(32768, 49152), (0, 16384)],
];

/// Integer texel for `coord + offset`, pulled back by one so the offset
/// can never push past the block's last texel.
#[inline(always)]
fn dithered_texel(coord: Fixed16, offset: Fixed16) -> usize {
    let i = (coord + offset) >> 16;
    if i != 0 { (i - 1) as usize } else { 0 }
}

pub fn draw_spans8_dither(
    spans: &SpanChain,
    grads: &Gradients,
    cache: &CacheBlock,
    dst: &mut [u8],
    stride: usize,
) {
    let pbase = cache.pixels();
    let cachewidth = cache.width();

    for span in spans {
        let row = span_row(dst, stride, span);
        let kernel_row = span.y as usize & 1;
        let mut x = 0;

        // chunks continue from the stepped coordinates, not the far edge
        for chunk in SubspanWalker::new(grads, Subdiv::Eight, Resume::Stepped, span) {
            let (mut s, mut t) = (chunk.s, chunk.t);
            for px in &mut row[x..x + chunk.count] {
                let kernel_col = (span.x_start as usize + x) & 1;
                let (ds, dt) = DITHER_KERNEL[kernel_col][kernel_row];

                let is = dithered_texel(s, ds);
                let it = dithered_texel(t, dt);
                *px = pbase[it * cachewidth + is];

                s += chunk.sstep;
                t += chunk.tstep;
                x += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::software::gradients::PlaneEq;

    const W: usize = 32;

    fn ramp() -> CacheBlock {
        let pixels = (0..16 * 16).map(|i| i as u8).collect();
        CacheBlock::new("RAMP", 16, 16, pixels).unwrap()
    }

    /// Constant coordinate `(s, t)` in texels everywhere on screen.
    fn constant(cache: &CacheBlock, s: f32, t: f32) -> Gradients {
        Gradients {
            sdivz: PlaneEq::new(s, 0.0, 0.0),
            tdivz: PlaneEq::new(t, 0.0, 0.0),
            zi: PlaneEq::new(1.0, 0.0, 0.0),
            s_adjust: 0,
            t_adjust: 0,
            s_extent: cache.s_extent(),
            t_extent: cache.t_extent(),
        }
    }

    #[test]
    fn offset_pulls_back_one_texel() {
        assert_eq!(dithered_texel(0, 16384), 0);
        assert_eq!(dithered_texel(0x10000, 0), 0);
        assert_eq!(dithered_texel(0x2_C000, 0x4000), 2);
        assert_eq!(dithered_texel(0x2_C000, 0), 1);
        assert_eq!(dithered_texel((16 << 16) - 1, 49152), 15);
    }

    #[test]
    fn neighbours_alternate_between_kernel_entries() {
        let cache = ramp();
        // s = 2.5, t = 3.5 texels
        let grads = constant(&cache, 2.5, 3.5);
        let spans = SpanChain::from_runs([(0, 0, 6), (0, 1, 6)]);
        let mut fb = vec![0u8; W * 2];
        draw_spans8_dither(&spans, &grads, &cache, &mut fb, W);

        let texel = |x: usize, y: usize| {
            let (ds, dt) = DITHER_KERNEL[x & 1][y & 1];
            let is = dithered_texel(0x2_8000, ds);
            let it = dithered_texel(0x3_8000, dt);
            (it * 16 + is) as u8
        };
        for y in 0..2 {
            for x in 0..6 {
                assert_eq!(fb[y * W + x], texel(x, y), "pixel ({x}, {y})");
            }
        }
        // the kernel really does alternate along the row
        assert_ne!(fb[0], fb[1]);
        assert_eq!(fb[0], fb[2]);
    }

    #[test]
    fn parity_follows_screen_x_not_span_start() {
        let cache = ramp();
        let grads = constant(&cache, 2.5, 3.5);
        let even = SpanChain::from_runs([(4, 0, 3)]);
        let odd = SpanChain::from_runs([(5, 0, 3)]);

        let mut a = vec![0u8; W];
        let mut b = vec![0u8; W];
        draw_spans8_dither(&even, &grads, &cache, &mut a, W);
        draw_spans8_dither(&odd, &grads, &cache, &mut b, W);

        // pixel 5 is shared and must be identical in both runs
        assert_eq!(a[5], b[5]);
        assert_ne!(a[4], a[5]);
    }

    #[test]
    fn stays_inside_block_at_its_far_corner() {
        let cache = ramp();
        let grads = constant(&cache, 100.0, 100.0);
        let spans = SpanChain::from_runs([(0, 0, 20), (1, 1, 19)]);
        let mut fb = vec![0u8; W * 2];
        draw_spans8_dither(&spans, &grads, &cache, &mut fb, W);

        // clamped to the last texel, the offsets land on 14 or 15
        let ext = cache.s_extent();
        for (y, x0, n) in [(0, 0, 20), (1, 1, 19)] {
            for x in x0..x0 + n {
                let (ds, dt) = DITHER_KERNEL[x & 1][y & 1];
                let expected = dithered_texel(ext, dt) * 16 + dithered_texel(ext, ds);
                assert_eq!(fb[y * W + x] as usize, expected, "pixel ({x}, {y})");
                assert!(expected >= 14 * 16 + 14);
            }
        }
    }
}
