//! Depth spans.
//!
//! `1/z` is already linear in screen space, so no per-chunk division is
//! needed: the value is converted to 1.31 fixed point once per span and
//! stepped. The top 16 bits of each step land in the depth buffer.

use super::{gradients::PlaneEq, span_row};
use crate::renderer::spans::SpanChain;

/// `1/z` → 1.31 fixed point.
const ZI_SCALE: f64 = 0x8000 as f64 * 0x10000 as f64;

/// How one depth span splits into single and paired stores.
///
/// Pairs start on even buffer indices so each can go out as one packed
/// 32-bit value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZSpanLayout {
    pub lead: usize,
    pub pairs: usize,
    pub tail: usize,
}

impl ZSpanLayout {
    /// Layout for `count` samples starting at buffer index `offset`.
    pub fn new(offset: usize, count: usize) -> Self {
        let lead = (offset & 1).min(count);
        let rest = count - lead;
        Self {
            lead,
            pairs: rest >> 1,
            tail: rest & 1,
        }
    }

    pub fn samples(&self) -> usize {
        self.lead + 2 * self.pairs + self.tail
    }
}

/// Depth sample for a 1.31 `izi`.
#[inline(always)]
fn sample(izi: i32) -> u16 {
    (izi >> 16) as u16
}

/// Write `(1/z) * 0x8000` for every pixel of `spans` into `zbuf` (row
/// stride `stride`).
pub fn draw_z_spans(spans: &SpanChain, zi: &PlaneEq, zbuf: &mut [u16], stride: usize) {
    // float-to-int casts saturate where the C-era code relied on FP
    // exceptions being masked
    let izistep = (zi.step_u * 0x8000 as f32 * 0x10000 as f32) as i32;

    for span in spans {
        let offset = span.y as usize * stride + span.x_start as usize;
        let dest = span_row(zbuf, stride, span);
        let layout = ZSpanLayout::new(offset, span.count as usize);

        let zi0 = zi.at(span.x_start as f32, span.y as f32) as f64;
        let mut izi = (zi0 * ZI_SCALE) as i32;

        let (lead, dest) = dest.split_at_mut(layout.lead);
        if let Some(first) = lead.first_mut() {
            *first = sample(izi);
            izi = izi.wrapping_add(izistep);
        }

        let (paired, rest) = dest.split_at_mut(layout.pairs * 2);
        for pair in paired.chunks_exact_mut(2) {
            let mut packed = (izi as u32) >> 16;
            izi = izi.wrapping_add(izistep);
            packed |= (izi as u32) & 0xFFFF_0000;
            izi = izi.wrapping_add(izistep);

            pair[0] = packed as u16;
            pair[1] = (packed >> 16) as u16;
        }

        if layout.tail == 1 {
            rest[0] = sample(izi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 40;
    const UNTOUCHED: u16 = 0xABCD;

    /// The i-th depth sample of a span, stepped one pixel at a time.
    fn linear(zi: &PlaneEq, x: u16, y: u16, i: usize) -> u16 {
        let izistep = (zi.step_u * 0x8000 as f32 * 0x10000 as f32) as i32;
        let izi0 = (zi.at(x as f32, y as f32) as f64 * ZI_SCALE) as i32;
        sample(izi0.wrapping_add(izistep.wrapping_mul(i as i32)))
    }

    #[test]
    fn layout_splits_odd_span_into_pairs_and_tail() {
        for k in 0..6 {
            let l = ZSpanLayout::new(0, 2 * k + 1);
            assert_eq!(l, ZSpanLayout { lead: 0, pairs: k, tail: 1 });
            assert_eq!(l.samples(), 2 * k + 1);
        }
    }

    #[test]
    fn layout_peels_unaligned_first_sample() {
        assert_eq!(ZSpanLayout::new(3, 6), ZSpanLayout { lead: 1, pairs: 2, tail: 1 });
        assert_eq!(ZSpanLayout::new(3, 5), ZSpanLayout { lead: 1, pairs: 2, tail: 0 });
        assert_eq!(ZSpanLayout::new(3, 1), ZSpanLayout { lead: 1, pairs: 0, tail: 0 });
        assert_eq!(ZSpanLayout::new(3, 0), ZSpanLayout { lead: 0, pairs: 0, tail: 0 });
        assert_eq!(ZSpanLayout::new(4, 0).samples(), 0);
    }

    #[test]
    fn depth_is_linear_across_every_layout() {
        let zi = PlaneEq::new(0.125, 0.001, 0.0005);
        let spans = SpanChain::from_runs([(0, 0, 9), (3, 1, 10), (1, 2, 1), (2, 3, 0), (5, 4, 30)]);
        let mut zbuf = vec![UNTOUCHED; W * 5];
        draw_z_spans(&spans, &zi, &mut zbuf, W);

        for span in &spans {
            let row = span.y as usize * W;
            for i in 0..span.count as usize {
                let got = zbuf[row + span.x_start as usize + i];
                assert_eq!(got, linear(&zi, span.x_start, span.y, i), "span {span:?} px {i}");
            }
            // neighbours untouched
            if span.x_start > 0 {
                assert_eq!(zbuf[row + span.x_start as usize - 1], UNTOUCHED);
            }
            let end = span.x_start as usize + span.count as usize;
            if end < W {
                assert_eq!(zbuf[row + end], UNTOUCHED);
            }
        }
    }

    #[test]
    fn constant_depth_fills_flat() {
        // 1/z = 0.5 → 0.5 * 0x8000 = 0x4000
        let zi = PlaneEq::new(0.5, 0.0, 0.0);
        let spans = SpanChain::from_runs([(1, 0, 7)]);
        let mut zbuf = vec![UNTOUCHED; W];
        draw_z_spans(&spans, &zi, &mut zbuf, W);

        assert_eq!(zbuf[0], UNTOUCHED);
        assert!(zbuf[1..8].iter().all(|&z| z == 0x4000));
        assert_eq!(zbuf[8], UNTOUCHED);
    }

    #[test]
    fn nearer_pixels_get_larger_depth() {
        let zi = PlaneEq::new(0.01, 0.002, 0.0);
        let spans = SpanChain::from_runs([(0, 0, 32)]);
        let mut zbuf = vec![0u16; W];
        draw_z_spans(&spans, &zi, &mut zbuf, W);
        assert!(zbuf[..32].windows(2).all(|w| w[0] <= w[1]));
        assert!(zbuf[31] > zbuf[0]);
    }
}
