//! Plain perspective-textured spans.

use super::{
    gradients::Gradients,
    span_row,
    subspan::{Resume, Subdiv, SubspanWalker},
};
use crate::{renderer::spans::SpanChain, surface::CacheBlock};

/// Texture every span of `spans` into `dst` (row stride `stride`), one
/// perspective division per 8-pixel chunk.
pub fn draw_spans8(
    spans: &SpanChain,
    grads: &Gradients,
    cache: &CacheBlock,
    dst: &mut [u8],
    stride: usize,
) {
    draw_spans(spans, grads, cache, dst, stride, Subdiv::Eight);
}

/// Same as [`draw_spans8`] with 16-pixel chunks.
pub fn draw_spans16(
    spans: &SpanChain,
    grads: &Gradients,
    cache: &CacheBlock,
    dst: &mut [u8],
    stride: usize,
) {
    draw_spans(spans, grads, cache, dst, stride, Subdiv::Sixteen);
}

pub fn draw_spans(
    spans: &SpanChain,
    grads: &Gradients,
    cache: &CacheBlock,
    dst: &mut [u8],
    stride: usize,
    subdiv: Subdiv,
) {
    let pbase = cache.pixels();
    let cachewidth = cache.width();

    for span in spans {
        let row = span_row(dst, stride, span);
        let mut x = 0;

        for chunk in SubspanWalker::new(grads, subdiv, Resume::FarEdge, span) {
            let (mut s, mut t) = (chunk.s, chunk.t);
            for px in &mut row[x..x + chunk.count] {
                *px = pbase[(t >> 16) as usize * cachewidth + (s >> 16) as usize];
                s += chunk.sstep;
                t += chunk.tstep;
            }
            x += chunk.count;
        }
    }
}
