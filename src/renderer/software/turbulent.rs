//! Turbulent (water / lava / slime) spans.
//!
//! Same 16-pixel affine walk as solid spans, but every texture coordinate
//! is pushed around by the rotated sine table before sampling a square
//! `TURB_TEX_SIZE` tile that repeats in both directions.

use super::{
    gradients::Gradients,
    span_row,
    subspan::{Resume, Subdiv, SubspanWalker},
    turb_tables::{TURB_CYCLE, TURB_TEX_SIZE, Turb},
};
use crate::{renderer::spans::SpanChain, surface::CacheBlock};

const CYCLE_MASK: i32 = TURB_CYCLE as i32 - 1;
const TEX_MASK: i32 = TURB_TEX_SIZE as i32 - 1;
/// Keeps 16.16 coordinates inside one table cycle.
const CYCLE_WRAP: i32 = ((TURB_CYCLE as i32) << 16) - 1;

/// Fill `spans` from the `TURB_TEX_SIZE`² tile in `cache`, distorted by the
/// turbulence phase at `time` seconds.
pub fn draw_turbulent_spans(
    spans: &SpanChain,
    grads: &Gradients,
    cache: &CacheBlock,
    dst: &mut [u8],
    stride: usize,
    time: f64,
) {
    debug_assert!(
        cache.width() == TURB_TEX_SIZE && cache.height() >= TURB_TEX_SIZE,
        "turbulent surfaces sample a {TURB_TEX_SIZE}x{TURB_TEX_SIZE} tile, got {}x{}",
        cache.width(),
        cache.height()
    );

    // one phase for the whole call
    let turb = Turb::texture(time);
    let pbase = cache.pixels();

    for span in spans {
        let row = span_row(dst, stride, span);
        let mut x = 0;

        for chunk in SubspanWalker::new(grads, Subdiv::Sixteen, Resume::FarEdge, span) {
            // the unwrapped values already seeded the next chunk's step
            let mut s = chunk.s & CYCLE_WRAP;
            let mut t = chunk.t & CYCLE_WRAP;

            for px in &mut row[x..x + chunk.count] {
                let sturb = s.wrapping_add(turb.at(((t >> 16) & CYCLE_MASK) as usize));
                let sturb = (sturb >> 16) & TEX_MASK;
                let tturb = t.wrapping_add(turb.at(((s >> 16) & CYCLE_MASK) as usize));
                let tturb = (tturb >> 16) & TEX_MASK;

                *px = pbase[tturb as usize * TURB_TEX_SIZE + sturb as usize];

                s = s.wrapping_add(chunk.sstep);
                t = t.wrapping_add(chunk.tstep);
            }
            x += chunk.count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::software::{gradients::PlaneEq, turb_tables::TURB_SPEED};

    const W: usize = 48;
    const H: usize = 4;

    fn tile() -> CacheBlock {
        let pixels = (0..TURB_TEX_SIZE * TURB_TEX_SIZE)
            .map(|i| (i * 7 % 251) as u8)
            .collect();
        CacheBlock::new("WATER", TURB_TEX_SIZE, TURB_TEX_SIZE, pixels).unwrap()
    }

    fn water() -> Gradients {
        Gradients {
            sdivz: PlaneEq::new(3.0, 0.75, 0.0),
            tdivz: PlaneEq::new(5.0, 0.0, 1.0),
            zi: PlaneEq::new(1.0, 0.0, 0.0),
            s_adjust: 0,
            t_adjust: 0,
            s_extent: i32::MAX,
            t_extent: i32::MAX,
        }
    }

    /// Straight per-pixel evaluation of the distortion for an affine plane.
    fn reference(x: usize, y: usize, time: f64) -> u8 {
        let s = ((3.0 + 0.75 * x as f32) * 65536.0) as i32 & CYCLE_WRAP;
        let t = ((5.0 + y as f32) * 65536.0) as i32 & CYCLE_WRAP;
        let turb = Turb::texture(time);
        let sturb = ((s + turb.at(((t >> 16) & CYCLE_MASK) as usize)) >> 16) & TEX_MASK;
        let tturb = ((t + turb.at(((s >> 16) & CYCLE_MASK) as usize)) >> 16) & TEX_MASK;
        tile()[tturb as usize * TURB_TEX_SIZE + sturb as usize]
    }

    #[test]
    fn matches_per_pixel_distortion() {
        let spans = SpanChain::from_runs((0..H as u16).map(|y| (0, y, 16)));
        let mut fb = vec![0u8; W * H];
        draw_turbulent_spans(&spans, &water(), &tile(), &mut fb, W, 0.37);

        for y in 0..H {
            for x in 0..16 {
                assert_eq!(fb[y * W + x], reference(x, y, 0.37), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn animates_with_time_and_repeats_each_cycle() {
        let spans = SpanChain::from_runs([(0, 0, 40), (2, 1, 33)]);
        let render = |time: f64| {
            let mut fb = vec![0u8; W * H];
            draw_turbulent_spans(&spans, &water(), &tile(), &mut fb, W, time);
            fb
        };

        let period = TURB_CYCLE as f64 / TURB_SPEED;
        assert_eq!(render(0.01), render(0.01));
        assert_eq!(render(0.01), render(0.01 + period));
        assert_ne!(render(0.01), render(0.41));
    }

    #[test]
    fn coordinates_wrap_into_the_tile() {
        // far outside the tile in both directions of the cycle
        let grads = Gradients {
            sdivz: PlaneEq::new(4000.0, 3.0, 0.0),
            tdivz: PlaneEq::new(9000.0, 0.0, 0.0),
            ..water()
        };
        let spans = SpanChain::from_runs([(0, 0, W as u16)]);
        let mut fb = vec![0u8; W];
        let tile = tile();
        draw_turbulent_spans(&spans, &grads, &tile, &mut fb, W, 2.0);
        assert!(fb.iter().all(|p| tile.pixels().contains(p)));
    }
}
