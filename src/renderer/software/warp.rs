//! Full-screen underwater warp.
//!
//! Resamples the finished view through the screen-space sine table. The
//! sampling window is `2 * TURB_SCREEN_AMP` pixels larger than the
//! destination and squeezed back onto the source, so the largest table
//! offset still lands inside the rendered image.

use super::turb_tables::{TURB_SCREEN_AMP, Turb};
use crate::renderer::{RasterError, Rect};

/// Per-frame lookup tables: source row offsets and source columns.
struct WarpTables {
    rows: Vec<usize>,
    cols: Vec<usize>,
}

fn reserve(what: &'static str, len: usize) -> Result<Vec<usize>, RasterError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|source| RasterError::ScratchAlloc { what, len, source })?;
    Ok(v)
}

/// Map `0..dst + 2 * AMP` onto `0..src`, compressed so the top entry
/// stays below `src`.
fn squeeze(dst: usize, src: usize, i: usize) -> usize {
    let margin = (TURB_SCREEN_AMP * 2) as f32;
    let ratio = src as f32 / dst as f32;
    let mapped = (i as f32 * ratio * dst as f32 / (dst as f32 + margin)) as usize;
    mapped.min(src - 1)
}

impl WarpTables {
    fn build(src_stride: usize, src: Rect, dst: Rect) -> Result<Self, RasterError> {
        let margin = TURB_SCREEN_AMP as usize * 2;

        let n_rows = dst.height + margin;
        let mut rows = reserve("row offsets", n_rows)?;
        rows.extend((0..n_rows).map(|v| {
            src.y * src_stride + src_stride * squeeze(dst.height, src.height, v)
        }));

        let n_cols = dst.width + margin;
        let mut cols = reserve("columns", n_cols)?;
        cols.extend((0..n_cols).map(|u| src.x + squeeze(dst.width, src.width, u)));

        Ok(Self { rows, cols })
    }
}

fn check_rect(which: &'static str, rect: Rect, stride: usize, len: usize) -> Result<(), RasterError> {
    let fits = rect.x + rect.width <= stride
        && (rect.y + rect.height).saturating_sub(1) * stride + rect.x + rect.width <= len;
    if fits {
        Ok(())
    } else {
        Err(RasterError::RectOutOfBounds {
            which,
            rect,
            stride,
            len,
        })
    }
}

/// Warp `src_rect` of `src` into `dst_rect` of `dst`, using the sine phase
/// at `time` seconds. The rects may differ in size.
pub fn warp_screen(
    src: &[u8],
    src_stride: usize,
    src_rect: Rect,
    dst: &mut [u8],
    dst_stride: usize,
    dst_rect: Rect,
    time: f64,
) -> Result<(), RasterError> {
    if dst_rect.is_empty() {
        return Ok(());
    }
    if src_rect.is_empty() {
        return Err(RasterError::RectOutOfBounds {
            which: "source",
            rect: src_rect,
            stride: src_stride,
            len: src.len(),
        });
    }
    check_rect("source", src_rect, src_stride, src.len())?;
    check_rect("destination", dst_rect, dst_stride, dst.len())?;

    let tables = WarpTables::build(src_stride, src_rect, dst_rect)?;
    let turb = Turb::screen(time);
    log::trace!(
        "warp {}x{} -> {}x{}, phase {}",
        src_rect.width,
        src_rect.height,
        dst_rect.width,
        dst_rect.height,
        turb.phase()
    );

    for v in 0..dst_rect.height {
        let start = (dst_rect.y + v) * dst_stride + dst_rect.x;
        let dest = &mut dst[start..start + dst_rect.width];
        let row = &tables.rows[v..];
        let col = &tables.cols[turb.at(v) as usize..];

        for (u, px) in dest.iter_mut().enumerate() {
            *px = src[row[turb.at(u) as usize] + col[u]];
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTSIDE: u8 = 0xFF;

    /// `stride × rows` buffer with a gradient inside `rect`, `OUTSIDE`
    /// everywhere else.
    fn view(stride: usize, rows: usize, rect: Rect) -> Vec<u8> {
        let mut buf = vec![OUTSIDE; stride * rows];
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                buf[y * stride + x] = ((x * 3 + y * 5) % 250) as u8;
            }
        }
        buf
    }

    fn rect(x: usize, y: usize, width: usize, height: usize) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn tables_stay_inside_source() {
        for (src, dst) in [
            (rect(3, 2, 64, 40), rect(0, 0, 64, 40)),
            (rect(0, 0, 128, 80), rect(0, 0, 64, 40)),
            (rect(0, 0, 32, 20), rect(0, 0, 64, 40)),
        ] {
            let t = WarpTables::build(200, src, dst).unwrap();
            assert_eq!(t.rows.len(), dst.height + 6);
            assert_eq!(t.cols.len(), dst.width + 6);
            assert_eq!(t.cols[0], src.x);
            assert_eq!(t.rows[0], src.y * 200);
            assert!(t.cols.windows(2).all(|w| w[0] <= w[1]));
            assert!(*t.cols.last().unwrap() < src.x + src.width);
            assert!(*t.rows.last().unwrap() < (src.y + src.height) * 200);
        }
    }

    #[test]
    fn same_size_warp_samples_only_rendered_pixels() {
        let src_rect = rect(4, 3, 60, 45);
        let src = view(80, 50, src_rect);
        let dst_rect = rect(2, 1, 60, 45);
        let mut dst = vec![0u8; 80 * 50];

        warp_screen(&src, 80, src_rect, &mut dst, 80, dst_rect, 1.3).unwrap();

        for y in 0..50 {
            for x in 0..80 {
                let inside = (2..62).contains(&x) && (1..46).contains(&y);
                let px = dst[y * 80 + x];
                if inside {
                    assert_ne!(px, OUTSIDE, "({x}, {y}) sampled outside the view");
                } else {
                    assert_eq!(px, 0, "({x}, {y}) written outside the rect");
                }
            }
        }
    }

    #[test]
    fn scaled_warp_stays_in_bounds() {
        let small = rect(0, 0, 40, 30);
        let large = rect(0, 0, 97, 61);

        let src = view(100, 64, small);
        let mut dst = vec![0u8; 100 * 64];
        warp_screen(&src, 100, small, &mut dst, 100, large, 0.2).unwrap();
        assert!(dst[..61 * 100].chunks(100).all(|r| !r[..97].contains(&OUTSIDE)));

        let src = view(100, 64, large);
        let mut dst = vec![0u8; 100 * 64];
        warp_screen(&src, 100, large, &mut dst, 100, small, 0.2).unwrap();
        assert!(dst[..30 * 100].chunks(100).all(|r| !r[..40].contains(&OUTSIDE)));
    }

    #[test]
    fn output_depends_only_on_phase() {
        let r = rect(0, 0, 48, 32);
        let src = view(48, 32, r);
        let run = |time: f64| {
            let mut dst = vec![0u8; 48 * 32];
            warp_screen(&src, 48, r, &mut dst, 48, r, time).unwrap();
            dst
        };
        assert_eq!(run(0.51), run(0.51));
        assert_eq!(run(0.51), run(0.51 + 6.4));
        assert_ne!(run(0.51), run(1.51));
    }

    #[test]
    fn rejects_rects_outside_buffers() {
        let src = vec![0u8; 10 * 10];
        let mut dst = vec![0u8; 10 * 10];

        let err = warp_screen(&src, 10, rect(5, 0, 6, 4), &mut dst, 10, rect(0, 0, 4, 4), 0.0)
            .unwrap_err();
        assert!(matches!(err, RasterError::RectOutOfBounds { which: "source", .. }));

        let err = warp_screen(&src, 10, rect(0, 0, 4, 4), &mut dst, 10, rect(0, 8, 4, 4), 0.0)
            .unwrap_err();
        assert!(matches!(err, RasterError::RectOutOfBounds { which: "destination", .. }));

        let err = warp_screen(&src, 10, rect(0, 0, 0, 4), &mut dst, 10, rect(0, 0, 4, 4), 0.0)
            .unwrap_err();
        assert!(matches!(err, RasterError::RectOutOfBounds { which: "source", .. }));

        // nothing to draw is not an error
        warp_screen(&src, 10, rect(0, 0, 0, 0), &mut dst, 10, rect(0, 0, 0, 3), 0.0).unwrap();
    }
}
