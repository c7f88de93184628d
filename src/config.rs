//! Renderer switches that pick a span filler per surface.

use crate::renderer::software::Subdiv;

/// Knobs consulted by [`Software`](crate::renderer::Software) when it
/// dispatches a surface.
///
/// * `subdiv` – affine chunk width for solid surfaces.
/// * `dither` – use the ordered-dither sampler for solid surfaces (always
///   8-pixel chunks, `subdiv` is ignored).
/// * `warp`   – run the screen warp over the finished frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterConfig {
    pub subdiv: Subdiv,
    pub dither: bool,
    pub warp: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            subdiv: Subdiv::Sixteen,
            dither: false,
            warp: false,
        }
    }
}
