//! Perspective span filling for an 8-bit software renderer.
//!
//! Polygon setup hands over a [`SpanChain`] and a [`Gradients`] context per
//! visible polygon; the fillers in [`renderer::software`] turn them into
//! palette indices and 16-bit depth.

pub mod config;
pub mod renderer;
pub mod surface;

pub use config::RasterConfig;
pub use renderer::{
    Gradients, PlaneEq, RasterError, Rect, RendererExt, Software, SpanChain, SpanRenderer,
    Subdiv, SurfaceDraw, SurfaceKind,
};
pub use surface::{CacheBlock, TextureError};
