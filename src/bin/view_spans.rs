//! Span filler demo: a checkered floor slab surrounded by water.
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- --subdiv 8 --dither
//! ```
//!
//! Arrows move and turn. `D` toggles dithering, `G` the underwater warp,
//! `8`/`6` pick the chunk width and `Z` shows the depth buffer.

use clap::{Parser, ValueEnum};
use glam::{Vec2, vec2};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::time::{Duration, Instant};

use spanfill_rs::{
    CacheBlock, Gradients, PlaneEq, RasterConfig, RendererExt, Software, SpanChain, Subdiv,
    SurfaceDraw, SurfaceKind, renderer::software::TURB_TEX_SIZE,
};

/// Side of the floor slab in map units (one texel per unit).
const SLAB: usize = 256;
/// Water texels per map unit.
const WATER_SCALE: f32 = 0.5;
/// Rows this close to the horizon are skipped, `1/z` is too small there.
const HORIZON_GAP: usize = 2;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Chunk {
    #[value(name = "8")]
    Eight,
    #[value(name = "16")]
    Sixteen,
}

impl From<Chunk> for Subdiv {
    fn from(c: Chunk) -> Self {
        match c {
            Chunk::Eight => Subdiv::Eight,
            Chunk::Sixteen => Subdiv::Sixteen,
        }
    }
}

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Affine chunk width for solid surfaces
    #[arg(long, value_enum, default_value = "16")]
    subdiv: Chunk,

    /// Ordered-dither the floor (forces 8-pixel chunks)
    #[arg(long)]
    dither: bool,

    /// Run the underwater screen warp
    #[arg(long)]
    warp: bool,

    /// Spans address pixels with 16-bit coordinates
    #[arg(long, default_value_t = 640, value_parser = clap::value_parser!(u16).range(1..))]
    width: u16,

    #[arg(long, default_value_t = 400, value_parser = clap::value_parser!(u16).range(1..))]
    height: u16,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 90.0)]
    fov: f32,
}

/// Eye hovering `height` units above the ground plane, yaw only.
#[derive(Clone, Copy, Debug)]
struct Eye {
    pos: Vec2,
    height: f32,
    yaw: f32,
}

impl Eye {
    fn forward(&self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        vec2(c, s)
    }

    fn right(&self) -> Vec2 {
        let f = self.forward();
        vec2(f.y, -f.x)
    }
}

/// Screen projection constants.
#[derive(Clone, Copy, Debug)]
struct View {
    width: usize,
    height: usize,
    focal: f32,
    cx: f32,
    cy: f32,
}

impl View {
    fn new(width: usize, height: usize, fov_deg: f32) -> Self {
        let cx = width as f32 * 0.5;
        Self {
            width,
            height,
            focal: cx / (fov_deg.to_radians() * 0.5).tan(),
            cx,
            cy: height as f32 * 0.5,
        }
    }

    /// First screen row below the horizon that is worth drawing.
    fn first_row(&self) -> usize {
        self.cy as usize + HORIZON_GAP
    }
}

/*──────────────────────────── polygon setup ───────────────────────────*/

/// `1/z` of the ground plane: depends on the row only.
fn ground_zi(eye: &Eye, view: &View) -> PlaneEq {
    let k = 1.0 / (eye.height * view.focal);
    PlaneEq::new(-view.cy * k, 0.0, k)
}

/// `coord/z` for one world axis of the ground plane, `scale` texels per
/// unit. With `z = h·f / (v − cy)` the world point under pixel `(u, v)` is
/// `pos + fwd·z + right·(u − cx)·z / f`, which divided by `z` is linear in
/// `u` and `v`.
fn ground_axis(scale: f32, pos: f32, fwd: f32, right: f32, eye: &Eye, view: &View) -> PlaneEq {
    let hf = eye.height * view.focal;
    PlaneEq::new(
        scale * (fwd - right * view.cx / view.focal - pos * view.cy / hf),
        scale * right / view.focal,
        scale * pos / hf,
    )
}

fn ground_gradients(eye: &Eye, view: &View, scale: f32, cache: &CacheBlock) -> Gradients {
    let (f, r) = (eye.forward(), eye.right());
    Gradients {
        sdivz: ground_axis(scale, eye.pos.x, f.x, r.x, eye, view),
        tdivz: ground_axis(scale, eye.pos.y, f.y, r.y, eye, view),
        zi: ground_zi(eye, view),
        s_adjust: 0,
        t_adjust: 0,
        s_extent: cache.s_extent(),
        t_extent: cache.t_extent(),
    }
}

fn water_gradients(eye: &Eye, view: &View, tile: &CacheBlock) -> Gradients {
    // the turbulent filler wraps, so push negative coordinates up by a
    // whole number of tile cycles instead of letting them clamp
    const BIAS: i32 = 1 << 28;
    Gradients {
        s_adjust: BIAS,
        t_adjust: BIAS,
        s_extent: i32::MAX,
        t_extent: i32::MAX,
        ..ground_gradients(eye, view, WATER_SCALE, tile)
    }
}

/// Parameter range along `c + dir·x` that stays inside `[0, size]²`.
fn clip_to_slab(c: Vec2, dir: Vec2, size: f32) -> Option<(f32, f32)> {
    let (mut lo, mut hi) = (f32::NEG_INFINITY, f32::INFINITY);
    for (p, d) in [(c.x, dir.x), (c.y, dir.y)] {
        if d.abs() < 1e-6 {
            if !(0.0..=size).contains(&p) {
                return None;
            }
            continue;
        }
        let (a, b) = (-p / d, (size - p) / d);
        lo = lo.max(a.min(b));
        hi = hi.min(a.max(b));
    }
    (lo < hi).then_some((lo, hi))
}

/// Split every ground row into slab and water spans.
fn build_spans(eye: &Eye, view: &View, slab: &mut SpanChain, water: &mut SpanChain) {
    slab.clear();
    water.clear();

    let (f, r) = (eye.forward(), eye.right());
    for v in view.first_row()..view.height {
        let z = eye.height * view.focal / (v as f32 + 0.5 - view.cy);
        let centre = eye.pos + f * z;

        let (u0, u1) = clip_to_slab(centre, r, SLAB as f32)
            .map(|(lo, hi)| {
                let to_u = |x: f32| (view.cx + x * view.focal / z).ceil();
                let clamp = |u: f32| u.clamp(0.0, view.width as f32) as usize;
                (clamp(to_u(lo)), clamp(to_u(hi)))
            })
            .unwrap_or((view.width, view.width));
        let u1 = u1.max(u0);

        let y = v as u16;
        if u0 > 0 {
            water.push(0, y, u0 as u16);
        }
        if u1 > u0 {
            slab.push(u0 as u16, y, (u1 - u0) as u16);
        }
        if u1 < view.width {
            water.push(u1 as u16, y, (view.width - u1) as u16);
        }
    }
}

/*────────────────────────────── textures ──────────────────────────────*/

fn water_tile() -> anyhow::Result<CacheBlock> {
    let n = TURB_TEX_SIZE;
    let pixels = (0..n * n)
        .map(|i| {
            let (x, y) = (i % n, i / n);
            128 + 32 + ((x ^ y) & 63) as u8
        })
        .collect();
    Ok(CacheBlock::new("WATER1", n, n, pixels)?)
}

/// 0..128 grey ramp, 128..256 blue-green ramp.
fn palette() -> [u32; 256] {
    std::array::from_fn(|i| {
        let (r, g, b) = if i < 128 {
            let g = (i * 2) as u32;
            (g, g, g)
        } else {
            let j = (i - 128) as u32;
            (j / 3, j + 32, (j * 3 / 2 + 64).min(255))
        };
        (r << 16) | (g << 8) | b
    })
}

fn depth_grey(z: u16) -> u32 {
    let g = (z as u32 * 4).min(255);
    (g << 16) | (g << 8) | g
}

/*──────────────────────────────── main ────────────────────────────────*/

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let view = View::new(opts.width.into(), opts.height.into(), opts.fov);
    let mut config = RasterConfig {
        subdiv: opts.subdiv.into(),
        dither: opts.dither,
        warp: opts.warp,
    };
    log::info!("{}x{} view, {config:?}", view.width, view.height);

    let floor = CacheBlock::checker("FLOOR4_8", SLAB, SLAB, 32, 100, 40)?;
    let tile = water_tile()?;
    let pal = palette();

    let mut eye = Eye {
        pos: vec2(SLAB as f32 * 0.5, -160.0),
        height: 41.0,
        yaw: std::f32::consts::FRAC_PI_2,
    };
    let mut show_depth = false;

    let mut renderer = Software::new(config);
    let (mut slab_spans, mut water_spans) = (SpanChain::new(), SpanChain::new());
    let mut rgb: Vec<u32> = Vec::with_capacity(view.width * view.height);

    let mut win = Window::new(
        "Span filler",
        view.width,
        view.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(35);

    let start = Instant::now();
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* input ---------------------------------------------------------- */
        if win.is_key_down(Key::Up) {
            let f = eye.forward();
            eye.pos += f * 4.0;
        }
        if win.is_key_down(Key::Down) {
            let f = eye.forward();
            eye.pos -= f * 4.0;
        }
        if win.is_key_down(Key::Left) {
            eye.yaw += 0.04;
        }
        if win.is_key_down(Key::Right) {
            eye.yaw -= 0.04;
        }
        if win.is_key_pressed(Key::D, KeyRepeat::No) {
            config.dither = !config.dither;
        }
        if win.is_key_pressed(Key::G, KeyRepeat::No) {
            config.warp = !config.warp;
        }
        if win.is_key_pressed(Key::Key8, KeyRepeat::No) {
            config.subdiv = Subdiv::Eight;
        }
        if win.is_key_pressed(Key::Key6, KeyRepeat::No) {
            config.subdiv = Subdiv::Sixteen;
        }
        if win.is_key_pressed(Key::Z, KeyRepeat::No) {
            show_depth = !show_depth;
        }
        if renderer.config != config {
            log::info!("switches now {config:?}");
            renderer.config = config;
        }

        /* polygon setup -------------------------------------------------- */
        build_spans(&eye, &view, &mut slab_spans, &mut water_spans);
        let floor_grads = ground_gradients(&eye, &view, 1.0, &floor);
        let water_grads = water_gradients(&eye, &view, &tile);

        let surfaces = [
            SurfaceDraw {
                kind: SurfaceKind::Solid,
                spans: &slab_spans,
                gradients: &floor_grads,
                cache: &floor,
            },
            SurfaceDraw {
                kind: SurfaceKind::Turbulent,
                spans: &water_spans,
                gradients: &water_grads,
                cache: &tile,
            },
        ];

        /* draw ----------------------------------------------------------- */
        let time = start.elapsed().as_secs_f64();
        renderer.draw_frame(view.width, view.height, time, &surfaces, |fb, _, _| {
            rgb.clear();
            rgb.extend(fb.iter().map(|&p| pal[p as usize]));
        })?;
        if show_depth {
            rgb.clear();
            rgb.extend(renderer.zbuffer().iter().map(|&z| depth_grey(z)));
        }

        acc_time += t0.elapsed();
        acc_frames += 1;
        win.update_with_buffer(&rgb, view.width, view.height)?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            log::info!("avg frame: {avg_ms:.2} ms ({:.1} FPS)", 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
