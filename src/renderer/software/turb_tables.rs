//! Cyclic sine tables shared by the turbulent surfaces and the screen warp.
//!
//! Both tables hold one full sine period in `TURB_CYCLE` entries and are
//! read through a rotating phase derived from the frame time.

use once_cell::sync::Lazy;
use std::f64::consts::TAU;

/// Entries per sine period. Power of two, indices are masked.
pub const TURB_CYCLE: usize = 128;
/// Phase advance in table entries per second.
pub const TURB_SPEED: f64 = 20.0;
/// Side of the square tile sampled by turbulent surfaces.
pub const TURB_TEX_SIZE: usize = 64;
/// Texture-space amplitude, 16.16 (8 texels).
pub const TURB_AMP: i32 = 8 * 0x10000;
/// Screen-space amplitude in whole pixels.
pub const TURB_SCREEN_AMP: i32 = 3;

const CYCLE_MASK: usize = TURB_CYCLE - 1;

/// `TURB_AMP + sin * TURB_AMP`, in `[0, 2 * TURB_AMP]`.
pub static SINTABLE: Lazy<[i32; TURB_CYCLE]> = Lazy::new(|| build_table(TURB_AMP));

/// `TURB_SCREEN_AMP + sin * TURB_SCREEN_AMP`, in `[0, 2 * TURB_SCREEN_AMP]`.
pub static INTSINTABLE: Lazy<[i32; TURB_CYCLE]> = Lazy::new(|| build_table(TURB_SCREEN_AMP));

fn build_table(amp: i32) -> [i32; TURB_CYCLE] {
    let amp = amp as f64;
    let mut table = [0i32; TURB_CYCLE];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = (amp + (i as f64 * TAU / TURB_CYCLE as f64).sin() * amp) as i32;
    }
    log::trace!("built turbulence table, amplitude {amp}");
    table
}

/// Table rotation for `time` seconds.
#[inline]
pub fn turb_phase(time: f64) -> usize {
    ((time * TURB_SPEED) as i64 & CYCLE_MASK as i64) as usize
}

/// A sine table viewed through a fixed phase, resolved once per call.
#[derive(Clone, Copy)]
pub struct Turb<'a> {
    table: &'a [i32; TURB_CYCLE],
    phase: usize,
}

impl<'a> Turb<'a> {
    pub fn new(table: &'a [i32; TURB_CYCLE], time: f64) -> Self {
        Self {
            table,
            phase: turb_phase(time),
        }
    }

    /// Texture-space view used by turbulent spans.
    pub fn texture(time: f64) -> Turb<'static> {
        Turb::new(&SINTABLE, time)
    }

    /// Screen-space view used by the warp.
    pub fn screen(time: f64) -> Turb<'static> {
        Turb::new(&INTSINTABLE, time)
    }

    #[inline(always)]
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Entry `i` of the rotated table; `i` wraps modulo the cycle.
    #[inline(always)]
    pub fn at(&self, i: usize) -> i32 {
        self.table[(self.phase + i) & CYCLE_MASK]
    }
}
