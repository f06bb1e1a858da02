use fixed::types::{I32F32, I64F64};

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Q64.64 fixed-point for energy accumulators. Q32.32 tops out near 2.1e9,
/// below what a batched cost can reach.
pub type Fixed128 = I64F64;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Host tick rate.
pub const TICKS_PER_SECOND: Ticks = 20;

/// Convert an f64 to Fixed64. Use only for initialization, never in the tick path.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::saturating_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Energy or fluid quantity as Fixed64, saturating at the type's range.
#[inline]
pub fn fixed_from_u64(v: u64) -> Fixed64 {
    Fixed64::saturating_from_num(v)
}

/// Energy quantity as Fixed128, saturating above `i64::MAX`.
#[inline]
pub fn wide_from_u64(v: u64) -> Fixed128 {
    Fixed128::saturating_from_num(v)
}

/// Whole seconds to ticks.
#[inline]
pub fn seconds_to_ticks(seconds: u32) -> Ticks {
    Ticks::from(seconds) * TICKS_PER_SECOND
}

/// Clamp a probability into `[0, 1]`. Non-finite input maps to zero.
pub fn clamp_chance(value: f64) -> Fixed64 {
    if !value.is_finite() {
        return Fixed64::ZERO;
    }
    f64_to_fixed64(value.clamp(0.0, 1.0))
}
