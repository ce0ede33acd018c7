use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits. Every cargo
/// amount, weight and rate in the engine is stored in this type.
pub type Fixed64 = I32F32;

/// Number of Cargo Units a commodity's `conversion` figure is expressed
/// against.
pub const CARGO_UNIT_SCALE: i32 = 512;

/// Convert an f64 to Fixed64. Use only for initialization, never in the
/// production path.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Saturating product, used where a misconfigured catalog could otherwise
/// overflow a production figure.
#[inline]
pub fn saturating_mul_64(a: Fixed64, b: Fixed64) -> Fixed64 {
    a.saturating_mul(b)
}
