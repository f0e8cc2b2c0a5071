//! Fixed-point primitives shared by both dense strategies.
//!
//! Values are stored as plain integers: `Q7` is an 8-bit fixed-point value,
//! `Q15` a 16-bit one. Packed words hold two `Q15` lanes, low lane first.

pub type Q7 = i8;
pub type Q15 = i16;

/// Rounding offset added before the final right shift: `(1 << s) >> 1`.
#[inline]
pub fn round_offset(out_shift: u16) -> i32 { ((1u32 << out_shift) >> 1) as i32 }

/// Clamp into `[-32768, 32767]`.
#[inline]
pub fn saturate16(v: i32) -> Q15 { v.clamp(i16::MIN as i32, i16::MAX as i32) as Q15 }

/// Bias aligned to the accumulator scale, plus the rounding offset.
#[inline]
pub fn initial_acc(bias: Q7, bias_shift: u16, out_shift: u16) -> i32 {
    ((bias as i32) << bias_shift).wrapping_add(round_offset(out_shift))
}

/// Final rescale of an accumulator to q15.
#[inline]
pub fn requantize(acc: i32, out_shift: u16) -> Q15 { saturate16(acc >> out_shift) }

#[inline]
pub fn pack_q15x2(lo: Q15, hi: Q15) -> u32 { (lo as u16 as u32) | ((hi as u16 as u32) << 16) }

#[inline]
fn lo_lane(x: u32) -> i32 { x as u16 as i16 as i32 }

#[inline]
fn hi_lane(x: u32) -> i32 { (x >> 16) as u16 as i16 as i32 }

/// Two consecutive q15 values starting at `at`, as one packed word.
#[inline]
pub fn read_q15x2(src: &[Q15], at: usize) -> u32 { pack_q15x2(src[at], src[at + 1]) }

/// Four consecutive q7 values starting at `at`, sign-extended into two packed
/// q15 words: `(b0, b1)` and `(b2, b3)`.
#[inline]
pub fn read_and_pad(src: &[Q7], at: usize) -> (u32, u32) {
    let b = &src[at..at + 4];
    (pack_q15x2(b[0] as Q15, b[1] as Q15), pack_q15x2(b[2] as Q15, b[3] as Q15))
}

/// Dual multiply-accumulate: `acc + lo(x)*lo(y) + hi(x)*hi(y)`, wrapping at 32 bits.
#[inline]
pub fn smlad(x: u32, y: u32, acc: i32) -> i32 {
    acc.wrapping_add(lo_lane(x).wrapping_mul(lo_lane(y)))
        .wrapping_add(hi_lane(x).wrapping_mul(hi_lane(y)))
}

/// Single multiply-accumulate, same wrapping semantics as `smlad`.
#[inline]
pub fn mac(v: Q15, w: Q7, acc: i32) -> i32 { acc.wrapping_add((v as i32) * (w as i32)) }
