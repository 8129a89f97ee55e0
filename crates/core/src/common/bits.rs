//! Bit-width helpers shared by the geometry and sanity stages.

/// Number of address bits needed to select one of `count` items.
///
/// Rounds up, so a non-power-of-two count reserves the next power of two.
/// Counts of zero, one, or less take no bits.
#[inline]
pub fn ceil_log2(count: i64) -> u32 {
    if count <= 1 {
        0
    } else {
        u64::BITS - (count as u64 - 1).leading_zeros()
    }
}

/// `2^bits` as a wide integer, saturating at `u128::MAX` for absurd widths.
#[inline]
pub fn pow2(bits: u32) -> u128 {
    1u128.checked_shl(bits).unwrap_or(u128::MAX)
}

/// Division that yields zero instead of panicking on a zero divisor.
#[inline]
pub fn div_or_zero(numerator: i64, denominator: i64) -> i64 {
    numerator.checked_div(denominator).unwrap_or(0)
}
