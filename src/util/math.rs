//! Small numeric helpers for sizing and box reduction.

/// Returns `(min, max)` over a fixed list of four values.
pub(crate) fn min_max4(values: [f32; 4]) -> (f32, f32) {
    let [first, rest @ ..] = values;
    rest.iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Rounds `value` up to the next multiple of `step` (`step > 0`).
///
/// Returns `None` if the aligned value does not fit in `u64`.
pub(crate) fn align_up(value: u64, step: u64) -> Option<u64> {
    match value % step {
        0 => Some(value),
        rem => value.checked_add(step - rem),
    }
}

/// Computes `round(numer / denom)` with halves rounding up (`denom > 0`).
pub(crate) fn div_round(numer: u64, denom: u64) -> u64 {
    let (numer, denom) = (u128::from(numer), u128::from(denom));
    // The quotient is at most `numer`, so it always fits back into u64.
    ((numer * 2 + denom) / (denom * 2)) as u64
}
