//! Constant-time string comparison for signatures and secrets.

use subtle::ConstantTimeEq;

/// Compare two optional strings without leaking the matching prefix length.
///
/// Gives the same answer as `a == b`: two `None`s are equal, `None` never
/// equals `Some("")`. Only the length check may return early.
pub fn constant_time_eq(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
        }
        _ => false,
    }
}
