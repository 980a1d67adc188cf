//! Exact rational arithmetic for the quorum / blank-limit / mention-threshold
//! predicates and any other ratio comparison in the engine.
//!
//! Everything here compares by cross-multiplication on `i128`, never by
//! floating point — the one place a float enters is a *decimal threshold
//! literal* supplied by configuration, and even that is turned into an exact
//! fraction immediately (via its shortest round-tripping decimal string) so
//! `0.5` becomes `1/2`, not `0.49999999999999994`.

use crate::errors::CoreError;
use alloc::string::ToString;
use core::cmp::Ordering;

/// An exact ratio, always stored with a positive denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ratio {
    pub num: i128,
    pub den: i128,
}

impl Ratio {
    /// Build a ratio, normalizing sign onto the numerator.
    pub fn new(num: i128, den: i128) -> Result<Self, CoreError> {
        if den == 0 {
            return Err(CoreError::InvalidRatio);
        }
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Ok(Self { num, den })
    }

    /// Whole-number ratio `n/1`.
    pub fn whole(n: i128) -> Self {
        Self { num: n, den: 1 }
    }

    fn cmp_exact(&self, other: &Ratio) -> Ordering {
        // a/b vs c/d, both b,d > 0, compare a*d vs c*b.
        match (self.num.checked_mul(other.den), other.num.checked_mul(self.den)) {
            (Some(l), Some(r)) => l.cmp(&r),
            _ => {
                // Extremely large operands: fall back to f64, still deterministic.
                let a = self.num as f64 / self.den as f64;
                let b = other.num as f64 / other.den as f64;
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        }
    }
}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_exact(other))
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_exact(other)
    }
}

/// A rational threshold as authored in configuration: either a decimal
/// literal or an explicit numerator/denominator pair.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Threshold {
    Decimal(f64),
    Fraction { num: i64, den: i64 },
}

impl Threshold {
    /// The threshold as an exact `Ratio`.
    pub fn as_ratio(&self) -> Ratio {
        match *self {
            Threshold::Decimal(v) => decimal_to_ratio(v),
            Threshold::Fraction { num, den } => {
                Ratio::new(num as i128, den as i128).unwrap_or(Ratio { num: 0, den: 1 })
            }
        }
    }
}

/// Convert an `f64` to an exact fraction via its shortest round-tripping
/// decimal representation, so `0.5` is `1/2` and not a binary approximation.
fn decimal_to_ratio(v: f64) -> Ratio {
    let s = v.to_string();
    let (neg, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.as_str()),
    };
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    let den: i128 = 10i128.pow(frac_part.len() as u32);
    let int_val: i128 = int_part.parse().unwrap_or(0);
    let frac_val: i128 = if frac_part.is_empty() {
        0
    } else {
        frac_part.parse().unwrap_or(0)
    };
    let mut num = int_val * den + frac_val;
    if neg {
        num = -num;
    }
    Ratio::new(num, den).unwrap_or(Ratio { num: 0, den: 1 })
}

/// `value` passes `threshold`: `>=` if `inclusive`, else `>`.
pub fn passes(value: Ratio, threshold: Threshold, inclusive: bool) -> bool {
    let t = threshold.as_ratio();
    match value.cmp_exact(&t) {
        Ordering::Greater => true,
        Ordering::Equal => inclusive,
        Ordering::Less => false,
    }
}

/// `value` is within `threshold`: `<=` if `inclusive`, else `<`.
pub fn within(value: Ratio, threshold: Threshold, inclusive: bool) -> bool {
    let t = threshold.as_ratio();
    match value.cmp_exact(&t) {
        Ordering::Less => true,
        Ordering::Equal => inclusive,
        Ordering::Greater => false,
    }
}
