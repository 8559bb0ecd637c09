//! Noisy-OR conviction combination

use crate::signal::clamp_conviction;
use rust_decimal::Decimal;

/// Combine independent convictions as `1 - Π(1 - p_i)`.
///
/// The result is the probability that at least one input is a true positive:
/// it never decreases when a signal is added, and a single conviction comes
/// back unchanged. Inputs are clamped into [0, 1] first.
pub fn combine_convictions<I>(convictions: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    let prob_none = convictions
        .into_iter()
        .map(clamp_conviction)
        .fold(Decimal::ONE, |acc, p| acc * (Decimal::ONE - p));
    Decimal::ONE - prob_none
}
