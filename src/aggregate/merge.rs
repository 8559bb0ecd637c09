//! Content merge for a group of signals sharing symbol and direction

use super::combine_convictions;
use crate::signal::{Direction, Metadata, Signal};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

/// Fixed visiting order for group members, independent of batch order.
///
/// Total over signal content: members that compare equal are identical.
fn visiting_order(a: &Signal, b: &Signal) -> Ordering {
    a.category
        .cmp(&b.category)
        .then(a.timestamp.cmp(&b.timestamp))
        .then(a.conviction.cmp(&b.conviction))
        .then_with(|| a.reasons.cmp(&b.reasons))
        .then(a.price.cmp(&b.price))
        .then_with(|| metadata_order(&a.metadata, &b.metadata))
}

fn metadata_order(a: &Metadata, b: &Metadata) -> Ordering {
    let canonical = |m: &Metadata| {
        m.iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect::<Vec<_>>()
    };
    canonical(a).cmp(&canonical(b))
}

/// Concatenate reasons, keeping only the first occurrence of each
pub fn merge_reasons<'a, I>(reasons: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for reason in reasons {
        if seen.insert(reason) {
            merged.push(reason.to_string());
        }
    }
    merged
}

/// Merge metadata as `category.key -> value`.
///
/// Two detectors reporting the same field name keep separate entries. When
/// one category appears twice, the first member visited keeps the key, the
/// same member that wins a price tie.
pub fn namespace_metadata(members: &[Signal]) -> Metadata {
    let mut merged = Metadata::new();
    for signal in members {
        for (key, value) in &signal.metadata {
            merged
                .entry(format!("{}.{}", signal.category, key))
                .or_insert_with(|| value.clone());
        }
    }
    merged
}

/// Sorted, deduplicated categories joined with `+`
pub fn category_label(members: &[Signal]) -> String {
    members
        .iter()
        .map(|s| s.category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join("+")
}

/// Price from the most recently observed member that has one.
///
/// Equal timestamps go to the member visited first.
pub fn select_price(members: &[Signal]) -> Option<Decimal> {
    members
        .iter()
        .filter(|s| s.price.is_some())
        .fold(None::<&Signal>, |best, s| match best {
            Some(b) if b.timestamp >= s.timestamp => Some(b),
            _ => Some(s),
        })
        .and_then(|s| s.price)
}

/// Collapse one (symbol, direction) group into a single signal.
///
/// Returns `None` for an empty group.
pub fn merge_group(symbol: &str, direction: Direction, mut members: Vec<Signal>) -> Option<Signal> {
    members.sort_by(visiting_order);

    let timestamp = members.iter().map(|s| s.timestamp).max()?;
    let conviction = combine_convictions(members.iter().map(|s| s.conviction));
    let reasons = merge_reasons(
        members
            .iter()
            .flat_map(|s| s.reasons.iter().map(String::as_str)),
    );

    Some(Signal {
        category: category_label(&members),
        symbol: symbol.to_string(),
        direction,
        conviction,
        reasons,
        metadata: namespace_metadata(&members),
        price: select_price(&members),
        timestamp,
    })
}
