//! Weighted random selection used for shop stocking, mutation rolls and drops.
//!
//! Chances are relative weights: they do not need to sum to 1. Negative and
//! non-finite chances count as zero. When every chance is zero nothing is
//! selected and callers must treat that as "no drop this time".

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A value paired with its relative chance of being picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weighted<T> {
    pub value: T,
    pub chance: f64,
}

impl<T> Weighted<T> {
    pub fn new(value: T, chance: f64) -> Self {
        Self { value, chance }
    }
}

fn effective_chance(chance: f64) -> f64 {
    if chance.is_finite() && chance > 0.0 {
        chance
    } else {
        0.0
    }
}

fn total_chance<T>(items: &[Weighted<T>]) -> f64 {
    items.iter().map(|w| effective_chance(w.chance)).sum()
}

/// Pick one value with probability proportional to its chance, using the thread RNG.
pub fn pick_random_with_prob<T: Clone>(items: &[Weighted<T>]) -> Option<T> {
    let mut rng = rand::thread_rng();
    pick_random_with_prob_using(items, &mut rng)
}

/// Same as [`pick_random_with_prob`] with a caller-supplied RNG (seeded in tests).
///
/// Builds a normalized cumulative table, draws once in `[0, 1)` and
/// binary-searches for the first cumulative value strictly above the draw.
pub fn pick_random_with_prob_using<T: Clone, R: Rng + ?Sized>(
    items: &[Weighted<T>],
    rng: &mut R,
) -> Option<T> {
    let total = total_chance(items);
    if total <= 0.0 {
        return None;
    }

    let mut running = 0.0;
    let cumulative: Vec<f64> = items
        .iter()
        .map(|w| {
            running += effective_chance(w.chance) / total;
            running
        })
        .collect();

    let draw: f64 = rng.gen();
    let idx = cumulative.partition_point(|&c| c <= draw);
    if let Some(item) = items.get(idx) {
        return Some(item.value.clone());
    }
    // Rounding can leave the last cumulative entry a hair below 1.0.
    items
        .iter()
        .rev()
        .find(|w| effective_chance(w.chance) > 0.0)
        .map(|w| w.value.clone())
}

/// Normalized chances sorted descending, without drawing. Empty when nothing can be picked.
pub fn random_with_prob<T: Clone>(items: &[Weighted<T>]) -> Vec<Weighted<T>> {
    let total = total_chance(items);
    if total <= 0.0 {
        return Vec::new();
    }
    let mut normalized: Vec<Weighted<T>> = items
        .iter()
        .map(|w| Weighted::new(w.value.clone(), effective_chance(w.chance) / total))
        .collect();
    normalized.sort_by(|a, b| b.chance.total_cmp(&a.chance));
    normalized
}

/// Single yes/no roll; `probability` is clamped to `[0, 1]`.
pub fn roll_chance<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
    if !probability.is_finite() || probability <= 0.0 {
        return false;
    }
    rng.gen_bool(probability.min(1.0))
}
