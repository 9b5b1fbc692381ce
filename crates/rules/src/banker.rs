use dealroom_core::Money;
use dealroom_core::Round;

/// Per-round modifier applied to the mean of the remaining values. Indexed by
/// `min(round - 1, 5)`, so round 6 onward reuses the round-6 modifier.
const ROUND_MODIFIERS: [f64; 6] = [0.70, 0.80, 0.90, 0.95, 1.00, 1.05];

/// Computes banker offers from the remaining, unopened box values.
pub struct Banker;

impl Banker {
    /// Computes the next offer given the remaining values and the current
    /// round. An empty `remaining` always yields `0.0`. The offer carries
    /// intentional randomness (`randomFactor ~ Uniform(0.90, 1.10)`) and is
    /// not required to be monotonic across rounds.
    pub fn offer(remaining: &[Money], round: Round, rng: &mut impl rand::Rng) -> Money {
        if remaining.is_empty() {
            return 0.0;
        }
        let avg = remaining.iter().sum::<Money>() / remaining.len() as Money;
        let base_modifier = ROUND_MODIFIERS[(round.saturating_sub(1) as usize).min(5)];
        let random_factor = rng.random_range(0.90..=1.10);
        let raw = avg * base_modifier * random_factor;
        round_to_nearest_ten(raw)
    }
}

fn round_to_nearest_ten(value: Money) -> Money {
    (value / 10.0).round() * 10.0
}
