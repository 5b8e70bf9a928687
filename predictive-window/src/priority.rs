//! Render-priority scoring for off-screen entries.

const FREQUENCY_WEIGHT: f64 = 0.4;
const RECENCY_WEIGHT: f64 = 0.3;
const PROXIMITY_WEIGHT: f64 = 0.3;

/// Access count at which the frequency term saturates.
const FREQUENCY_SATURATION: f64 = 10.0;
/// Age at which the recency term reaches zero (5 minutes).
const RECENCY_HORIZON_MS: f64 = 5.0 * 60.0 * 1000.0;
/// Distance (in rows) at which the proximity term reaches zero.
const PROXIMITY_HORIZON: f64 = 20.0;

/// Inputs to [`render_priority`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrioritySignals {
    pub access_count: u64,
    /// Milliseconds since the entry last became visible, `None` if it never did.
    pub recency_ms: Option<u64>,
    /// Rows between the entry and the nearer edge of the visible window.
    pub distance: usize,
}

/// Blends frequency, recency and proximity into a score in `[0, 1]`.
///
/// Each term is clamped to `[0, 1]` before weighting and the weights sum to one.
pub fn render_priority(signals: PrioritySignals) -> f64 {
    let frequency = (signals.access_count as f64 / FREQUENCY_SATURATION).min(1.0);
    let recency = match signals.recency_ms {
        Some(age) => (1.0 - age as f64 / RECENCY_HORIZON_MS).max(0.0),
        None => 0.0,
    };
    let proximity = (1.0 - signals.distance as f64 / PROXIMITY_HORIZON).max(0.0);

    let score =
        FREQUENCY_WEIGHT * frequency + RECENCY_WEIGHT * recency + PROXIMITY_WEIGHT * proximity;
    score.clamp(0.0, 1.0)
}
