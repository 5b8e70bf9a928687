use alloc::sync::Arc;

use crate::{ItemKey, WindowError};

/// A callback fired once per key evicted from the loaded set.
///
/// Hosts use it to drop whatever they cached for that item (rendered rows, decoded images, ...).
pub type OnEvictCallback<K> = Arc<dyn Fn(&K) + Send + Sync>;

/// How the reclaimer sizes an eviction batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvictionScale {
    /// `eviction_fraction` of the total entry count. Pressure grows with the store size.
    #[default]
    TotalItems,
    /// `eviction_fraction` of the eligible candidates.
    Candidates,
}

/// Plain-data configuration for [`crate::WindowedStore`].
///
/// Heights are in pixels. `memory_threshold` and `per_item_estimate` share one unit; the
/// defaults read as kilobytes. The estimate is a flat per-item approximation, not a measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowConfig {
    pub item_height: u32,
    pub container_height: u32,
    /// Extra items rendered past the end of the viewport.
    pub overscan: usize,
    /// Fraction of the window size scanned on each side for speculative loads.
    pub predictive_loading_factor: f64,
    /// Gates the predictive loader.
    pub ai_optimization_enabled: bool,
    pub memory_threshold: f64,
    pub per_item_estimate: f64,
    pub reclaim_interval_ms: u64,
    /// Share of the scale evicted per pass. `0.0` turns eviction off.
    pub eviction_fraction: f64,
    pub eviction_scale: EvictionScale,
    /// Entries scoring strictly above this are queued for materialization.
    pub priority_threshold: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            item_height: 50,
            container_height: 600,
            overscan: 5,
            predictive_loading_factor: 0.5,
            ai_optimization_enabled: true,
            memory_threshold: 100.0,
            per_item_estimate: 1.0,
            reclaim_interval_ms: 30_000,
            eviction_fraction: 0.1,
            eviction_scale: EvictionScale::TotalItems,
            priority_threshold: 0.5,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.item_height == 0 {
            return Err(invalid("item_height", "must be greater than zero"));
        }
        if self.container_height == 0 {
            return Err(invalid("container_height", "must be greater than zero"));
        }
        if !unit_interval(self.predictive_loading_factor) {
            return Err(invalid(
                "predictive_loading_factor",
                "must be a finite value in 0..=1",
            ));
        }
        if !self.memory_threshold.is_finite() || self.memory_threshold < 0.0 {
            return Err(invalid("memory_threshold", "must be finite and non-negative"));
        }
        if !self.per_item_estimate.is_finite() || self.per_item_estimate <= 0.0 {
            return Err(invalid("per_item_estimate", "must be finite and positive"));
        }
        if self.reclaim_interval_ms == 0 {
            return Err(invalid("reclaim_interval_ms", "must be greater than zero"));
        }
        if !unit_interval(self.eviction_fraction) {
            return Err(invalid("eviction_fraction", "must be a finite value in 0..=1"));
        }
        if !unit_interval(self.priority_threshold) {
            return Err(invalid("priority_threshold", "must be a finite value in 0..=1"));
        }
        Ok(())
    }
}

fn unit_interval(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

fn invalid(field: &'static str, reason: &'static str) -> WindowError {
    WindowError::InvalidConfiguration { field, reason }
}

/// Configuration plus callbacks for [`crate::WindowedStore`].
///
/// Cheap to clone: the callback is stored in an `Arc`.
pub struct WindowOptions<K = ItemKey> {
    pub config: WindowConfig,
    pub on_evict: Option<OnEvictCallback<K>>,
}

impl<K> Clone for WindowOptions<K> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            on_evict: self.on_evict.clone(),
        }
    }
}

impl<K> Default for WindowOptions<K> {
    fn default() -> Self {
        Self::from_config(WindowConfig::default())
    }
}

impl<K> WindowOptions<K> {
    /// Creates options for rows of `item_height` pixels inside a `container_height` viewport.
    pub fn new(item_height: u32, container_height: u32) -> Self {
        Self::from_config(WindowConfig {
            item_height,
            container_height,
            ..WindowConfig::default()
        })
    }

    pub fn from_config(config: WindowConfig) -> Self {
        Self {
            config,
            on_evict: None,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.config.overscan = overscan;
        self
    }

    pub fn with_predictive_loading_factor(mut self, factor: f64) -> Self {
        self.config.predictive_loading_factor = factor;
        self
    }

    pub fn with_ai_optimization_enabled(mut self, enabled: bool) -> Self {
        self.config.ai_optimization_enabled = enabled;
        self
    }

    pub fn with_memory_threshold(mut self, threshold: f64) -> Self {
        self.config.memory_threshold = threshold;
        self
    }

    pub fn with_per_item_estimate(mut self, estimate: f64) -> Self {
        self.config.per_item_estimate = estimate;
        self
    }

    pub fn with_reclaim_interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.reclaim_interval_ms = interval_ms;
        self
    }

    pub fn with_eviction(mut self, fraction: f64, scale: EvictionScale) -> Self {
        self.config.eviction_fraction = fraction;
        self.config.eviction_scale = scale;
        self
    }

    pub fn with_priority_threshold(mut self, threshold: f64) -> Self {
        self.config.priority_threshold = threshold;
        self
    }

    /// The callback runs inside `WindowedStore::reclaim`, while the store is borrowed. When
    /// the store sits behind a lock, the callback must not take that lock again.
    pub fn with_on_evict(mut self, on_evict: Option<impl Fn(&K) + Send + Sync + 'static>) -> Self {
        self.on_evict = on_evict.map(|f| Arc::new(f) as _);
        self
    }
}

impl<K> core::fmt::Debug for WindowOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("config", &self.config)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
