//! Client-side scales.

use serde::Serialize;

/// Linear mapping from a numeric domain to a numeric range.
///
/// Unclamped by default: inputs outside the domain extrapolate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    pub clamp: bool,
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            clamp: true,
            ..self
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d0 == d1 {
            return r0;
        }
        let mut t = (x - d0) / (d1 - d0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + t * (r1 - r0)
    }
}

/// Maps a continuous domain onto a fixed list of colors in equal buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantizeScale {
    pub domain: [f64; 2],
    pub range: Vec<String>,
    pub default: String,
    pub null_value: String,
}

impl QuantizeScale {
    /// Color for a value. Values outside the domain land in the end buckets;
    /// NaN gets the null color.
    pub fn bucket(&self, value: f64) -> &str {
        if value.is_nan() {
            return &self.null_value;
        }
        let n = self.range.len();
        if n == 0 {
            return &self.default;
        }
        let [lo, hi] = self.domain;
        let index = if hi > lo {
            let t = (value - lo) / (hi - lo);
            ((t * n as f64).floor().max(0.0) as usize).min(n - 1)
        } else {
            0
        };
        &self.range[index]
    }

    /// Inner bucket boundaries, `range.len() - 1` of them.
    pub fn thresholds(&self) -> Vec<f64> {
        let n = self.range.len();
        let [lo, hi] = self.domain;
        (1..n)
            .map(|k| lo + (hi - lo) * k as f64 / n as f64)
            .collect()
    }
}
