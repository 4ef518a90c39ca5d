//! Severity annotation: a label plus a color on a fixed best-to-worst gradient.
//!
//! Thresholds are configuration, never derived from the data, so a report
//! whose values are all identical still maps every entry deterministically.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::humanize::natural_delta;
use crate::rank::{Measure, Measured};

/// Number of bands in a gradient.
pub const GRADIENT_STEPS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const LIME: Self = Self::new(0x00, 0xff, 0x00);
    pub const RED: Self = Self::new(0xff, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn to_hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let diff = max - min;
        if diff == 0.0 {
            return (0.0, 0.0, l);
        }
        let s = if l < 0.5 {
            diff / (max + min)
        } else {
            diff / (2.0 - max - min)
        };
        let h = if max == r {
            ((g - b) / diff).rem_euclid(6.0)
        } else if max == g {
            (b - r) / diff + 2.0
        } else {
            (r - g) / diff + 4.0
        };
        (h / 6.0, s, l)
    }

    fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        if s == 0.0 {
            let v = channel(l);
            return Self::new(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::new(
            channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            channel(hue_to_rgb(p, q, h)),
            channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Precomputed color ramp from a best color (band 0) to a worst color (last band).
///
/// Interpolation runs linearly through hue, saturation and lightness.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    colors: Vec<Rgb>,
}

impl Gradient {
    pub fn new(best: Rgb, worst: Rgb, steps: usize) -> Self {
        let steps = steps.max(2);
        let (h0, s0, l0) = best.to_hsl();
        let (h1, s1, l1) = worst.to_hsl();
        let last = (steps - 1) as f64;
        let colors = (0..steps)
            .map(|i| {
                let t = i as f64 / last;
                Rgb::from_hsl(h0 + (h1 - h0) * t, s0 + (s1 - s0) * t, l0 + (l1 - l0) * t)
            })
            .collect();
        Self { colors }
    }

    /// Shared lime-to-red ramp with [`GRADIENT_STEPS`] bands.
    pub fn standard() -> Arc<Self> {
        static STANDARD: OnceLock<Arc<Gradient>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Arc::new(Gradient::new(Rgb::LIME, Rgb::RED, GRADIENT_STEPS)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for `band`, clamped to the last band.
    pub fn color(&self, band: usize) -> Rgb {
        self.colors[band.min(self.colors.len() - 1)]
    }
}

/// Fixed `[min, max]` badness range mapped onto the gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min: f64,
    pub max: f64,
}

impl Thresholds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Band index in `0..steps` for a badness value, clamped at both ends.
    ///
    /// A degenerate range puts values at or above `max` in the last band and
    /// everything else in the first.
    pub fn band(&self, value: f64, steps: usize) -> usize {
        let top = steps.saturating_sub(1);
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return if value >= self.max { top } else { 0 };
        }
        let scaled = (value - self.min) / span * steps as f64;
        // f64::max drops NaN, so an unusable value lands in band 0.
        scaled.max(0.0).min(top as f64) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Rate in `[0, 1]` shown as a whole percentage.
    Percent,
    /// Plain integer count.
    Count,
    /// Seconds shown as a natural-language span.
    Duration,
}

impl LabelStyle {
    pub fn for_measure(measure: Measure) -> Self {
        match measure {
            Measure::PassRate => Self::Percent,
            Measure::Failures => Self::Count,
            Measure::P90Duration | Measure::TotalDuration => Self::Duration,
        }
    }

    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Percent => format!("{:.0}%", value * 100.0),
            Self::Count => format!("{}", value.round() as u64),
            Self::Duration => natural_delta(value),
        }
    }
}

/// Visual severity of one ranked value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    pub label: String,
    /// `#rrggbb`.
    pub color: String,
    /// Gradient band, 0 (best) to 99 (worst).
    pub band: usize,
}

/// Severity mapping for one measure at one level (job or test).
#[derive(Debug, Clone)]
pub struct SeverityScale {
    measure: Measure,
    thresholds: Thresholds,
    label: LabelStyle,
    gradient: Arc<Gradient>,
}

impl SeverityScale {
    pub fn new(measure: Measure, thresholds: Thresholds) -> Self {
        Self {
            measure,
            thresholds,
            label: LabelStyle::for_measure(measure),
            gradient: Gradient::standard(),
        }
    }

    pub fn with_gradient(mut self, gradient: Arc<Gradient>) -> Self {
        self.gradient = gradient;
        self
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Higher is worse. Pass rates become their deficit in percentage points.
    pub fn badness(&self, value: f64) -> f64 {
        match self.measure {
            Measure::PassRate => 100.0 - value * 100.0,
            _ => value,
        }
    }

    pub fn severity(&self, value: f64) -> Severity {
        let band = self
            .thresholds
            .band(self.badness(value), self.gradient.len());
        Severity {
            label: self.label.format(value),
            color: self.gradient.color(band).hex(),
            band,
        }
    }

    /// Severity of `record`'s measure, or `None` when the measure is undefined.
    pub fn assess<T: Measured>(&self, record: &T) -> Option<Severity> {
        record.measure(self.measure).map(|v| self.severity(v))
    }
}
