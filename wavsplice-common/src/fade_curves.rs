//! Fade curve implementations for splice crossfades
//!
//! Provides the three fade shapes used at a splice boundary. The tail of the
//! earlier file is scaled by the fade-out gain while the head of the later
//! file is scaled by the fade-in gain over the same overlap region.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

/// Fade shapes for splice crossfades
///
/// - Linear: constant rate of change (triangular crossfade)
/// - HalfCosine: smooth start and finish, gains always sum to 1.0
///   (suits correlated material, e.g. a take split in two)
/// - QuarterCosine: equal power, constant perceived loudness across the
///   join (suits uncorrelated material)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// g(t) = t
    Linear,

    /// g(t) = 0.5 × (1 - cos(π × t))
    HalfCosine,

    /// g(t) = sin(t × π/2)
    QuarterCosine,
}

impl FadeCurve {
    /// Every shape, in the order shown to users
    pub const ALL: [FadeCurve; 3] = [
        FadeCurve::Linear,
        FadeCurve::HalfCosine,
        FadeCurve::QuarterCosine,
    ];

    /// Gain for the incoming file at `t` through the overlap (clamped to 0..=1)
    pub fn fade_in_gain(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => t,
            FadeCurve::HalfCosine => 0.5 * (1.0 - (PI * t).cos()),
            FadeCurve::QuarterCosine => (t * FRAC_PI_2).sin(),
        }
    }

    /// Gain for the outgoing file; mirror image of [`fade_in_gain`](Self::fade_in_gain)
    pub fn fade_out_gain(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => 1.0 - t,
            FadeCurve::HalfCosine => 0.5 * (1.0 + (PI * t).cos()),
            FadeCurve::QuarterCosine => (t * FRAC_PI_2).cos(),
        }
    }

    /// Parse a configuration or command-line name, ignoring case.
    ///
    /// `linear`/`triangular`/`t`, `cosine`/`half_cosine`/`h` and
    /// `equal_power`/`quarter_cosine`/`q` are recognised; dashes may stand in
    /// for underscores.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        match name.as_str() {
            "linear" | "triangular" | "t" => Some(FadeCurve::Linear),
            "cosine" | "half_cosine" | "h" => Some(FadeCurve::HalfCosine),
            "equal_power" | "quarter_cosine" | "q" => Some(FadeCurve::QuarterCosine),
            _ => None,
        }
    }

    /// Name written to configuration files
    pub fn config_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::HalfCosine => "cosine",
            FadeCurve::QuarterCosine => "equal_power",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::HalfCosine => "half-cosine",
            FadeCurve::QuarterCosine => "quarter-cosine",
        }
    }
}

impl Default for FadeCurve {
    fn default() -> Self {
        FadeCurve::HalfCosine
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
