// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::AMU;
use crate::error::{DistError, DistResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Named coordinate conversions that can be selected from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// (vpa, vpe) → (E, xi)
    VpavpeToExi,
    /// (ppa, ppe) → (E, xi)
    PpappeToExi,
    /// (E, xi) → (vpa, vpe)
    ExiToVpavpe,
}

/// Target grid edges, either listed or uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeSpec {
    Explicit(Vec<f64>),
    Uniform { min: f64, max: f64, n_bins: usize },
}

impl EdgeSpec {
    pub fn to_edges(&self) -> DistResult<Array1<f64>> {
        match self {
            EdgeSpec::Explicit(edges) => Ok(Array1::from(edges.clone())),
            EdgeSpec::Uniform { min, max, n_bins } => {
                if *n_bins == 0 {
                    return Err(DistError::ConfigError(
                        "uniform edge spec needs n_bins >= 1".to_string(),
                    ));
                }
                Ok(Array1::linspace(*min, *max, n_bins + 1))
            }
        }
    }
}

/// Conversion settings as stored in JSON.
///
/// ```json
/// { "preset": "vpavpe_to_exi", "mass_amu": 4.0015,
///   "target_edges": [{ "min": 0.0, "max": 3.5e6, "n_bins": 50 }, null] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub preset: Preset,
    /// Marker species mass in atomic mass units.
    pub mass_amu: f64,
    /// Per target abscissa override; `None` falls back to the preset default.
    #[serde(default)]
    pub target_edges: [Option<EdgeSpec>; 2],
    /// Reject mapped points outside the source grid instead of extrapolating.
    #[serde(default)]
    pub strict_bounds: bool,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool {
    true
}

impl ConversionConfig {
    /// Load from JSON file.
    pub fn from_file(path: &str) -> DistResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DistResult<()> {
        if !self.mass_amu.is_finite() || self.mass_amu <= 0.0 {
            return Err(DistError::ConfigError(format!(
                "mass_amu must be finite and > 0, got {}",
                self.mass_amu
            )));
        }
        Ok(())
    }

    pub fn mass_kg(&self) -> f64 {
        self.mass_amu * AMU
    }
}
