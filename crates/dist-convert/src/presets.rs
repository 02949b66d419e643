// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Velocity-Space Conversion Presets
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Non-relativistic velocity-space transforms for equal-mass markers.
//!
//! Energy is in electronvolts, pitch is `xi = v_par / v`.
//!
//! (vpa, vpe) → (v, xi) has `|det| = v / sqrt(1 - xi²)` and
//! (v, xi) → (E, xi) has `|det| = e / (m v)`, so
//! `dvpa dvpe = (e / m) / sqrt(1 - xi²) dE dxi`.
//! With momenta, `p = sqrt(2 m e E)` and `dppa dppe = m e / sqrt(1 - xi²) dE dxi`.

use crate::transform::{BoundsPolicy, Execution, PairMap, TransformSpec};
use dist_types::config::{ConversionConfig, Preset};
use dist_types::constants::{DEFAULT_TARGET_BINS, Q_ELECTRON};
use dist_types::error::{DistError, DistResult};
use dist_types::state::Abscissa;
use ndarray::Array1;

pub const VPA: &str = "vpa";
pub const VPE: &str = "vpe";
pub const PPA: &str = "ppa";
pub const PPE: &str = "ppe";
pub const ENERGY: &str = "E";
pub const PITCH: &str = "xi";

fn check_mass(mass_kg: f64) -> DistResult<()> {
    if !mass_kg.is_finite() || mass_kg <= 0.0 {
        return Err(DistError::ConfigError(format!(
            "particle mass must be finite and > 0, got {mass_kg}"
        )));
    }
    Ok(())
}

fn check_energy(energy_ev: f64) -> DistResult<()> {
    if !(energy_ev >= 0.0) {
        return Err(DistError::PhysicsViolation(format!(
            "negative energy {energy_ev} eV"
        )));
    }
    Ok(())
}

/// `sqrt(1 - xi²)`, defined for `|xi| <= 1`.
fn perp_fraction(xi: f64) -> DistResult<f64> {
    if !(xi.abs() <= 1.0) {
        return Err(DistError::PhysicsViolation(format!(
            "pitch {xi} outside [-1, 1]"
        )));
    }
    Ok((1.0 - xi * xi).sqrt())
}

/// Jacobian denominator; vanishes at `|xi| = 1`.
fn pitch_weight_denominator(xi: f64) -> DistResult<f64> {
    let s = perp_fraction(xi)?;
    if s == 0.0 {
        return Err(DistError::PhysicsViolation(format!(
            "Jacobian singular at pitch {xi}"
        )));
    }
    Ok(s)
}

fn energy_pitch_defaults(e_max: f64) -> [Array1<f64>; 2] {
    [
        Array1::linspace(0.0, e_max, DEFAULT_TARGET_BINS + 1),
        Array1::linspace(-1.0, 1.0, DEFAULT_TARGET_BINS + 1),
    ]
}

/// Target (E, xi) from source (vpa, vpe).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityToEnergyPitch {
    mass_kg: f64,
}

impl VelocityToEnergyPitch {
    pub fn new(mass_kg: f64) -> DistResult<Self> {
        check_mass(mass_kg)?;
        Ok(VelocityToEnergyPitch { mass_kg })
    }

    /// Speed [m/s] of a particle with kinetic energy `energy_ev`.
    pub fn speed(&self, energy_ev: f64) -> f64 {
        (2.0 * energy_ev * Q_ELECTRON / self.mass_kg).sqrt()
    }

    /// Kinetic energy [eV] at speed `v`.
    pub fn energy(&self, v: f64) -> f64 {
        0.5 * self.mass_kg * v * v / Q_ELECTRON
    }
}

impl PairMap for VelocityToEnergyPitch {
    fn to_source(&self, [energy_ev, xi]: [f64; 2]) -> DistResult<[f64; 2]> {
        check_energy(energy_ev)?;
        let v = self.speed(energy_ev);
        Ok([xi * v, perp_fraction(xi)? * v])
    }

    fn jacobian(&self, [_, xi]: [f64; 2]) -> DistResult<f64> {
        Ok(Q_ELECTRON / self.mass_kg / pitch_weight_denominator(xi)?)
    }

    fn default_edges(&self, source: [&Abscissa; 2]) -> Option<[Array1<f64>; 2]> {
        let v_max = source[0].max_abs_edge().max(source[1].max_abs_edge());
        Some(energy_pitch_defaults(self.energy(v_max)))
    }

    fn target_units(&self) -> [Option<&str>; 2] {
        [Some("eV"), Some("1")]
    }
}

/// Target (E, xi) from source (ppa, ppe).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumToEnergyPitch {
    mass_kg: f64,
}

impl MomentumToEnergyPitch {
    pub fn new(mass_kg: f64) -> DistResult<Self> {
        check_mass(mass_kg)?;
        Ok(MomentumToEnergyPitch { mass_kg })
    }

    /// Momentum [kg m/s] at kinetic energy `energy_ev`.
    pub fn momentum(&self, energy_ev: f64) -> f64 {
        (2.0 * self.mass_kg * Q_ELECTRON * energy_ev).sqrt()
    }

    /// Kinetic energy [eV] at momentum `p`.
    pub fn energy(&self, p: f64) -> f64 {
        p * p / (2.0 * self.mass_kg * Q_ELECTRON)
    }
}

impl PairMap for MomentumToEnergyPitch {
    fn to_source(&self, [energy_ev, xi]: [f64; 2]) -> DistResult<[f64; 2]> {
        check_energy(energy_ev)?;
        let p = self.momentum(energy_ev);
        Ok([xi * p, perp_fraction(xi)? * p])
    }

    fn jacobian(&self, [_, xi]: [f64; 2]) -> DistResult<f64> {
        Ok(self.mass_kg * Q_ELECTRON / pitch_weight_denominator(xi)?)
    }

    fn default_edges(&self, source: [&Abscissa; 2]) -> Option<[Array1<f64>; 2]> {
        let p_max = source[0].max_abs_edge().max(source[1].max_abs_edge());
        Some(energy_pitch_defaults(self.energy(p_max)))
    }

    fn target_units(&self) -> [Option<&str>; 2] {
        [Some("eV"), Some("1")]
    }
}

/// Target (vpa, vpe) from source (E, xi); inverse of [`VelocityToEnergyPitch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyPitchToVelocity {
    forward: VelocityToEnergyPitch,
}

impl EnergyPitchToVelocity {
    pub fn new(mass_kg: f64) -> DistResult<Self> {
        Ok(EnergyPitchToVelocity {
            forward: VelocityToEnergyPitch::new(mass_kg)?,
        })
    }
}

impl PairMap for EnergyPitchToVelocity {
    fn to_source(&self, [vpa, vpe]: [f64; 2]) -> DistResult<[f64; 2]> {
        let v = vpa.hypot(vpe);
        if !(v > 0.0) {
            return Err(DistError::PhysicsViolation(
                "pitch undefined at zero speed".to_string(),
            ));
        }
        Ok([self.forward.energy(v), vpa / v])
    }

    fn jacobian(&self, [vpa, vpe]: [f64; 2]) -> DistResult<f64> {
        let v = vpa.hypot(vpe);
        if !(v > 0.0) {
            return Err(DistError::PhysicsViolation(
                "Jacobian undefined at zero speed".to_string(),
            ));
        }
        Ok(self.forward.mass_kg * vpe.abs() / (Q_ELECTRON * v))
    }

    fn default_edges(&self, source: [&Abscissa; 2]) -> Option<[Array1<f64>; 2]> {
        let v_max = self.forward.speed(source[0].span().1.max(0.0));
        Some([
            Array1::linspace(-v_max, v_max, DEFAULT_TARGET_BINS + 1),
            Array1::linspace(0.0, v_max, DEFAULT_TARGET_BINS + 1),
        ])
    }

    fn target_units(&self) -> [Option<&str>; 2] {
        [Some("m/s"), Some("m/s")]
    }
}

/// (vpa, vpe) → (E, xi).
pub fn vpavpe_to_exi(mass_kg: f64) -> DistResult<TransformSpec> {
    Ok(TransformSpec::new(
        [VPA, VPE],
        [ENERGY, PITCH],
        VelocityToEnergyPitch::new(mass_kg)?,
    ))
}

/// (ppa, ppe) → (E, xi).
pub fn ppappe_to_exi(mass_kg: f64) -> DistResult<TransformSpec> {
    Ok(TransformSpec::new(
        [PPA, PPE],
        [ENERGY, PITCH],
        MomentumToEnergyPitch::new(mass_kg)?,
    ))
}

/// (E, xi) → (vpa, vpe).
pub fn exi_to_vpavpe(mass_kg: f64) -> DistResult<TransformSpec> {
    Ok(TransformSpec::new(
        [ENERGY, PITCH],
        [VPA, VPE],
        EnergyPitchToVelocity::new(mass_kg)?,
    ))
}

/// Build the preset selected in `cfg`, applying its edge overrides and
/// execution options.
pub fn from_config(cfg: &ConversionConfig) -> DistResult<TransformSpec> {
    cfg.validate()?;
    let mass_kg = cfg.mass_kg();
    let mut spec = match cfg.preset {
        Preset::VpavpeToExi => vpavpe_to_exi(mass_kg)?,
        Preset::PpappeToExi => ppappe_to_exi(mass_kg)?,
        Preset::ExiToVpavpe => exi_to_vpavpe(mass_kg)?,
    };
    for (slot, edge_spec) in cfg.target_edges.iter().enumerate() {
        if let Some(edge_spec) = edge_spec {
            spec = spec.with_target_edge(slot, edge_spec.to_edges()?);
        }
    }
    if cfg.strict_bounds {
        spec = spec.with_bounds(BoundsPolicy::Strict);
    }
    if !cfg.parallel {
        spec = spec.with_execution(Execution::Serial);
    }
    Ok(spec)
}
