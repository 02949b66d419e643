// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Elementary charge (C). Also the J per eV conversion factor.
pub const Q_ELECTRON: f64 = 1.602176634e-19;

/// Atomic mass unit (kg)
pub const AMU: f64 = 1.66053906660e-27;

/// Electron mass (kg)
pub const M_ELECTRON: f64 = 9.1093837015e-31;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.67262192369e-27;

/// Deuterium mass (kg)
pub const M_DEUTERIUM: f64 = 3.3435837724e-27;

/// Alpha particle mass (kg)
pub const M_ALPHA: f64 = 6.6446573357e-27;

/// Bins per replaced abscissa when a conversion gets no explicit edges.
pub const DEFAULT_TARGET_BINS: usize = 10;
