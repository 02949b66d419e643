// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Distribution Conversion
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Coordinate conversion of gridded phase-space distributions.

pub mod engine;
pub mod presets;
pub mod transform;

pub use engine::convert;
pub use transform::{BoundsPolicy, Execution, FnPairMap, PairMap, TransformSpec};
