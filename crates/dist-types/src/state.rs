// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{DistError, DistResult};
use ndarray::{s, Array1, ArrayD, Axis, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Check that `edges` describe at least one bin and are finite and
/// strictly increasing.
pub fn validate_edges(name: &str, edges: &Array1<f64>) -> DistResult<()> {
    if edges.len() < 2 {
        return Err(DistError::ConfigError(format!(
            "abscissa '{name}' needs at least 2 edges, got {}",
            edges.len()
        )));
    }
    if let Some(i) = edges.iter().position(|e| !e.is_finite()) {
        return Err(DistError::ConfigError(format!(
            "abscissa '{name}' has a non-finite edge at index {i}"
        )));
    }
    for i in 0..edges.len() - 1 {
        // Negated comparison so that NaN never slips through.
        if !(edges[i + 1] > edges[i]) {
            return Err(DistError::NonMonotonicEdges {
                name: name.to_string(),
                index: i,
            });
        }
    }
    Ok(())
}

/// Midpoints of adjacent edges.
pub fn bin_centers(edges: &Array1<f64>) -> Array1<f64> {
    if edges.len() < 2 {
        return Array1::zeros(0);
    }
    (&edges.slice(s![..-1]) + &edges.slice(s![1..])) * 0.5
}

/// One named coordinate axis of a gridded density.
/// Edges are validated on construction; centers are derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AbscissaRecord", into = "AbscissaRecord")]
pub struct Abscissa {
    name: String,
    edges: Array1<f64>,
    centers: Array1<f64>,
    /// Physical unit, e.g. "m/s" or "eV".
    pub unit: Option<String>,
    /// Auxiliary per-axis descriptors carried through conversions verbatim.
    pub attrs: BTreeMap<String, String>,
}

impl Abscissa {
    pub fn new(name: impl Into<String>, edges: Array1<f64>) -> DistResult<Self> {
        let name = name.into();
        validate_edges(&name, &edges)?;
        let centers = bin_centers(&edges);
        Ok(Abscissa {
            name,
            edges,
            centers,
            unit: None,
            attrs: BTreeMap::new(),
        })
    }

    /// Uniform bins: `n_bins + 1` edges from `min` to `max`.
    pub fn linspace(name: impl Into<String>, min: f64, max: f64, n_bins: usize) -> DistResult<Self> {
        let name = name.into();
        if n_bins == 0 {
            return Err(DistError::ConfigError(format!(
                "abscissa '{name}' needs at least one bin"
            )));
        }
        Self::new(name, Array1::linspace(min, max, n_bins + 1))
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn edges(&self) -> &Array1<f64> {
        &self.edges
    }

    pub fn centers(&self) -> &Array1<f64> {
        &self.centers
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn widths(&self) -> Array1<f64> {
        &self.edges.slice(s![1..]) - &self.edges.slice(s![..-1])
    }

    /// `(first edge, last edge)`.
    pub fn span(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    /// Largest absolute value among the outer edges.
    pub fn max_abs_edge(&self) -> f64 {
        let (lo, hi) = self.span();
        lo.abs().max(hi.abs())
    }
}

#[derive(Serialize, Deserialize)]
struct AbscissaRecord {
    name: String,
    edges: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, String>,
}

impl TryFrom<AbscissaRecord> for Abscissa {
    type Error = DistError;

    fn try_from(rec: AbscissaRecord) -> DistResult<Self> {
        let mut a = Abscissa::new(rec.name, Array1::from(rec.edges))?;
        a.unit = rec.unit;
        a.attrs = rec.attrs;
        Ok(a)
    }
}

impl From<Abscissa> for AbscissaRecord {
    fn from(a: Abscissa) -> Self {
        AbscissaRecord {
            name: a.name,
            edges: a.edges.to_vec(),
            unit: a.unit,
            attrs: a.attrs,
        }
    }
}

/// Multi-dimensional phase-space density over named abscissae.
///
/// `density` axis `i` is binned by `abscissae[i]`. A cell holds a density,
/// so `value * product of bin widths` is the quantity in that cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DensityRecord", into = "DensityRecord")]
pub struct GriddedDensity {
    abscissae: Vec<Abscissa>,
    density: ArrayD<f64>,
}

impl GriddedDensity {
    pub fn new(abscissae: Vec<Abscissa>, density: ArrayD<f64>) -> DistResult<Self> {
        for (i, a) in abscissae.iter().enumerate() {
            if abscissae[..i].iter().any(|b| b.name == a.name) {
                return Err(DistError::DuplicateAbscissa(a.name.clone()));
            }
        }
        if abscissae.len() != density.ndim() {
            return Err(DistError::ShapeMismatch(format!(
                "{} abscissae for a {}-dimensional density",
                abscissae.len(),
                density.ndim()
            )));
        }
        for (a, &n) in abscissae.iter().zip(density.shape()) {
            if a.len() != n {
                return Err(DistError::ShapeMismatch(format!(
                    "abscissa '{}' has {} bins but density axis has {}",
                    a.name,
                    a.len(),
                    n
                )));
            }
        }
        Ok(GriddedDensity { abscissae, density })
    }

    /// Zero density over the given abscissae.
    pub fn zeros(abscissae: Vec<Abscissa>) -> DistResult<Self> {
        let shape: Vec<usize> = abscissae.iter().map(Abscissa::len).collect();
        Self::new(abscissae, ArrayD::zeros(IxDyn(&shape)))
    }

    /// Density sampled from `f` at the bin centers; `f` receives one
    /// coordinate per abscissa, in axis order.
    pub fn from_fn<F>(abscissae: Vec<Abscissa>, f: F) -> DistResult<Self>
    where
        F: Fn(&[f64]) -> f64,
    {
        let shape: Vec<usize> = abscissae.iter().map(Abscissa::len).collect();
        let mut coords = vec![0.0; abscissae.len()];
        let density = ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
            for (k, a) in abscissae.iter().enumerate() {
                coords[k] = a.centers[idx[k]];
            }
            f(&coords)
        });
        Self::new(abscissae, density)
    }

    pub fn abscissae(&self) -> &[Abscissa] {
        &self.abscissae
    }

    pub fn names(&self) -> Vec<&str> {
        self.abscissae.iter().map(|a| a.name()).collect()
    }

    pub fn density(&self) -> &ArrayD<f64> {
        &self.density
    }

    pub fn ndim(&self) -> usize {
        self.abscissae.len()
    }

    pub fn shape(&self) -> &[usize] {
        self.density.shape()
    }

    /// Axis index of the abscissa called `name`.
    pub fn axis_of(&self, name: &str) -> DistResult<usize> {
        self.abscissae
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| DistError::UnknownAbscissa(name.to_string()))
    }

    pub fn abscissa(&self, name: &str) -> DistResult<&Abscissa> {
        Ok(&self.abscissae[self.axis_of(name)?])
    }

    pub fn into_parts(self) -> (Vec<Abscissa>, ArrayD<f64>) {
        (self.abscissae, self.density)
    }

    /// Integrated quantity: sum of density times bin volume.
    pub fn total(&self) -> f64 {
        let widths: Vec<Array1<f64>> = self.abscissae.iter().map(Abscissa::widths).collect();
        self.density
            .indexed_iter()
            .map(|(idx, &v)| {
                let volume: f64 = widths.iter().enumerate().map(|(k, w)| w[idx[k]]).product();
                v * volume
            })
            .sum()
    }

    /// Integrate out every abscissa not named in `keep`.
    /// Kept abscissae stay in their original axis order.
    pub fn marginal(&self, keep: &[&str]) -> DistResult<GriddedDensity> {
        let mut kept = vec![false; self.ndim()];
        for name in keep {
            let ax = self.axis_of(name)?;
            if kept[ax] {
                return Err(DistError::DuplicateAbscissa(name.to_string()));
            }
            kept[ax] = true;
        }

        let mut density = self.density.clone();
        for ax in (0..self.ndim()).rev() {
            if kept[ax] {
                continue;
            }
            let widths = self.abscissae[ax].widths();
            let mut shape = density.shape().to_vec();
            shape.remove(ax);
            let mut reduced = ArrayD::<f64>::zeros(IxDyn(&shape));
            for (w, lane) in widths.iter().zip(density.axis_iter(Axis(ax))) {
                reduced.scaled_add(*w, &lane);
            }
            density = reduced;
        }

        let abscissae = self
            .abscissae
            .iter()
            .zip(&kept)
            .filter(|&(_, &k)| k)
            .map(|(a, _)| a.clone())
            .collect();
        GriddedDensity::new(abscissae, density)
    }
}

#[derive(Serialize, Deserialize)]
struct DensityRecord {
    abscissae: Vec<Abscissa>,
    density: ArrayD<f64>,
}

impl TryFrom<DensityRecord> for GriddedDensity {
    type Error = DistError;

    fn try_from(rec: DensityRecord) -> DistResult<Self> {
        GriddedDensity::new(rec.abscissae, rec.density)
    }
}

impl From<GriddedDensity> for DensityRecord {
    fn from(d: GriddedDensity) -> Self {
        DensityRecord {
            abscissae: d.abscissae,
            density: d.density,
        }
    }
}
