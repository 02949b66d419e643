// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Distribution Conversion Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Jacobian-weighted re-gridding of a density onto a new coordinate pair.
//!
//! For every index tuple of the untouched abscissae the 2-D source slice is
//! interpolated bilinearly at the pulled-back target bin centers and
//! multiplied by `|det J|`. The mapped points and weights depend only on the
//! target grid, so they are evaluated once and shared by all slices.

use crate::transform::{BoundsPolicy, Execution, TransformSpec};
use dist_math::grid::{meshgrid_points, within};
use dist_math::index::{unravel_index, MultiIndex};
use dist_math::interp::BilinearStencil;
use dist_types::error::{DistError, DistResult};
use dist_types::state::{Abscissa, GriddedDensity};
use ndarray::{Array3, ArrayViewD, Axis, Ix2, IxDyn};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Axis bookkeeping resolved before any array work.
struct Plan {
    source_axes: [usize; 2],
    untouched: Vec<usize>,
    insert_at: usize,
    targets: [Abscissa; 2],
}

impl Plan {
    fn new(dist: &GriddedDensity, spec: &TransformSpec) -> DistResult<Self> {
        let [s0, s1] = &spec.source_pair;
        if s0 == s1 {
            return Err(DistError::DuplicateAbscissa(s0.clone()));
        }
        let [t0, t1] = &spec.target_pair;
        if t0 == t1 {
            return Err(DistError::DuplicateAbscissa(t0.clone()));
        }

        let source_axes = [dist.axis_of(s0)?, dist.axis_of(s1)?];
        let untouched: Vec<usize> = (0..dist.ndim())
            .filter(|k| !source_axes.contains(k))
            .collect();
        for name in &spec.target_pair {
            if untouched
                .iter()
                .any(|&k| dist.abscissae()[k].name() == name.as_str())
            {
                return Err(DistError::AbscissaCollision(name.clone()));
            }
        }

        let source = [
            &dist.abscissae()[source_axes[0]],
            &dist.abscissae()[source_axes[1]],
        ];
        let defaults = if spec.target_edges.iter().any(Option::is_none) {
            spec.map.default_edges(source)
        } else {
            None
        };
        let units = spec.map.target_units();
        let build = |slot: usize| -> DistResult<Abscissa> {
            let edges = match (&spec.target_edges[slot], &defaults) {
                (Some(edges), _) => edges.clone(),
                (None, Some(d)) => d[slot].clone(),
                (None, None) => {
                    return Err(DistError::ConfigError(format!(
                        "no edges for target abscissa '{}' and the transform has no default",
                        spec.target_pair[slot]
                    )))
                }
            };
            let mut a = Abscissa::new(spec.target_pair[slot].clone(), edges)?;
            a.unit = units[slot].map(str::to_string);
            Ok(a)
        };
        let targets = [build(0)?, build(1)?];

        Ok(Plan {
            source_axes,
            untouched,
            // Untouched axes before the first source axis keep their index.
            insert_at: source_axes[0].min(source_axes[1]),
            targets,
        })
    }

    /// Output axis `j` is taken from axis `perm[j]` of the
    /// `(untouched..., t0, t1)` working layout.
    fn output_permutation(&self) -> Vec<usize> {
        let k = self.untouched.len();
        (0..k + 2)
            .map(|j| {
                if j < self.insert_at {
                    j
                } else if j == self.insert_at {
                    k
                } else if j == self.insert_at + 1 {
                    k + 1
                } else {
                    j - 2
                }
            })
            .collect()
    }
}

fn domain_error(spec: &TransformSpec, point: [f64; 2], source: DistError) -> DistError {
    DistError::Domain {
        target: spec.target_pair.clone(),
        point,
        source: Box::new(source),
    }
}

/// Pull every target point back to source space and evaluate its weight.
fn map_points(spec: &TransformSpec, points: &[[f64; 2]]) -> DistResult<(Vec<[f64; 2]>, Vec<f64>)> {
    let mut mapped = Vec::with_capacity(points.len());
    let mut weights = Vec::with_capacity(points.len());
    for &p in points {
        let s = spec
            .map
            .to_source(p)
            .map_err(|e| domain_error(spec, p, e))?;
        if !(s[0].is_finite() && s[1].is_finite()) {
            return Err(domain_error(
                spec,
                p,
                DistError::PhysicsViolation(format!("non-finite source point {s:?}")),
            ));
        }
        let w = spec
            .map
            .jacobian(p)
            .map_err(|e| domain_error(spec, p, e))?;
        if !w.is_finite() || w < 0.0 {
            return Err(domain_error(
                spec,
                p,
                DistError::PhysicsViolation(format!("invalid Jacobian weight {w}")),
            ));
        }
        mapped.push(s);
        weights.push(w);
    }
    Ok((mapped, weights))
}

/// Re-express `dist` over `spec.target_pair` instead of `spec.source_pair`.
///
/// The input is never modified; the result owns fresh arrays. Untouched
/// abscissae, including their units and descriptors, are copied verbatim
/// and keep their relative order. The target pair takes the place of the
/// earlier of the two source axes, which need not be adjacent.
///
/// Errors: configuration problems (unknown or colliding names, bad edges,
/// missing default edges) before any allocation of the output; domain
/// errors carrying the offending target point; `OutOfBounds` under
/// [`BoundsPolicy::Strict`].
pub fn convert(dist: &GriddedDensity, spec: &TransformSpec) -> DistResult<GriddedDensity> {
    let plan = Plan::new(dist, spec)?;
    let [a0, a1] = plan.source_axes;
    let src = [&dist.abscissae()[a0], &dist.abscissae()[a1]];
    let [t0, t1] = &plan.targets;
    let (n0, n1) = (src[0].len(), src[1].len());
    let (m0, m1) = (t0.len(), t1.len());

    let untouched_shape: Vec<usize> = plan.untouched.iter().map(|&k| dist.shape()[k]).collect();
    let n_slices: usize = untouched_shape.iter().product();
    debug!(
        source = ?spec.source_pair,
        target = ?spec.target_pair,
        slices = n_slices,
        target_shape = ?(m0, m1),
        "converting distribution"
    );

    let points = meshgrid_points(&t0.centers().to_vec(), &t1.centers().to_vec());
    let (mapped, weights) = map_points(spec, &points)?;

    let spans = [src[0].span(), src[1].span()];
    let mut outside = points
        .iter()
        .zip(&mapped)
        .filter(|(_, m)| !(within(spans[0], m[0]) && within(spans[1], m[1])));
    match spec.bounds {
        BoundsPolicy::Strict => {
            if let Some((&point, &m)) = outside.next() {
                return Err(DistError::OutOfBounds {
                    target: spec.target_pair.clone(),
                    point,
                    mapped: m,
                });
            }
        }
        BoundsPolicy::Extrapolate => {
            let count = outside.count();
            if count > 0 {
                warn!(
                    points = count,
                    total = mapped.len(),
                    "target points map outside the source grid; values are extrapolated"
                );
            }
        }
    }

    let stencil = BilinearStencil::new(&src[0].centers().to_vec(), &src[1].centers().to_vec(), &mapped)?;

    // Working layout: untouched axes first, then the source pair in order.
    let mut order = plan.untouched.clone();
    order.extend([a0, a1]);
    let permuted: ArrayViewD<f64> = dist.density().view().permuted_axes(order);

    let mut out = Array3::<f64>::zeros((n_slices, m0, m1));
    match spec.execution {
        Execution::Parallel => {
            let slices = permuted.to_shape((n_slices, n0, n1))?;
            out.axis_iter_mut(Axis(0))
                .into_par_iter()
                .zip(slices.axis_iter(Axis(0)).into_par_iter())
                .try_for_each(|(o, s)| stencil.apply_scaled(s, &weights, o))?;
        }
        Execution::Serial => {
            for (k, idx) in MultiIndex::new(&untouched_shape).enumerate() {
                let mut slice = permuted.view();
                for &i in &idx {
                    slice = slice.index_axis_move(Axis(0), i);
                }
                let slice = slice.into_dimensionality::<Ix2>()?;
                stencil.apply_scaled(slice, &weights, out.index_axis_mut(Axis(0), k))?;
            }
        }
    }

    if let Some(k) = out
        .outer_iter()
        .position(|s| s.iter().any(|v| !v.is_finite()))
    {
        warn!(
            slice = ?unravel_index(k, &untouched_shape),
            "converted density contains non-finite values"
        );
    }

    let mut shape = untouched_shape;
    shape.extend([m0, m1]);
    let density = out
        .into_shape_with_order(IxDyn(&shape))?
        .permuted_axes(plan.output_permutation())
        .as_standard_layout()
        .into_owned();

    let Plan {
        untouched,
        insert_at,
        targets,
        ..
    } = plan;
    let mut abscissae: Vec<Abscissa> = untouched
        .iter()
        .map(|&k| dist.abscissae()[k].clone())
        .collect();
    let [t0, t1] = targets;
    abscissae.splice(insert_at..insert_at, [t0, t1]);

    GriddedDensity::new(abscissae, density)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::FnPairMap;
    use ndarray::{array, ArrayD};

    fn identity() -> impl crate::transform::PairMap {
        FnPairMap::new(|p: [f64; 2]| Ok(p), |_| Ok(1.0))
    }

    fn grid_3d() -> GriddedDensity {
        GriddedDensity::from_fn(
            vec![
                Abscissa::linspace("r", 0.0, 2.0, 2).unwrap(),
                Abscissa::linspace("x", 0.0, 3.0, 3).unwrap(),
                Abscissa::linspace("y", 0.0, 4.0, 4).unwrap(),
            ],
            |c| c[0] + 10.0 * c[1] + 100.0 * c[2],
        )
        .unwrap()
    }

    #[test]
    fn test_output_permutation() {
        let d = GriddedDensity::zeros(vec![
            Abscissa::linspace("a", 0.0, 1.0, 1).unwrap(),
            Abscissa::linspace("x", 0.0, 1.0, 1).unwrap(),
            Abscissa::linspace("b", 0.0, 1.0, 1).unwrap(),
            Abscissa::linspace("y", 0.0, 1.0, 1).unwrap(),
        ])
        .unwrap();
        let spec = TransformSpec::new(["y", "x"], ["u", "w"], identity())
            .with_target_edges(array![0.0, 1.0], array![0.0, 1.0]);
        let plan = Plan::new(&d, &spec).unwrap();
        assert_eq!(plan.source_axes, [3, 1]);
        assert_eq!(plan.untouched, vec![0, 2]);
        assert_eq!(plan.insert_at, 1);
        // Working layout (a, b, u, w) → output (a, u, w, b)
        assert_eq!(plan.output_permutation(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_identity_reproduces_input() {
        let d = grid_3d();
        let spec = TransformSpec::new(["x", "y"], ["x", "y"], identity()).with_target_edges(
            d.abscissa("x").unwrap().edges().clone(),
            d.abscissa("y").unwrap().edges().clone(),
        );
        let out = convert(&d, &spec).unwrap();
        assert_eq!(out.names(), vec!["r", "x", "y"]);
        for (a, b) in out.density().iter().zip(d.density().iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn test_swapped_pair_transposes() {
        let d = grid_3d();
        // Target (w, u) = (y, x): pulling back swaps coordinates.
        let swap = FnPairMap::new(|[w, u]: [f64; 2]| Ok([u, w]), |_| Ok(1.0));
        let spec = TransformSpec::new(["x", "y"], ["w", "u"], swap).with_target_edges(
            d.abscissa("y").unwrap().edges().clone(),
            d.abscissa("x").unwrap().edges().clone(),
        );
        let out = convert(&d, &spec).unwrap();
        assert_eq!(out.shape(), &[2, 4, 3]);
        for r in 0..2 {
            for i in 0..3 {
                for j in 0..4 {
                    let a = out.density()[[r, j, i]];
                    let b = d.density()[[r, i, j]];
                    assert!((a - b).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_serial_matches_parallel() {
        let d = grid_3d();
        let shift = FnPairMap::new(|[u, w]: [f64; 2]| Ok([u + 0.3, w - 0.2]), |[u, _]| Ok(1.0 + u));
        let spec = TransformSpec::new(["x", "y"], ["u", "w"], shift)
            .with_target_edges(array![0.0, 1.0, 2.5], array![0.0, 2.0, 3.0, 3.5]);
        let par = convert(&d, &spec).unwrap();
        let ser = convert(&d, &spec.clone().with_execution(Execution::Serial)).unwrap();
        assert_eq!(par, ser);
    }

    #[test]
    fn test_input_untouched() {
        let d = grid_3d();
        let before = d.clone();
        let spec = TransformSpec::new(["x", "y"], ["u", "w"], identity())
            .with_target_edges(array![0.0, 3.0], array![0.0, 4.0]);
        let out = convert(&d, &spec).unwrap();
        assert_eq!(d, before);
        assert_eq!(out.shape(), &[2, 1, 1]);
    }

    #[test]
    fn test_zero_rank_untouched() {
        let d = GriddedDensity::new(
            vec![
                Abscissa::linspace("x", 0.0, 1.0, 1).unwrap(),
                Abscissa::linspace("y", 0.0, 1.0, 1).unwrap(),
            ],
            ArrayD::from_elem(IxDyn(&[1, 1]), 2.0),
        )
        .unwrap();
        let spec = TransformSpec::new(["x", "y"], ["u", "w"], identity())
            .with_target_edges(array![0.0, 1.0, 2.0, 3.0], array![0.0, 1.0, 2.0, 3.0]);
        let out = convert(&d, &spec).unwrap();
        assert_eq!(out.shape(), &[3, 3]);
        assert!(out.density().iter().all(|&v| v == 2.0));
    }
}
