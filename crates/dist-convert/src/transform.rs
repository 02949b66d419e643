// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Coordinate Pair Transforms
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Description of a two-abscissa coordinate substitution.
//!
//! A [`PairMap`] is written from the target side: it takes a point of the
//! new coordinate pair and returns the matching point of the old pair,
//! together with `|det J|` of that mapping. The engine pulls source values
//! back through it and multiplies by the Jacobian so that
//! `new_density * d(t1) * d(t2)` equals `old_density * d(s1) * d(s2)`.

use dist_types::error::DistResult;
use dist_types::state::Abscissa;
use ndarray::Array1;
use std::fmt;
use std::sync::Arc;

/// Target → source point mapping with its volume weight.
pub trait PairMap: Send + Sync {
    /// Source-space point corresponding to the target-space `target`.
    fn to_source(&self, target: [f64; 2]) -> DistResult<[f64; 2]>;

    /// Absolute Jacobian determinant of [`PairMap::to_source`] at `target`.
    fn jacobian(&self, target: [f64; 2]) -> DistResult<f64>;

    /// Target edges to use when none are supplied. `source` holds the two
    /// replaced abscissae in source-pair order.
    fn default_edges(&self, _source: [&Abscissa; 2]) -> Option<[Array1<f64>; 2]> {
        None
    }

    fn target_units(&self) -> [Option<&str>; 2] {
        [None, None]
    }
}

/// [`PairMap`] built from two closures. Has no default edges.
pub struct FnPairMap<F, J> {
    forward: F,
    jacobian: J,
}

impl<F, J> FnPairMap<F, J>
where
    F: Fn([f64; 2]) -> DistResult<[f64; 2]> + Send + Sync,
    J: Fn([f64; 2]) -> DistResult<f64> + Send + Sync,
{
    pub fn new(forward: F, jacobian: J) -> Self {
        FnPairMap { forward, jacobian }
    }
}

impl<F, J> PairMap for FnPairMap<F, J>
where
    F: Fn([f64; 2]) -> DistResult<[f64; 2]> + Send + Sync,
    J: Fn([f64; 2]) -> DistResult<f64> + Send + Sync,
{
    fn to_source(&self, target: [f64; 2]) -> DistResult<[f64; 2]> {
        (self.forward)(target)
    }

    fn jacobian(&self, target: [f64; 2]) -> DistResult<f64> {
        (self.jacobian)(target)
    }
}

/// What to do with mapped points that fall outside the source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Extend the boundary cells linearly.
    #[default]
    Extrapolate,
    /// Fail with `DistError::OutOfBounds`.
    Strict,
}

/// How slices over the untouched dimensions are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// Rayon over disjoint output slices.
    #[default]
    Parallel,
    Serial,
}

/// One coordinate-pair substitution.
#[derive(Clone)]
pub struct TransformSpec {
    /// Replaced abscissae; the first one is the primary axis.
    pub source_pair: [String; 2],
    /// New abscissae, inserted where the source pair was.
    pub target_pair: [String; 2],
    pub map: Arc<dyn PairMap>,
    /// Explicit target edges; `None` asks the map for its default.
    pub target_edges: [Option<Array1<f64>>; 2],
    pub bounds: BoundsPolicy,
    pub execution: Execution,
}

impl TransformSpec {
    pub fn new(source_pair: [&str; 2], target_pair: [&str; 2], map: impl PairMap + 'static) -> Self {
        TransformSpec {
            source_pair: source_pair.map(str::to_string),
            target_pair: target_pair.map(str::to_string),
            map: Arc::new(map),
            target_edges: [None, None],
            bounds: BoundsPolicy::default(),
            execution: Execution::default(),
        }
    }

    pub fn with_target_edges(mut self, first: Array1<f64>, second: Array1<f64>) -> Self {
        self.target_edges = [Some(first), Some(second)];
        self
    }

    /// Override edges of a single target abscissa (`slot` 0 or 1).
    pub fn with_target_edge(mut self, slot: usize, edges: Array1<f64>) -> Self {
        if let Some(e) = self.target_edges.get_mut(slot) {
            *e = Some(edges);
        }
        self
    }

    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }
}

impl fmt::Debug for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSpec")
            .field("source_pair", &self.source_pair)
            .field("target_pair", &self.target_pair)
            .field("target_edges", &self.target_edges)
            .field("bounds", &self.bounds)
            .field("execution", &self.execution)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn swap_map() -> impl PairMap {
        FnPairMap::new(|[a, b]: [f64; 2]| Ok([b, a]), |_| Ok(1.0))
    }

    #[test]
    fn test_fn_pair_map_delegates() {
        let map = swap_map();
        assert_eq!(map.to_source([1.0, 2.0]).unwrap(), [2.0, 1.0]);
        assert_eq!(map.jacobian([1.0, 2.0]).unwrap(), 1.0);
        assert_eq!(map.target_units(), [None, None]);
    }

    #[test]
    fn test_builder_defaults_and_overrides() {
        let spec = TransformSpec::new(["x", "y"], ["u", "w"], swap_map());
        assert_eq!(spec.bounds, BoundsPolicy::Extrapolate);
        assert_eq!(spec.execution, Execution::Parallel);
        assert!(spec.target_edges[0].is_none());

        let spec = spec
            .with_target_edge(1, array![0.0, 1.0])
            .with_bounds(BoundsPolicy::Strict)
            .with_execution(Execution::Serial);
        assert!(spec.target_edges[0].is_none());
        assert_eq!(spec.target_edges[1], Some(array![0.0, 1.0]));
        assert_eq!(spec.bounds, BoundsPolicy::Strict);
        assert_eq!(spec.execution, Execution::Serial);

        let dbg = format!("{spec:?}");
        assert!(dbg.contains("source_pair"));
    }
}
