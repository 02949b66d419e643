//! Bilinear interpolation on rectilinear (possibly non-uniform) nodes.
//!
//! Points outside the node range are extended linearly from the boundary
//! cell; nothing is clamped. An axis with a single node is treated as
//! constant along that axis.

use dist_types::error::{DistError, DistResult};
use ndarray::{ArrayView2, ArrayViewMut2};

/// Locate `x` among strictly increasing `nodes`.
/// Returns `(lower, upper, fraction)`; the fraction leaves `[0, 1]` when
/// `x` lies outside the node range.
fn bracket(nodes: &[f64], x: f64) -> (usize, usize, f64) {
    let n = nodes.len();
    if n == 1 {
        return (0, 0, 0.0);
    }
    let k = nodes.partition_point(|&v| v <= x);
    let i0 = k.saturating_sub(1).min(n - 2);
    let t = (x - nodes[i0]) / (nodes[i0 + 1] - nodes[i0]);
    (i0, i0 + 1, t)
}

#[derive(Debug, Clone, Copy)]
struct Tap {
    i0: usize,
    i1: usize,
    j0: usize,
    j1: usize,
    tx: f64,
    ty: f64,
}

impl Tap {
    #[inline]
    fn eval(&self, values: &ArrayView2<f64>) -> f64 {
        let v00 = values[[self.i0, self.j0]];
        let v01 = values[[self.i0, self.j1]];
        let v10 = values[[self.i1, self.j0]];
        let v11 = values[[self.i1, self.j1]];
        (1.0 - self.tx) * ((1.0 - self.ty) * v00 + self.ty * v01)
            + self.tx * ((1.0 - self.ty) * v10 + self.ty * v11)
    }
}

/// Precomputed bilinear weights for a fixed node grid and a fixed set of
/// sample points. Many value slices sharing the same nodes can then be
/// evaluated without repeating the cell search.
#[derive(Debug, Clone)]
pub struct BilinearStencil {
    nx: usize,
    ny: usize,
    taps: Vec<Tap>,
}

impl BilinearStencil {
    /// `x_nodes` index axis 0 of the value slices, `y_nodes` axis 1.
    pub fn new(x_nodes: &[f64], y_nodes: &[f64], points: &[[f64; 2]]) -> DistResult<Self> {
        if x_nodes.is_empty() || y_nodes.is_empty() {
            return Err(DistError::ShapeMismatch(
                "interpolation needs at least one node per axis".to_string(),
            ));
        }
        let taps = points
            .iter()
            .map(|&[x, y]| {
                let (i0, i1, tx) = bracket(x_nodes, x);
                let (j0, j1, ty) = bracket(y_nodes, y);
                Tap {
                    i0,
                    i1,
                    j0,
                    j1,
                    tx,
                    ty,
                }
            })
            .collect();
        Ok(BilinearStencil {
            nx: x_nodes.len(),
            ny: y_nodes.len(),
            taps,
        })
    }

    /// Number of sample points.
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    fn check_values(&self, values: &ArrayView2<f64>) -> DistResult<()> {
        if values.dim() != (self.nx, self.ny) {
            return Err(DistError::ShapeMismatch(format!(
                "stencil built for {}x{} nodes, got values of shape {:?}",
                self.nx,
                self.ny,
                values.shape()
            )));
        }
        Ok(())
    }

    /// Interpolated values at every sample point, in point order.
    pub fn evaluate(&self, values: ArrayView2<f64>) -> DistResult<Vec<f64>> {
        self.check_values(&values)?;
        Ok(self.taps.iter().map(|tap| tap.eval(&values)).collect())
    }

    /// Write `interpolated * scale` into `out`, visiting `out` in logical
    /// (row-major) order. `scale` holds one factor per sample point.
    pub fn apply_scaled(
        &self,
        values: ArrayView2<f64>,
        scale: &[f64],
        mut out: ArrayViewMut2<f64>,
    ) -> DistResult<()> {
        self.check_values(&values)?;
        if scale.len() != self.taps.len() || out.len() != self.taps.len() {
            return Err(DistError::ShapeMismatch(format!(
                "stencil has {} points, scale has {}, output has {}",
                self.taps.len(),
                scale.len(),
                out.len()
            )));
        }
        for ((o, tap), &w) in out.iter_mut().zip(&self.taps).zip(scale) {
            *o = tap.eval(&values) * w;
        }
        Ok(())
    }
}

/// Bilinear interpolation of `values` at a single point `(x, y)`.
pub fn interp2d(
    x_nodes: &[f64],
    y_nodes: &[f64],
    values: ArrayView2<f64>,
    x: f64,
    y: f64,
) -> DistResult<f64> {
    let stencil = BilinearStencil::new(x_nodes, y_nodes, &[[x, y]])?;
    Ok(stencil.evaluate(values)?[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn nodes(n: usize, lo: f64, hi: f64) -> Vec<f64> {
        (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn test_interp2d_exact_gridpoint() {
        let x = nodes(5, 0.0, 4.0);
        let y = nodes(5, 0.0, 4.0);
        let field = Array2::from_shape_fn((5, 5), |(i, j)| (i * 10 + j) as f64);
        let val = interp2d(&x, &y, field.view(), 2.0, 3.0).unwrap();
        assert!((val - 23.0).abs() < 1e-10, "val = {val}, expected 23");
    }

    #[test]
    fn test_interp2d_constant() {
        let x = nodes(5, 0.0, 4.0);
        let y = nodes(3, -1.0, 1.0);
        let field = Array2::from_elem((5, 3), 7.0);
        let val = interp2d(&x, &y, field.view(), 1.5, 0.25).unwrap();
        assert!((val - 7.0).abs() < 1e-10, "Constant field interpolation");
    }

    #[test]
    fn test_interp2d_linear_nonuniform() {
        let x = vec![0.0, 0.5, 2.0, 5.0];
        let y = vec![-3.0, 1.0, 1.5];
        // f(x, y) = 2x - y + 1 is reproduced exactly by bilinear interpolation
        let field = Array2::from_shape_fn((4, 3), |(i, j)| 2.0 * x[i] - y[j] + 1.0);
        let val = interp2d(&x, &y, field.view(), 3.1, -0.7).unwrap();
        assert!((val - (6.2 + 0.7 + 1.0)).abs() < 1e-10, "val = {val}");
    }

    #[test]
    fn test_linear_extension_outside_nodes() {
        let x = nodes(3, 0.0, 2.0);
        let y = nodes(3, 0.0, 2.0);
        let field = Array2::from_shape_fn((3, 3), |(i, j)| x[i] + 3.0 * y[j]);
        // Outside on both sides: no clamping
        let above = interp2d(&x, &y, field.view(), 3.0, 2.5).unwrap();
        assert!((above - 10.5).abs() < 1e-10, "above = {above}");
        let below = interp2d(&x, &y, field.view(), -1.0, -0.5).unwrap();
        assert!((below + 2.5).abs() < 1e-10, "below = {below}");
    }

    #[test]
    fn test_single_node_axis_is_constant() {
        let x = vec![1.0];
        let y = nodes(3, 0.0, 2.0);
        let field = Array2::from_shape_fn((1, 3), |(_, j)| 4.0 * y[j]);
        let val = interp2d(&x, &y, field.view(), 100.0, 1.5).unwrap();
        assert!((val - 6.0).abs() < 1e-10, "val = {val}");

        let single = Array2::from_elem((1, 1), 2.5);
        let val = interp2d(&[0.0], &[0.0], single.view(), -7.0, 3.0).unwrap();
        assert!((val - 2.5).abs() < 1e-15);
    }

    #[test]
    fn test_apply_scaled_row_major() {
        let x = nodes(2, 0.0, 1.0);
        let y = nodes(2, 0.0, 1.0);
        let field = Array2::from_shape_fn((2, 2), |(i, j)| x[i] + y[j]);
        let points = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let stencil = BilinearStencil::new(&x, &y, &points).unwrap();
        let mut out = Array2::zeros((2, 2));
        stencil
            .apply_scaled(field.view(), &[1.0, 2.0, 3.0, 4.0], out.view_mut())
            .unwrap();
        assert_eq!(out, ndarray::array![[0.0, 2.0], [3.0, 8.0]]);
    }

    #[test]
    fn test_shape_mismatch_reported() {
        let stencil = BilinearStencil::new(&[0.0, 1.0], &[0.0, 1.0], &[[0.5, 0.5]]).unwrap();
        let wrong = Array2::zeros((3, 2));
        assert!(stencil.evaluate(wrong.view()).is_err());
        let field = Array2::zeros((2, 2));
        let mut out = Array2::zeros((2, 2));
        assert!(stencil
            .apply_scaled(field.view(), &[1.0], out.view_mut())
            .is_err());
        assert!(BilinearStencil::new(&[], &[0.0], &[]).is_err());
    }
}
