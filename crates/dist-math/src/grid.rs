//! Sample-point construction for 2-D target grids.

/// All `(a, b)` pairs over two coordinate vectors, `a` varying slowest.
/// Matches the row-major layout of an `(a.len(), b.len())` array.
pub fn meshgrid_points(a: &[f64], b: &[f64]) -> Vec<[f64; 2]> {
    let mut points = Vec::with_capacity(a.len() * b.len());
    for &x in a {
        for &y in b {
            points.push([x, y]);
        }
    }
    points
}

/// True when `x` lies in the closed interval `span`.
pub fn within(span: (f64, f64), x: f64) -> bool {
    x >= span.0 && x <= span.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meshgrid_row_major() {
        let pts = meshgrid_points(&[1.0, 2.0], &[10.0, 20.0, 30.0]);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], [1.0, 10.0]);
        assert_eq!(pts[2], [1.0, 30.0]);
        assert_eq!(pts[3], [2.0, 10.0]);
    }

    #[test]
    fn test_within_closed_interval() {
        assert!(within((0.0, 1.0), 0.0));
        assert!(within((0.0, 1.0), 1.0));
        assert!(!within((0.0, 1.0), 1.0 + 1e-12));
        assert!(!within((0.0, 1.0), f64::NAN));
    }
}
