//! Row-major multi-index helpers for iterating over the axes a 2-D
//! operation leaves untouched.

/// Multi-index of flat position `flat` in a row-major array of `shape`.
pub fn unravel_index(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut idx = vec![0; shape.len()];
    for (k, &n) in shape.iter().enumerate().rev() {
        if n == 0 {
            continue;
        }
        idx[k] = flat % n;
        flat /= n;
    }
    idx
}

/// Cartesian product of `0..shape[k]` for every axis, in lexicographic
/// order (last axis fastest). An empty shape yields one empty index; any
/// zero-length axis yields nothing.
#[derive(Debug, Clone)]
pub struct MultiIndex {
    shape: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl MultiIndex {
    pub fn new(shape: &[usize]) -> Self {
        let next = if shape.iter().any(|&n| n == 0) {
            None
        } else {
            Some(vec![0; shape.len()])
        };
        MultiIndex {
            shape: shape.to_vec(),
            next,
        }
    }

    /// Number of index tuples the iterator produces in total.
    pub fn count_total(&self) -> usize {
        self.shape.iter().product()
    }
}

impl Iterator for MultiIndex {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut succ = current.clone();
        for k in (0..succ.len()).rev() {
            succ[k] += 1;
            if succ[k] < self.shape[k] {
                self.next = Some(succ);
                return Some(current);
            }
            succ[k] = 0;
        }
        // Wrapped around every axis: `current` was the last tuple.
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_order() {
        let all: Vec<Vec<usize>> = MultiIndex::new(&[2, 3]).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
    }

    #[test]
    fn test_empty_shape_yields_single_tuple() {
        let all: Vec<Vec<usize>> = MultiIndex::new(&[]).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
        assert_eq!(MultiIndex::new(&[]).count_total(), 1);
    }

    #[test]
    fn test_zero_axis_yields_nothing() {
        assert_eq!(MultiIndex::new(&[3, 0, 2]).count(), 0);
    }

    #[test]
    fn test_unravel_matches_iteration() {
        let shape = [3, 1, 4, 2];
        for (flat, idx) in MultiIndex::new(&shape).enumerate() {
            assert_eq!(unravel_index(flat, &shape), idx);
        }
    }
}
